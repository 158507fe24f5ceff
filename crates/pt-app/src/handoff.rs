//! The description handed once to an execution engine.

use std::path::PathBuf;

use pt_core::{Category, InstanceKey, OptionMap};
use pt_graph::{Assembly, PlanStep, PromotionMap};
use pt_registry::TypeKind;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::AppResult;

/// How the engine finds the implementation of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandoffComponent {
    pub dispatch: Dispatch,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub id: String,
    pub category: Category,
    pub options: OptionMap,
    #[serde(skip_serializing_if = "OptionMap::is_empty")]
    pub inputs: OptionMap,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandoffStep {
    FeedForward { instance: InstanceKey },
    Equilibrium { cluster: String },
}

/// Producer and consumer variable of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandoffLink {
    pub producer: String,
    pub consumer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandoffCluster {
    pub name: String,
    pub members: Vec<InstanceKey>,
    pub internal_links: Vec<HandoffLink>,
}

/// Ordered components, evaluation steps, clusters and promotion map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineHandoff {
    pub name: String,
    pub number_of_points: Option<usize>,
    /// Components in evaluation order.
    pub components: Vec<HandoffComponent>,
    pub steps: Vec<HandoffStep>,
    pub clusters: Vec<HandoffCluster>,
    pub promotions: PromotionMap,
}

impl EngineHandoff {
    pub fn from_assembly(assembly: &Assembly) -> Self {
        let graph = assembly.graph();
        let names = assembly.names();
        let key_of = |idx| graph.instance(idx).map(|i| i.key.clone());

        let components = assembly
            .ordered_instances()
            .filter_map(|instance| {
                Some(HandoffComponent {
                    dispatch: match instance.kind {
                        TypeKind::Builtin(_) => Dispatch::Builtin,
                        TypeKind::Custom => Dispatch::Custom,
                    },
                    type_tag: instance.key.type_tag.clone(),
                    id: instance.key.id.clone(),
                    category: instance.category(),
                    options: instance.options.clone(),
                    inputs: instance.inputs.clone(),
                    output_file: assembly.output_file_path(&instance.key)?,
                })
            })
            .collect();

        let clusters = assembly.plan().clusters();
        let steps = assembly
            .plan()
            .steps()
            .iter()
            .filter_map(|step| match *step {
                PlanStep::FeedForward(idx) => {
                    key_of(idx).map(|instance| HandoffStep::FeedForward { instance })
                }
                PlanStep::Equilibrium(c) => clusters.get(c).map(|cluster| HandoffStep::Equilibrium {
                    cluster: cluster.name.clone(),
                }),
            })
            .collect();

        let clusters = clusters
            .iter()
            .map(|cluster| HandoffCluster {
                name: cluster.name.clone(),
                members: cluster.members.iter().filter_map(|&m| key_of(m)).collect(),
                internal_links: cluster
                    .internal_connections
                    .iter()
                    .filter_map(|&c| {
                        let conn = graph.connections().get(c)?;
                        Some(HandoffLink {
                            producer: names
                                .name_of(conn.producer, &conn.producer_port)?
                                .to_string(),
                            consumer: names
                                .name_of(conn.consumer, &conn.consumer_port)?
                                .to_string(),
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            name: graph.name().to_string(),
            number_of_points: graph.number_of_points(),
            components,
            steps,
            clusters,
            promotions: assembly.promotions().clone(),
        }
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the compact JSON form, as lowercase hex.
    pub fn fingerprint(&self) -> AppResult<String> {
        let json = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
