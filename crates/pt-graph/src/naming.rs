//! Variable naming and the promotion map.
//!
//! A port's variable name depends only on the namespace and on the
//! instance's category, type tag, identifier and port name, never on where
//! the instance appears in the description.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pt_core::{Category, InstanceIdx, InstanceKey, PortRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, GraphResult, Origin};
use crate::order::EvaluationPlan;
use crate::validate::ValidatedGraph;

pub const DEFAULT_NAMESPACE: &str = "data:propulsion:he_power_train";

/// Builds `<namespace>:<category>:<type_tag>:<id>:<port>` names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableNamer {
    namespace: String,
}

impl Default for VariableNamer {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl VariableNamer {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn variable_name(&self, category: Category, key: &InstanceKey, port: &str) -> String {
        let local = format!("{}:{}:{}:{}", category, key.type_tag, key.id, port);
        if self.namespace.is_empty() {
            local
        } else {
            format!("{}:{}", self.namespace, local)
        }
    }
}

/// The port a generated name stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PortAddress {
    pub instance: InstanceKey,
    pub port: String,
}

/// Consumer variable name → producer variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromotionMap(BTreeMap<String, String>);

impl PromotionMap {
    /// Producer name promoted into `consumer`.
    pub fn get(&self, consumer: &str) -> Option<&str> {
        self.0.get(consumer).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(c, p)| (c.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Generated names for every port of an assembly, plus the promotion map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTable {
    by_name: BTreeMap<String, PortAddress>,
    by_port: HashMap<(InstanceIdx, String), String>,
    promotions: PromotionMap,
}

impl NamingTable {
    /// Name every port in plan order and promote every connection.
    pub fn resolve(
        graph: &ValidatedGraph,
        plan: &EvaluationPlan,
        namer: &VariableNamer,
    ) -> GraphResult<Self> {
        let mut by_name: BTreeMap<String, PortAddress> = BTreeMap::new();
        let mut by_port = HashMap::new();

        for idx in plan.instance_order() {
            let Some(instance) = graph.instance(idx) else { continue };
            let descriptor = &instance.descriptor;
            let ports = descriptor
                .inputs
                .iter()
                .map(|p| p.name.as_str())
                .chain(descriptor.outputs.iter().map(|p| p.name.as_str()));

            for port in ports {
                let name = namer.variable_name(instance.category(), &instance.key, port);
                if let Some(existing) = by_name.get(&name)
                    && existing.instance != instance.key
                {
                    return Err(GraphError::DuplicateInstanceId {
                        type_tag: instance.key.type_tag.clone(),
                        id: instance.key.id.clone(),
                        reason: format!(
                            "variable '{name}' is also generated for {}",
                            existing.instance
                        ),
                        origin: Origin::Component(idx.as_usize()),
                    });
                }
                by_port.insert((idx, port.to_string()), name.clone());
                by_name.insert(
                    name,
                    PortAddress {
                        instance: instance.key.clone(),
                        port: port.to_string(),
                    },
                );
            }
        }

        let mut promotions = BTreeMap::new();
        for conn in graph.connections() {
            let consumer = lookup(&by_port, graph, conn.consumer, &conn.consumer_port)?;
            let producer = lookup(&by_port, graph, conn.producer, &conn.producer_port)?;
            if promotions.insert(consumer.clone(), producer.clone()).is_some() {
                let key = graph
                    .instance(conn.consumer)
                    .map(|i| i.key.clone())
                    .unwrap_or_else(|| InstanceKey::new("?", "?"));
                return Err(GraphError::FanInConflict {
                    instance: key,
                    port: conn.consumer_port.clone(),
                    drivers: 2,
                    origin: Origin::Connection(conn.index),
                });
            }
        }

        debug!(
            variables = by_name.len(),
            promotions = promotions.len(),
            namespace = namer.namespace(),
            "variable names resolved"
        );
        Ok(Self {
            by_name,
            by_port,
            promotions: PromotionMap(promotions),
        })
    }

    pub fn name_of(&self, idx: InstanceIdx, port: &str) -> Option<&str> {
        self.by_port.get(&(idx, port.to_string())).map(String::as_str)
    }

    /// Reverse lookup of a generated name.
    pub fn address_of(&self, name: &str) -> Option<&PortAddress> {
        self.by_name.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn promotions(&self) -> &PromotionMap {
        &self.promotions
    }

    /// Connections implied by the promotion map, as (producer, consumer).
    pub fn recover_connections(&self) -> BTreeSet<(PortAddress, PortAddress)> {
        self.promotions
            .iter()
            .filter_map(|(consumer, producer)| {
                Some((self.by_name.get(producer)?.clone(), self.by_name.get(consumer)?.clone()))
            })
            .collect()
    }
}

fn lookup<'a>(
    by_port: &'a HashMap<(InstanceIdx, String), String>,
    graph: &ValidatedGraph,
    idx: InstanceIdx,
    port: &str,
) -> GraphResult<&'a String> {
    by_port.get(&(idx, port.to_string())).ok_or_else(|| {
        let endpoint = match graph.instance(idx) {
            Some(instance) => PortRef::qualified(&instance.key.type_tag, &instance.key.id, port),
            None => PortRef::new(format!("components[{}]", idx.as_usize()), port),
        };
        GraphError::DanglingConnection {
            endpoint,
            reason: "port was not named".to_string(),
            origin: Origin::Component(idx.as_usize()),
        }
    })
}
