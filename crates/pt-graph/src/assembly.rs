//! A fully assembled power-train: validated graph, plan and names.

use std::sync::Arc;

use pt_core::InstanceKey;

use crate::error::GraphResult;
use crate::naming::{NamingTable, PromotionMap, VariableNamer};
use crate::order::{EquilibriumPolicy, EvaluationPlan, order};
use crate::validate::{ResolvedInstance, ValidatedGraph};

/// Immutable result of assembly, cheap to share with an execution engine.
#[derive(Debug, Clone)]
pub struct Assembly {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    graph: ValidatedGraph,
    plan: EvaluationPlan,
    names: NamingTable,
}

impl Assembly {
    /// Order and name a validated graph.
    pub fn assemble(
        graph: ValidatedGraph,
        policy: &EquilibriumPolicy,
        namer: &VariableNamer,
    ) -> GraphResult<Self> {
        let plan = order(&graph, policy)?;
        let names = NamingTable::resolve(&graph, &plan, namer)?;
        Ok(Self {
            inner: Arc::new(Inner { graph, plan, names }),
        })
    }

    pub fn graph(&self) -> &ValidatedGraph {
        &self.inner.graph
    }

    pub fn plan(&self) -> &EvaluationPlan {
        &self.inner.plan
    }

    pub fn names(&self) -> &NamingTable {
        &self.inner.names
    }

    pub fn promotions(&self) -> &PromotionMap {
        self.inner.names.promotions()
    }

    pub fn instance(&self, key: &InstanceKey) -> Option<&ResolvedInstance> {
        self.inner.graph.find(key)
    }

    /// Instances in evaluation order, clusters expanded.
    pub fn ordered_instances(&self) -> impl Iterator<Item = &ResolvedInstance> + '_ {
        self.inner
            .plan
            .instance_order()
            .into_iter()
            .filter_map(|idx| self.inner.graph.instance(idx))
    }
}
