//! Dependency ordering: feed-forward steps and equilibrium clusters.
//!
//! Instances are grouped into strongly connected components (Tarjan). The
//! condensation is then emitted with Kahn's algorithm, always picking the
//! ready component whose earliest member appears first in the description.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use pt_core::{Category, InstanceIdx};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::validate::ValidatedGraph;

/// Which instances may take part in an equilibrium cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquilibriumPolicy {
    pub allowed_categories: BTreeSet<Category>,
    /// Every cluster must contain at least one bus.
    pub require_bus: bool,
}

impl Default for EquilibriumPolicy {
    fn default() -> Self {
        Self {
            allowed_categories: [
                Category::Bus,
                Category::Converter,
                Category::Source,
                Category::Storage,
                Category::Load,
            ]
            .into_iter()
            .collect(),
            require_bus: true,
        }
    }
}

impl EquilibriumPolicy {
    /// Accept any cycle.
    pub fn permissive() -> Self {
        Self {
            allowed_categories: Category::ALL.into_iter().collect(),
            require_bus: false,
        }
    }

    fn check(&self, graph: &ValidatedGraph, members: &[InstanceIdx]) -> GraphResult<()> {
        let instances: Vec<_> = members.iter().filter_map(|&m| graph.instance(m)).collect();

        let offending: Vec<_> = instances
            .iter()
            .filter(|i| !self.allowed_categories.contains(&i.category()))
            .map(|i| i.key.clone())
            .collect();
        let reason = if !offending.is_empty() {
            let categories: BTreeSet<&str> = instances
                .iter()
                .filter(|i| !self.allowed_categories.contains(&i.category()))
                .map(|i| i.category().as_str())
                .collect();
            format!(
                "categories [{}] may not take part in an equilibrium",
                categories.into_iter().collect::<Vec<_>>().join(", ")
            )
        } else if self.require_bus && !instances.iter().any(|i| i.category() == Category::Bus) {
            "no bus anchors the cycle".to_string()
        } else {
            return Ok(());
        };

        let members: Vec<_> = instances.iter().map(|i| i.key.clone()).collect();
        let offending = if offending.is_empty() { members.clone() } else { offending };
        Err(GraphError::CyclicDependencyUnresolved {
            members,
            offending,
            reason,
        })
    }
}

/// A set of mutually dependent instances, resolved as one unit by an
/// equilibrium solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquilibriumCluster {
    pub name: String,
    /// Members in description order.
    pub members: Vec<InstanceIdx>,
    /// Connections with both ends inside the cluster (indices into
    /// `ValidatedGraph::connections()`).
    pub internal_connections: Vec<usize>,
    /// Connections feeding the cluster from outside.
    pub inbound_connections: Vec<usize>,
}

impl EquilibriumCluster {
    pub fn contains(&self, idx: InstanceIdx) -> bool {
        self.members.binary_search(&idx).is_ok()
    }
}

/// One unit of evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    FeedForward(InstanceIdx),
    /// Index into `EvaluationPlan::clusters()`.
    Equilibrium(usize),
}

/// Evaluation order of a validated graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPlan {
    steps: Vec<PlanStep>,
    clusters: Vec<EquilibriumCluster>,
}

impl EvaluationPlan {
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn clusters(&self) -> &[EquilibriumCluster] {
        &self.clusters
    }

    /// Feed-forward instances in evaluation order.
    pub fn feed_forward(&self) -> impl Iterator<Item = InstanceIdx> + '_ {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::FeedForward(idx) => Some(*idx),
            PlanStep::Equilibrium(_) => None,
        })
    }

    pub fn cluster_of(&self, idx: InstanceIdx) -> Option<&EquilibriumCluster> {
        self.clusters.iter().find(|c| c.contains(idx))
    }

    /// Every instance, clusters expanded in member order.
    pub fn instance_order(&self) -> Vec<InstanceIdx> {
        let mut order = Vec::new();
        for step in &self.steps {
            match *step {
                PlanStep::FeedForward(idx) => order.push(idx),
                PlanStep::Equilibrium(c) => order.extend(self.clusters[c].members.iter().copied()),
            }
        }
        order
    }

    /// Step index at which `idx` is evaluated.
    pub fn position_of(&self, idx: InstanceIdx) -> Option<usize> {
        self.steps.iter().position(|step| match *step {
            PlanStep::FeedForward(i) => i == idx,
            PlanStep::Equilibrium(c) => self.clusters[c].contains(idx),
        })
    }
}

/// Compute the evaluation plan of a validated graph.
pub fn order(graph: &ValidatedGraph, policy: &EquilibriumPolicy) -> GraphResult<EvaluationPlan> {
    let instances = graph.instances();
    let mut dg: DiGraph<InstanceIdx, ()> =
        DiGraph::with_capacity(instances.len(), graph.connections().len());
    let nodes: Vec<NodeIndex> = instances.iter().map(|i| dg.add_node(i.idx)).collect();
    for conn in graph.connections() {
        dg.update_edge(nodes[conn.producer.as_usize()], nodes[conn.consumer.as_usize()], ());
    }

    // Group members, sorted so the first member is the earliest in the description.
    let mut groups: Vec<Vec<InstanceIdx>> = tarjan_scc(&dg)
        .into_iter()
        .map(|scc| {
            let mut members: Vec<InstanceIdx> = scc.into_iter().map(|n| dg[n]).collect();
            members.sort();
            members
        })
        .collect();
    groups.sort_by_key(|members| members[0]);

    let mut group_of = vec![0usize; instances.len()];
    for (g, members) in groups.iter().enumerate() {
        for m in members {
            group_of[m.as_usize()] = g;
        }
    }

    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); groups.len()];
    let mut in_degree = vec![0usize; groups.len()];
    for conn in graph.connections() {
        let (from, to) = (group_of[conn.producer.as_usize()], group_of[conn.consumer.as_usize()]);
        if from != to && successors[from].insert(to) {
            in_degree[to] += 1;
        }
    }

    // Groups are sorted by first member, so the group index is the tie-break.
    let mut ready: BinaryHeap<Reverse<usize>> = (0..groups.len())
        .filter(|&g| in_degree[g] == 0)
        .map(Reverse)
        .collect();

    let mut steps = Vec::with_capacity(groups.len());
    let mut clusters = Vec::new();
    while let Some(Reverse(g)) = ready.pop() {
        let members = &groups[g];
        let first = nodes[members[0].as_usize()];
        let is_cycle = members.len() > 1 || dg.contains_edge(first, first);

        if is_cycle {
            policy.check(graph, members)?;
            let cluster = build_cluster(graph, clusters.len(), members);
            debug!(
                cluster = %cluster.name,
                members = cluster.members.len(),
                "equilibrium cluster formed"
            );
            steps.push(PlanStep::Equilibrium(clusters.len()));
            clusters.push(cluster);
        } else {
            steps.push(PlanStep::FeedForward(members[0]));
        }

        for &next in &successors[g] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    debug!(
        graph = graph.name(),
        steps = steps.len(),
        clusters = clusters.len(),
        "evaluation plan computed"
    );
    Ok(EvaluationPlan { steps, clusters })
}

fn build_cluster(
    graph: &ValidatedGraph,
    number: usize,
    members: &[InstanceIdx],
) -> EquilibriumCluster {
    let inside = |idx: InstanceIdx| members.binary_search(&idx).is_ok();
    let mut internal_connections = Vec::new();
    let mut inbound_connections = Vec::new();
    for (i, conn) in graph.connections().iter().enumerate() {
        match (inside(conn.producer), inside(conn.consumer)) {
            (true, true) => internal_connections.push(i),
            (false, true) => inbound_connections.push(i),
            _ => {}
        }
    }
    EquilibriumCluster {
        name: format!("equilibrium_{number}"),
        members: members.to_vec(),
        internal_connections,
        inbound_connections,
    }
}
