//! Seam between an assembly and the numerical engine that runs it.
//!
//! The assembler never evaluates physics. An engine supplies a
//! [`FeedForwardEvaluator`] for single instances and an
//! [`EquilibriumSolver`] for clusters; [`execute_plan`] walks the plan,
//! copying promoted values from producers to consumers between steps.

use std::collections::BTreeMap;

use pt_core::{InstanceKey, OptionValue};
use pt_graph::{Assembly, EquilibriumCluster, NamingTable, PlanStep, ResolvedInstance};
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Evaluation of {instance} failed: {message}")]
    Evaluation { instance: InstanceKey, message: String },

    #[error("Equilibrium solver failed on {cluster}: {message}")]
    Solver { cluster: String, message: String },

    #[error("Variable '{0}' has no value")]
    MissingValue(String),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Variable values by generated name, one value per evaluation point
/// (or a single broadcast value).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableState(BTreeMap<String, Vec<f64>>);

impl VariableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Like `get`, but a missing value is an error.
    pub fn require(&self, name: &str) -> ExecutionResult<&[f64]> {
        self.get(name)
            .ok_or_else(|| ExecutionError::MissingValue(name.to_string()))
    }

    pub fn set(&mut self, name: impl Into<String>, values: Vec<f64>) -> Option<Vec<f64>> {
        self.0.insert(name.into(), values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Evaluates one instance: reads its inputs from `state`, writes its outputs.
pub trait FeedForwardEvaluator {
    fn evaluate(
        &mut self,
        instance: &ResolvedInstance,
        names: &NamingTable,
        state: &mut VariableState,
    ) -> ExecutionResult<()>;
}

/// One equilibrium cluster as seen by a solver.
#[derive(Debug)]
pub struct ClusterProblem<'a> {
    pub cluster: &'a EquilibriumCluster,
    pub members: Vec<&'a ResolvedInstance>,
    pub names: &'a NamingTable,
    /// (consumer, producer) variable names of the cluster's internal connections.
    pub internal_links: Vec<(&'a str, &'a str)>,
}

impl ClusterProblem<'_> {
    /// Copy every internal producer value that exists into its consumer.
    pub fn propagate(&self, state: &mut VariableState) {
        for &(consumer, producer) in &self.internal_links {
            if let Some(values) = state.get(producer).map(<[f64]>::to_vec) {
                state.set(consumer, values);
            }
        }
    }
}

/// Resolves a cluster of mutually dependent instances.
pub trait EquilibriumSolver {
    fn solve(
        &mut self,
        problem: &ClusterProblem<'_>,
        initial_state: VariableState,
    ) -> ExecutionResult<VariableState>;
}

/// Run every step of the plan in order, starting from `initial`.
///
/// External input values and documented defaults of unconnected optional
/// inputs are seeded first; `initial` wins over both.
pub fn execute_plan(
    assembly: &Assembly,
    evaluator: &mut dyn FeedForwardEvaluator,
    solver: &mut dyn EquilibriumSolver,
    initial: VariableState,
) -> ExecutionResult<VariableState> {
    let names = assembly.names();
    let mut state = seed(assembly);
    for (name, values) in initial.0 {
        state.set(name, values);
    }

    for step in assembly.plan().steps() {
        match *step {
            PlanStep::FeedForward(idx) => {
                let Some(instance) = assembly.graph().instance(idx) else { continue };
                promote_into(assembly, instance, &mut state);
                trace!(instance = %instance.key, "evaluating");
                evaluator.evaluate(instance, names, &mut state)?;
            }
            PlanStep::Equilibrium(c) => {
                let Some(cluster) = assembly.plan().clusters().get(c) else { continue };
                let members: Vec<_> = cluster
                    .members
                    .iter()
                    .filter_map(|&m| assembly.graph().instance(m))
                    .collect();
                for member in &members {
                    promote_into(assembly, member, &mut state);
                }
                let problem = ClusterProblem {
                    cluster,
                    members,
                    names,
                    internal_links: internal_links(assembly, cluster),
                };
                debug!(cluster = %cluster.name, "solving equilibrium");
                state = solver.solve(&problem, state)?;
            }
        }
    }

    Ok(state)
}

fn seed(assembly: &Assembly) -> VariableState {
    let names = assembly.names();
    let promotions = assembly.promotions();
    let mut state = VariableState::new();
    for instance in assembly.graph().instances() {
        for input in &instance.descriptor.inputs {
            let Some(name) = names.name_of(instance.idx, &input.name) else { continue };
            let external = instance.inputs.get(&input.name).and_then(numeric_values);
            match (external, input.default) {
                (Some(values), _) => {
                    state.set(name, values);
                }
                (None, Some(default)) if promotions.get(name).is_none() => {
                    state.set(name, vec![default]);
                }
                _ => {}
            }
        }
    }
    state
}

fn numeric_values(value: &OptionValue) -> Option<Vec<f64>> {
    match value {
        OptionValue::Array(values) => Some(values.clone()),
        other => other.as_f64().ok().map(|v| vec![v]),
    }
}

fn promote_into(assembly: &Assembly, instance: &ResolvedInstance, state: &mut VariableState) {
    let names = assembly.names();
    for input in &instance.descriptor.inputs {
        let Some(consumer) = names.name_of(instance.idx, &input.name) else { continue };
        let Some(producer) = assembly.promotions().get(consumer) else { continue };
        if let Some(values) = state.get(producer).map(<[f64]>::to_vec) {
            state.set(consumer, values);
        }
    }
}

fn internal_links<'a>(
    assembly: &'a Assembly,
    cluster: &EquilibriumCluster,
) -> Vec<(&'a str, &'a str)> {
    let names = assembly.names();
    cluster
        .internal_connections
        .iter()
        .filter_map(|&c| {
            let conn = assembly.graph().connections().get(c)?;
            Some((
                names.name_of(conn.consumer, &conn.consumer_port)?,
                names.name_of(conn.producer, &conn.producer_port)?,
            ))
        })
        .collect()
}
