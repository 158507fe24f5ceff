//! pt-graph: graph layer of the power-train assembler.
//!
//! Provides:
//! - The unvalidated graph model and its incremental builder
//! - Exhaustive validation against a type registry
//! - Dependency ordering into feed-forward steps and equilibrium clusters
//! - Variable naming and the promotion map
//! - Derived views (energy sources, watched variables, output paths)
//!
//! # Example
//!
//! ```
//! use pt_graph::{
//!     Assembly, EquilibriumPolicy, GraphBuilder, ValidationOptions, VariableNamer, validate,
//! };
//! use pt_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::builtin();
//! let mut builder = GraphBuilder::new("aux");
//! let load = builder.add_component("auxiliary_load", "aux_1");
//! builder.set_input(load, "dc_voltage_in", 540.0);
//!
//! let graph = validate(&builder.build(), &registry, &ValidationOptions::default()).unwrap();
//! let assembly =
//!     Assembly::assemble(graph, &EquilibriumPolicy::default(), &VariableNamer::default())
//!         .unwrap();
//! assert_eq!(assembly.plan().steps().len(), 1);
//! ```

pub mod assembly;
pub mod builder;
pub mod error;
pub mod graph;
pub mod naming;
pub mod order;
pub mod validate;
pub mod views;

#[cfg(test)]
mod test_utils;

pub use assembly::Assembly;
pub use builder::GraphBuilder;
pub use error::{DiagnosticKind, Diagnostics, GraphError, GraphResult, Origin};
pub use graph::{ComponentInstance, Connection, PowerTrainGraph};
pub use naming::{DEFAULT_NAMESPACE, NamingTable, PortAddress, PromotionMap, VariableNamer};
pub use order::{EquilibriumCluster, EquilibriumPolicy, EvaluationPlan, PlanStep, order};
pub use validate::{
    NUMBER_OF_POINTS, ResolvedConnection, ResolvedInstance, UnknownValuePolicy, ValidatedGraph,
    ValidationOptions, validate,
};
pub use views::{EnergySource, WatchedVariable};
