//! Shared application service layer for the power-train assembler.
//!
//! Turns a topology file into an assembly through the assembler state
//! machine, produces the engine hand-off, and defines the seam an
//! execution engine plugs its evaluators and equilibrium solver into.

pub mod assembler;
pub mod compile;
pub mod config;
pub mod error;
pub mod execution;
pub mod handoff;

pub use assembler::{Assembler, Failure, StageName, assemble_file};
pub use compile::compile_topology;
pub use config::AssemblerConfig;
pub use error::{AppError, AppResult};
pub use execution::{
    ClusterProblem, EquilibriumSolver, ExecutionError, ExecutionResult, FeedForwardEvaluator,
    VariableState, execute_plan,
};
pub use handoff::{
    Dispatch, EngineHandoff, HandoffCluster, HandoffComponent, HandoffLink, HandoffStep,
};
