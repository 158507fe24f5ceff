//! The assembler state machine.
//!
//! `Unloaded → Loaded → Validated → Assembled`, one way. Any failure moves
//! to `Failed`, which keeps what went wrong and refuses further work.

use std::fmt;
use std::path::Path;

use pt_graph::{Assembly, Diagnostics, PowerTrainGraph, ValidatedGraph};
use pt_project::TopologyDef;
use pt_registry::TypeRegistry;
use tracing::{info, warn};

use crate::compile::compile_topology;
use crate::config::AssemblerConfig;
use crate::error::{AppError, AppResult};
use crate::handoff::EngineHandoff;

/// Name of an assembler state, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    Unloaded,
    Loaded,
    Validated,
    Assembled,
    Failed,
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageName::Unloaded => "unloaded",
            StageName::Loaded => "loaded",
            StageName::Validated => "validated",
            StageName::Assembled => "assembled",
            StageName::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What made an assembler fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The description could not be read or parsed.
    Load { message: String },
    /// Validation or ordering problems.
    Graph(Diagnostics),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Load { message } => f.write_str(message),
            Failure::Graph(diagnostics) => write!(f, "{diagnostics}"),
        }
    }
}

#[derive(Debug)]
enum Stage {
    Unloaded,
    Loaded(PowerTrainGraph),
    Validated(ValidatedGraph),
    Assembled(Assembly),
    Failed(Failure),
}

impl Stage {
    fn name(&self) -> StageName {
        match self {
            Stage::Unloaded => StageName::Unloaded,
            Stage::Loaded(_) => StageName::Loaded,
            Stage::Validated(_) => StageName::Validated,
            Stage::Assembled(_) => StageName::Assembled,
            Stage::Failed(_) => StageName::Failed,
        }
    }
}

/// Drives one description through loading, validation and assembly.
///
/// The registry is borrowed shared for the assembler's whole lifetime, so
/// no type can be registered while an assembly is in progress.
#[derive(Debug)]
pub struct Assembler<'r> {
    registry: &'r TypeRegistry,
    config: AssemblerConfig,
    stage: Stage,
}

impl<'r> Assembler<'r> {
    pub fn new(registry: &'r TypeRegistry, config: AssemblerConfig) -> Self {
        Self {
            registry,
            config,
            stage: Stage::Unloaded,
        }
    }

    pub fn stage(&self) -> StageName {
        self.stage.name()
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Read and parse a YAML description.
    pub fn load_file(&mut self, path: &Path) -> AppResult<()> {
        self.expect_stage("load", StageName::Unloaded)?;
        match pt_project::load_yaml(path) {
            Ok(topology) => self.load_topology(&topology),
            Err(err) => Err(self.fail_load(err)),
        }
    }

    pub fn load_str(&mut self, content: &str) -> AppResult<()> {
        self.expect_stage("load", StageName::Unloaded)?;
        match pt_project::from_yaml_str(content) {
            Ok(topology) => self.load_topology(&topology),
            Err(err) => Err(self.fail_load(err)),
        }
    }

    pub fn load_topology(&mut self, topology: &TopologyDef) -> AppResult<()> {
        self.load_graph(compile_topology(topology))
    }

    pub fn load_graph(&mut self, graph: PowerTrainGraph) -> AppResult<()> {
        self.expect_stage("load", StageName::Unloaded)?;
        info!(
            topology = graph.name(),
            components = graph.instances().len(),
            connections = graph.connections().len(),
            "topology loaded"
        );
        self.stage = Stage::Loaded(graph);
        Ok(())
    }

    /// Check the loaded graph against the registry.
    pub fn validate(&mut self) -> AppResult<&ValidatedGraph> {
        self.expect_stage("validate", StageName::Loaded)?;
        let Stage::Loaded(graph) = std::mem::replace(&mut self.stage, Stage::Unloaded) else {
            return Err(self.transition_error("validate"));
        };

        match pt_graph::validate(&graph, self.registry, &self.config.validation_options()) {
            Ok(validated) => {
                info!(topology = validated.name(), "topology validated");
                self.stage = Stage::Validated(validated);
            }
            Err(diagnostics) => return Err(self.fail_graph(diagnostics)),
        }

        match &self.stage {
            Stage::Validated(validated) => Ok(validated),
            _ => Err(self.transition_error("validate")),
        }
    }

    /// Order and name the validated graph.
    pub fn assemble(&mut self) -> AppResult<&Assembly> {
        self.expect_stage("assemble", StageName::Validated)?;
        let Stage::Validated(graph) = std::mem::replace(&mut self.stage, Stage::Unloaded) else {
            return Err(self.transition_error("assemble"));
        };

        match Assembly::assemble(graph, &self.config.equilibrium, &self.config.namer()) {
            Ok(assembly) => {
                info!(
                    topology = assembly.graph().name(),
                    steps = assembly.plan().steps().len(),
                    clusters = assembly.plan().clusters().len(),
                    "topology assembled"
                );
                self.stage = Stage::Assembled(assembly);
            }
            Err(err) => return Err(self.fail_graph(err.into())),
        }

        match &self.stage {
            Stage::Assembled(assembly) => Ok(assembly),
            _ => Err(self.transition_error("assemble")),
        }
    }

    pub fn assembly(&self) -> Option<&Assembly> {
        match &self.stage {
            Stage::Assembled(assembly) => Some(assembly),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.stage {
            Stage::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Validation or ordering diagnostics, once failed.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self.failure()? {
            Failure::Graph(diagnostics) => Some(diagnostics),
            Failure::Load { .. } => None,
        }
    }

    /// The description handed to an execution engine.
    pub fn handoff(&self) -> AppResult<EngineHandoff> {
        self.assembly()
            .map(EngineHandoff::from_assembly)
            .ok_or_else(|| self.transition_error("hand off"))
    }

    fn expect_stage(&self, action: &'static str, expected: StageName) -> AppResult<()> {
        if self.stage.name() == expected {
            Ok(())
        } else {
            Err(self.transition_error(action))
        }
    }

    fn transition_error(&self, action: &'static str) -> AppError {
        AppError::InvalidTransition {
            action,
            stage: self.stage.name(),
        }
    }

    fn fail_load(&mut self, err: pt_project::ProjectError) -> AppError {
        warn!(error = %err, "topology could not be loaded");
        self.stage = Stage::Failed(Failure::Load {
            message: err.to_string(),
        });
        err.into()
    }

    fn fail_graph(&mut self, diagnostics: Diagnostics) -> AppError {
        warn!(problems = diagnostics.len(), "topology rejected");
        self.stage = Stage::Failed(Failure::Graph(diagnostics.clone()));
        diagnostics.into()
    }
}

/// Load, validate and assemble a YAML description in one call.
pub fn assemble_file(
    path: &Path,
    registry: &TypeRegistry,
    config: &AssemblerConfig,
) -> AppResult<Assembly> {
    let mut assembler = Assembler::new(registry, config.clone());
    assembler.load_file(path)?;
    assembler.validate()?;
    Ok(assembler.assemble()?.clone())
}
