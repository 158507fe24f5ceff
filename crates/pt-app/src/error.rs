//! Error types for the pt-app service layer.

use std::path::PathBuf;

use pt_graph::Diagnostics;

use crate::assembler::StageName;
use crate::execution::ExecutionError;

/// Application error wrapping the backend crates, shared by every front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Topology error: {0}")]
    Project(#[from] pt_project::ProjectError),

    #[error("Registry error: {0}")]
    Registry(#[from] pt_registry::RegistryError),

    #[error("Assembly failed: {0}")]
    Diagnostics(Diagnostics),

    #[error("Cannot {action} while the assembler is {stage}")]
    InvalidTransition {
        action: &'static str,
        stage: StageName,
    },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<Diagnostics> for AppError {
    fn from(diagnostics: Diagnostics) -> Self {
        AppError::Diagnostics(diagnostics)
    }
}

impl From<pt_graph::GraphError> for AppError {
    fn from(err: pt_graph::GraphError) -> Self {
        AppError::Diagnostics(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
