//! Diagnostics raised while validating, ordering and naming a graph.

use std::fmt;

use pt_core::{InstanceKey, PortRef};

pub type GraphResult<T> = Result<T, GraphError>;

/// Entry of the description a diagnostic points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    Component(usize),
    Connection(usize),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Component(i) => write!(f, "components[{i}]"),
            Origin::Connection(i) => write!(f, "connections[{i}]"),
        }
    }
}

/// Tag identifying the class of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UnknownComponentType,
    DanglingConnection,
    PortDirectionMismatch,
    DuplicateInstanceId,
    UnresolvedMandatoryInput,
    FanInConflict,
    MissingRequiredOption,
    ControlParameterInconsistentShape,
    UnrecognizedOptionValue,
    CyclicDependencyUnresolved,
}

/// A single problem found in a power-train description.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unknown component type '{type_tag}' for instance '{id}' ({origin})")]
    UnknownComponentType {
        type_tag: String,
        id: String,
        origin: Origin,
    },

    #[error("Dangling connection endpoint '{endpoint}' ({origin}): {reason}")]
    DanglingConnection {
        endpoint: PortRef,
        reason: String,
        origin: Origin,
    },

    #[error("Port direction mismatch at '{endpoint}' ({origin}): {reason}")]
    PortDirectionMismatch {
        endpoint: PortRef,
        reason: String,
        origin: Origin,
    },

    #[error("Duplicate instance id '{id}' for type '{type_tag}' ({origin}): {reason}")]
    DuplicateInstanceId {
        type_tag: String,
        id: String,
        reason: String,
        origin: Origin,
    },

    #[error("Mandatory input '{port}' of {instance} is neither connected nor supplied ({origin})")]
    UnresolvedMandatoryInput {
        instance: InstanceKey,
        port: String,
        origin: Origin,
    },

    #[error("Input '{port}' of {instance} is driven {drivers} times; at most one driver is allowed ({origin})")]
    FanInConflict {
        instance: InstanceKey,
        port: String,
        drivers: usize,
        origin: Origin,
    },

    #[error("Instance {instance} is missing required option '{option}' ({origin})")]
    MissingRequiredOption {
        instance: InstanceKey,
        option: String,
        origin: Origin,
    },

    #[error("Option '{option}' of {instance} carries {actual} value(s), expected {expected} ({origin})")]
    ControlParameterInconsistentShape {
        instance: InstanceKey,
        option: String,
        expected: String,
        actual: usize,
        origin: Origin,
    },

    #[error(
        "Option '{option}' of {instance} has unrecognized value '{value}', expected one of [{}] ({origin})",
        .allowed.join(", ")
    )]
    UnrecognizedOptionValue {
        instance: InstanceKey,
        option: String,
        value: String,
        allowed: Vec<String>,
        origin: Origin,
    },

    #[error(
        "Cyclic dependency between [{}] cannot be resolved as an equilibrium: {reason} (offending: [{}])",
        join_keys(.members),
        join_keys(.offending)
    )]
    CyclicDependencyUnresolved {
        members: Vec<InstanceKey>,
        offending: Vec<InstanceKey>,
        reason: String,
    },
}

impl GraphError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            GraphError::UnknownComponentType { .. } => DiagnosticKind::UnknownComponentType,
            GraphError::DanglingConnection { .. } => DiagnosticKind::DanglingConnection,
            GraphError::PortDirectionMismatch { .. } => DiagnosticKind::PortDirectionMismatch,
            GraphError::DuplicateInstanceId { .. } => DiagnosticKind::DuplicateInstanceId,
            GraphError::UnresolvedMandatoryInput { .. } => DiagnosticKind::UnresolvedMandatoryInput,
            GraphError::FanInConflict { .. } => DiagnosticKind::FanInConflict,
            GraphError::MissingRequiredOption { .. } => DiagnosticKind::MissingRequiredOption,
            GraphError::ControlParameterInconsistentShape { .. } => {
                DiagnosticKind::ControlParameterInconsistentShape
            }
            GraphError::UnrecognizedOptionValue { .. } => DiagnosticKind::UnrecognizedOptionValue,
            GraphError::CyclicDependencyUnresolved { .. } => {
                DiagnosticKind::CyclicDependencyUnresolved
            }
        }
    }

    /// The description entry this diagnostic points at, when there is one.
    pub fn origin(&self) -> Option<Origin> {
        match self {
            GraphError::UnknownComponentType { origin, .. }
            | GraphError::DanglingConnection { origin, .. }
            | GraphError::PortDirectionMismatch { origin, .. }
            | GraphError::DuplicateInstanceId { origin, .. }
            | GraphError::UnresolvedMandatoryInput { origin, .. }
            | GraphError::FanInConflict { origin, .. }
            | GraphError::MissingRequiredOption { origin, .. }
            | GraphError::ControlParameterInconsistentShape { origin, .. }
            | GraphError::UnrecognizedOptionValue { origin, .. } => Some(*origin),
            GraphError::CyclicDependencyUnresolved { .. } => None,
        }
    }
}

fn join_keys(keys: &[InstanceKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every problem collected in one pass over a description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<GraphError>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: GraphError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphError> + '_ {
        self.0.iter()
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.0.iter().any(|e| e.kind() == kind)
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &GraphError> + '_ {
        self.0.iter().filter(move |e| e.kind() == kind)
    }
}

impl From<GraphError> for Diagnostics {
    fn from(error: GraphError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for Diagnostics {
    type Item = GraphError;
    type IntoIter = std::vec::IntoIter<GraphError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problem(s) found", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
