//! Core graph data structures.

use std::path::{Path, PathBuf};

use pt_core::{InstanceIdx, InstanceKey, OptionMap, PortRef};

/// A component instance as declared: type, identifier and raw options.
///
/// Nothing here has been checked against the registry yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    /// Position in the description.
    pub idx: InstanceIdx,
    pub key: InstanceKey,
    pub options: OptionMap,
    /// Values supplied from outside the graph, keyed by input port.
    pub inputs: OptionMap,
}

/// A directed port-to-port link, producer output to consumer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Position in the description.
    pub index: usize,
    pub from: PortRef,
    pub to: PortRef,
}

/// Every instance and connection of one description, unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTrainGraph {
    pub(crate) name: String,
    pub(crate) output_directory: PathBuf,
    pub(crate) number_of_points: Option<usize>,
    pub(crate) instances: Vec<ComponentInstance>,
    pub(crate) connections: Vec<Connection>,
}

impl PowerTrainGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Global number of evaluation points, if declared.
    pub fn number_of_points(&self) -> Option<usize> {
        self.number_of_points
    }

    pub fn instances(&self) -> &[ComponentInstance] {
        &self.instances
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn instance(&self, idx: InstanceIdx) -> Option<&ComponentInstance> {
        self.instances.get(idx.as_usize())
    }
}
