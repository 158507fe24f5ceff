//! Incremental graph builder.

use std::path::PathBuf;

use pt_core::{InstanceIdx, InstanceKey, OptionMap, OptionValue, PtResult, PortRef};

use crate::graph::{ComponentInstance, Connection, PowerTrainGraph};

/// Builder for a power-train description.
///
/// Instances and connections are recorded in call order, which is the
/// "first appearance" order used for tie-breaking and diagnostics. `build()`
/// performs no semantic checks; run [`crate::validate`] on the result.
#[derive(Debug)]
pub struct GraphBuilder {
    name: String,
    output_directory: PathBuf,
    number_of_points: Option<usize>,
    instances: Vec<ComponentInstance>,
    connections: Vec<Connection>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_directory: PathBuf::from("outputs"),
            number_of_points: None,
            instances: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    pub fn number_of_points(mut self, n: usize) -> Self {
        self.number_of_points = Some(n);
        self
    }

    /// Add an instance with its options and external input values.
    pub fn add_instance(
        &mut self,
        key: InstanceKey,
        options: OptionMap,
        inputs: OptionMap,
    ) -> InstanceIdx {
        let idx = InstanceIdx::from_index(self.instances.len() as u32);
        self.instances.push(ComponentInstance {
            idx,
            key,
            options,
            inputs,
        });
        idx
    }

    /// Add an instance without options or external inputs.
    pub fn add_component(&mut self, type_tag: &str, id: &str) -> InstanceIdx {
        self.add_instance(InstanceKey::new(type_tag, id), OptionMap::new(), OptionMap::new())
    }

    pub fn set_option(&mut self, idx: InstanceIdx, name: &str, value: impl Into<OptionValue>) {
        if let Some(instance) = self.instances.get_mut(idx.as_usize()) {
            instance.options.insert(name, value);
        }
    }

    pub fn set_input(&mut self, idx: InstanceIdx, port: &str, value: impl Into<OptionValue>) {
        if let Some(instance) = self.instances.get_mut(idx.as_usize()) {
            instance.inputs.insert(port, value);
        }
    }

    /// Connect a producer output to a consumer input. Returns the connection index.
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> usize {
        let index = self.connections.len();
        self.connections.push(Connection { index, from, to });
        index
    }

    /// Connect two endpoints written as `[type:]id.port`.
    pub fn link(&mut self, from: &str, to: &str) -> PtResult<usize> {
        Ok(self.connect(from.parse()?, to.parse()?))
    }

    pub fn build(self) -> PowerTrainGraph {
        PowerTrainGraph {
            name: self.name,
            output_directory: self.output_directory,
            number_of_points: self.number_of_points,
            instances: self.instances,
            connections: self.connections,
        }
    }
}
