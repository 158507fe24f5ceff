//! Cross-cutting views over an assembly, used by aggregation and reporting.

use std::path::PathBuf;

use pt_core::{Category, InstanceKey};
use serde::Serialize;

use crate::assembly::Assembly;

/// An instance whose consumption is aggregated (fuel burnt, energy drawn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergySource {
    pub instance: InstanceKey,
    pub category: Category,
    /// Variable carrying the consumed quantity, when the type declares one.
    pub consumption_variable: Option<String>,
}

/// A variable reported at every time step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchedVariable {
    pub instance: InstanceKey,
    pub port: String,
    pub unit: String,
    pub variable: String,
}

impl Assembly {
    /// Sources and storage, in plan order.
    pub fn energy_consuming_sources(&self) -> Vec<EnergySource> {
        self.ordered_instances()
            .filter(|i| i.category().consumes_energy())
            .map(|i| EnergySource {
                instance: i.key.clone(),
                category: i.category(),
                consumption_variable: i
                    .descriptor
                    .consumption_port
                    .as_deref()
                    .and_then(|port| self.names().name_of(i.idx, port))
                    .map(str::to_string),
            })
            .collect()
    }

    /// Every watcher-eligible port, in plan order.
    pub fn performance_watcher_variables(&self) -> Vec<WatchedVariable> {
        let mut watched = Vec::new();
        for instance in self.ordered_instances() {
            for (port, unit) in instance.descriptor.watcher_variables() {
                let Some(variable) = self.names().name_of(instance.idx, port) else {
                    continue;
                };
                watched.push(WatchedVariable {
                    instance: instance.key.clone(),
                    port: port.to_string(),
                    unit: unit.to_string(),
                    variable: variable.to_string(),
                });
            }
        }
        watched
    }

    /// Per-instance output file: `<output_directory>/<type_tag>_<id>.csv`.
    ///
    /// `None` when `instance` is not part of the assembly.
    pub fn output_file_path(&self, instance: &InstanceKey) -> Option<PathBuf> {
        self.instance(instance)?;
        Some(
            self.graph()
                .output_directory()
                .join(format!("{}_{}.csv", instance.type_tag, instance.id)),
        )
    }
}
