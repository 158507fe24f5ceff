//! Topology description schema.

use std::path::PathBuf;

use pt_core::{OptionMap, PortRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TopologyDef {
    pub version: u32,
    pub name: String,
    /// Directory receiving per-component artifacts.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// Evaluation points shared by every instance that does not override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_points: Option<usize>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ComponentDef {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "OptionMap::is_empty")]
    pub options: OptionMap,
    /// Externally supplied values for input ports that are not connected.
    #[serde(default, skip_serializing_if = "OptionMap::is_empty")]
    pub inputs: OptionMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDef {
    pub from: PortRef,
    pub to: PortRef,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("outputs")
}
