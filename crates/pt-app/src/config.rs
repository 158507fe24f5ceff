//! Assembler configuration.

use std::path::Path;

use pt_graph::{
    DEFAULT_NAMESPACE, EquilibriumPolicy, UnknownValuePolicy, ValidationOptions, VariableNamer,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Tunables of one assembly run. Every field has a default, so an empty
/// file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerConfig {
    pub equilibrium: EquilibriumPolicy,
    /// Prefix of every generated variable name.
    pub namespace: String,
    pub unknown_option_values: UnknownValuePolicy,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            equilibrium: EquilibriumPolicy::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            unknown_option_values: UnknownValuePolicy::default(),
        }
    }
}

impl AssemblerConfig {
    pub fn load_yaml(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), "loaded assembler config");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn namer(&self) -> VariableNamer {
        VariableNamer::new(self.namespace.clone())
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            unknown_option_values: self.unknown_option_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_core::Category;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(AssemblerConfig::from_yaml_str("").unwrap(), AssemblerConfig::default());
        assert_eq!(AssemblerConfig::from_yaml_str("{}").unwrap(), AssemblerConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = AssemblerConfig::from_yaml_str(
            "unknown_option_values: error\nequilibrium:\n  require_bus: false\n",
        )
        .unwrap();
        assert_eq!(config.unknown_option_values, UnknownValuePolicy::Error);
        assert!(!config.equilibrium.require_bus);
        assert!(config.equilibrium.allowed_categories.contains(&Category::Bus));
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AssemblerConfig::from_yaml_str("namespce: x\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = AssemblerConfig::from_yaml_str("equilibrium:\n  allowed_categories: [plasma]\n")
            .unwrap_err();
        assert!(err.to_string().contains("plasma"));
    }
}
