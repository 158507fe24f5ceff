//! Component type descriptors: the port and constructor contract of a type tag.

use std::collections::HashSet;

use pt_core::{Category, OptionValue};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Direction of a port, seen from the component that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

/// Declared input port.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPort {
    pub name: String,
    pub unit: String,
    /// Mandatory inputs must be driven by a connection or an external value.
    pub mandatory: bool,
    /// Documented default used when an optional input is left unconnected.
    pub default: Option<f64>,
}

/// Declared output port.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPort {
    pub name: String,
    pub unit: String,
}

/// Expected cardinality of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionShape {
    /// Exactly one value.
    Scalar,
    /// A fixed small count of values.
    Fixed(usize),
    /// One value per evaluation point.
    PerPoint,
    /// Either one value, broadcast, or one value per evaluation point.
    ScalarOrPerPoint,
}

/// Outcome of checking a value's cardinality against a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeCheck {
    Ok,
    Mismatch,
    /// The shape depends on `number_of_points`, which is not known.
    NeedsPoints,
}

impl OptionShape {
    pub fn check(self, cardinality: usize, number_of_points: Option<usize>) -> ShapeCheck {
        match self {
            OptionShape::Scalar => Self::verdict(cardinality == 1),
            OptionShape::Fixed(n) => Self::verdict(cardinality == n),
            OptionShape::PerPoint => match number_of_points {
                Some(n) => Self::verdict(cardinality == n),
                None => ShapeCheck::NeedsPoints,
            },
            OptionShape::ScalarOrPerPoint => match (cardinality, number_of_points) {
                (1, _) => ShapeCheck::Ok,
                (c, Some(n)) => Self::verdict(c == n),
                (_, None) => ShapeCheck::NeedsPoints,
            },
        }
    }

    /// Human-readable expected cardinality.
    pub fn describe(self, number_of_points: Option<usize>) -> String {
        let points =
            number_of_points.map_or_else(|| "number_of_points".to_string(), |n| n.to_string());
        match self {
            OptionShape::Scalar => "1".to_string(),
            OptionShape::Fixed(n) => n.to_string(),
            OptionShape::PerPoint => points,
            OptionShape::ScalarOrPerPoint => format!("1 or {points}"),
        }
    }

    fn verdict(ok: bool) -> ShapeCheck {
        if ok { ShapeCheck::Ok } else { ShapeCheck::Mismatch }
    }
}

/// Constructor option accepted by a component type.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub shape: OptionShape,
    pub required: bool,
    pub default: Option<OptionValue>,
    /// Allowed textual values; empty means any value is accepted.
    pub choices: Vec<String>,
}

impl OptionSpec {
    /// A required option with no default.
    pub fn required(name: impl Into<String>, shape: OptionShape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
            default: None,
            choices: Vec::new(),
        }
    }

    /// An optional option with a documented default.
    pub fn with_default(
        name: impl Into<String>,
        shape: OptionShape,
        default: impl Into<OptionValue>,
    ) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
            default: Some(default.into()),
            choices: Vec::new(),
        }
    }

    /// A textual option restricted to `choices`, falling back to `default`.
    pub fn choice(name: impl Into<String>, choices: &[&str], default: &str) -> Self {
        Self {
            name: name.into(),
            shape: OptionShape::Scalar,
            required: false,
            default: Some(OptionValue::from(default)),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn accepts_choice(&self, value: &str) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|c| c == value)
    }
}

/// Port and constructor contract of one component type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTypeDescriptor {
    pub type_tag: String,
    pub category: Category,
    pub inputs: Vec<InputPort>,
    pub outputs: Vec<OutputPort>,
    /// Names of ports eligible for per-time-step reporting.
    pub watchers: Vec<String>,
    pub options: Vec<OptionSpec>,
    /// Output carrying the consumed fuel or energy, for aggregation.
    pub consumption_port: Option<String>,
}

impl ComponentTypeDescriptor {
    pub fn new(type_tag: impl Into<String>, category: Category) -> Self {
        Self {
            type_tag: type_tag.into(),
            category,
            inputs: Vec::new(),
            outputs: Vec::new(),
            watchers: Vec::new(),
            options: Vec::new(),
            consumption_port: None,
        }
    }

    /// Add a mandatory input port.
    pub fn input(mut self, name: &str, unit: &str) -> Self {
        self.inputs.push(InputPort {
            name: name.to_string(),
            unit: unit.to_string(),
            mandatory: true,
            default: None,
        });
        self
    }

    /// Add an optional input port with its documented default.
    pub fn optional_input(mut self, name: &str, unit: &str, default: f64) -> Self {
        self.inputs.push(InputPort {
            name: name.to_string(),
            unit: unit.to_string(),
            mandatory: false,
            default: Some(default),
        });
        self
    }

    pub fn output(mut self, name: &str, unit: &str) -> Self {
        self.outputs.push(OutputPort {
            name: name.to_string(),
            unit: unit.to_string(),
        });
        self
    }

    /// Mark a declared port as watcher-eligible.
    pub fn watch(mut self, port: &str) -> Self {
        self.watchers.push(port.to_string());
        self
    }

    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    pub fn consumes(mut self, port: &str) -> Self {
        self.consumption_port = Some(port.to_string());
        self
    }

    pub fn input_port(&self, name: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output_port(&self, name: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn port_direction(&self, name: &str) -> Option<PortDirection> {
        if self.input_port(name).is_some() {
            Some(PortDirection::Input)
        } else if self.output_port(name).is_some() {
            Some(PortDirection::Output)
        } else {
            None
        }
    }

    pub fn port_unit(&self, name: &str) -> Option<&str> {
        self.input_port(name)
            .map(|p| p.unit.as_str())
            .or_else(|| self.output_port(name).map(|p| p.unit.as_str()))
    }

    pub fn option_spec(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Watcher-eligible variables paired with their unit.
    pub fn watcher_variables(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.watchers
            .iter()
            .filter_map(|w| self.port_unit(w).map(|unit| (w.as_str(), unit)))
    }

    /// Check internal consistency before registration.
    pub fn check(&self) -> RegistryResult<()> {
        let invalid = |what: String| RegistryError::InvalidDescriptor {
            type_tag: self.type_tag.clone(),
            what,
        };

        if self.type_tag.trim().is_empty() {
            return Err(invalid("type tag must not be empty".to_string()));
        }

        let mut port_names = HashSet::new();
        let all_ports = self
            .inputs
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.outputs.iter().map(|p| p.name.as_str()));
        for name in all_ports {
            if name.is_empty() || name.contains('.') || name.contains(':') {
                return Err(invalid(format!("invalid port name '{name}'")));
            }
            if !port_names.insert(name) {
                return Err(invalid(format!("port '{name}' declared twice")));
            }
        }

        for input in &self.inputs {
            if input.mandatory && input.default.is_some() {
                return Err(invalid(format!(
                    "mandatory input '{}' must not carry a default",
                    input.name
                )));
            }
        }

        for watcher in &self.watchers {
            if !port_names.contains(watcher.as_str()) {
                return Err(invalid(format!("watcher '{watcher}' is not a declared port")));
            }
        }

        if let Some(port) = &self.consumption_port
            && self.output_port(port).is_none()
        {
            return Err(invalid(format!("consumption port '{port}' is not a declared output")));
        }

        let mut option_names = HashSet::new();
        for spec in &self.options {
            if !option_names.insert(spec.name.as_str()) {
                return Err(invalid(format!("option '{}' declared twice", spec.name)));
            }
            if let Some(default) = &spec.default {
                if spec.shape.check(default.cardinality(), None) == ShapeCheck::Mismatch {
                    return Err(invalid(format!(
                        "default of option '{}' does not match its shape",
                        spec.name
                    )));
                }
                if let Some(text) = default.as_str()
                    && !spec.accepts_choice(text)
                {
                    return Err(invalid(format!(
                        "default '{}' of option '{}' is not one of its choices",
                        text, spec.name
                    )));
                }
            }
        }

        Ok(())
    }
}
