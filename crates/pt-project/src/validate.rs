//! Syntactic checks on a parsed description.
//!
//! Only the shape of entries is checked here; whether types, ports and
//! connections make sense is decided later against the type registry.

use crate::schema::TopologyDef;

pub const LATEST_VERSION: u32 = 1;

/// A syntactic problem, located by field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub field: String,
    pub message: String,
}

pub fn check_syntax(topology: &TopologyDef) -> Result<(), SyntaxError> {
    if topology.name.trim().is_empty() {
        return Err(SyntaxError {
            field: "name".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if topology.number_of_points == Some(0) {
        return Err(SyntaxError {
            field: "number_of_points".to_string(),
            message: "must be positive".to_string(),
        });
    }

    for (i, component) in topology.components.iter().enumerate() {
        check_identifier(&component.type_tag, &format!("components[{i}].type"))?;
        check_identifier(&component.id, &format!("components[{i}].id"))?;
    }

    Ok(())
}

fn check_identifier(value: &str, field: &str) -> Result<(), SyntaxError> {
    let invalid = |message: &str| SyntaxError {
        field: field.to_string(),
        message: message.to_string(),
    };

    if value.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.contains('.') || value.contains(':') {
        return Err(invalid("must not contain '.' or ':'"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    Ok(())
}
