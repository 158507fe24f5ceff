//! Registry error types.

use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown component type: '{0}'")]
    UnknownComponentType(String),

    #[error("Invalid descriptor for '{type_tag}': {what}")]
    InvalidDescriptor { type_tag: String, what: String },
}
