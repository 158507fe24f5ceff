use thiserror::Error;

pub type PtResult<T> = Result<T, PtError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PtError {
    #[error("Invalid port reference '{text}': {reason}")]
    InvalidPortRef { text: String, reason: &'static str },

    #[error("Unknown component category: {0}")]
    UnknownCategory(String),

    #[error("Option value has the wrong type: expected {expected}, found {found}")]
    OptionType {
        expected: &'static str,
        found: &'static str,
    },
}
