//! pt-core: shared foundation for the power-train assembler.
//!
//! Contains:
//! - ids (compact instance indices, instance keys, port references)
//! - category (the closed set of component categories)
//! - options (option values and their cardinality)
//! - error (shared error types)

pub mod category;
pub mod error;
pub mod ids;
pub mod options;

// Re-exports: nice ergonomics for downstream crates
pub use category::Category;
pub use error::{PtError, PtResult};
pub use ids::*;
pub use options::{OptionMap, OptionValue};
