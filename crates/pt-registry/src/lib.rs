//! pt-registry: component type registry for the power-train assembler.
//!
//! Provides:
//! - Component type descriptors (ports, watchers, constructor options)
//! - The built-in hybrid-electric catalogue as a closed sum type
//! - A registry value mapping type tags to descriptors
//!
//! # Example
//!
//! ```
//! use pt_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::builtin();
//! let bus = registry.resolve("dc_bus").unwrap();
//! assert!(bus.descriptor.input_port("dc_voltage_in_1").is_some());
//! ```

pub mod catalogue;
pub mod descriptor;
pub mod error;
pub mod registry;

pub use catalogue::ComponentKind;
pub use descriptor::{
    ComponentTypeDescriptor, InputPort, OptionShape, OptionSpec, OutputPort, PortDirection,
    ShapeCheck,
};
pub use error::{RegistryError, RegistryResult};
pub use registry::{TypeEntry, TypeKind, TypeRegistry};
