//! The component type registry.
//!
//! A registry is built once at process start (`TypeRegistry::builtin()` plus
//! any custom registrations) and then only read. Registration takes
//! `&mut self`, so while an assembly borrows the registry no registration can
//! happen.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::catalogue::ComponentKind;
use crate::descriptor::ComponentTypeDescriptor;
use crate::error::{RegistryError, RegistryResult};

/// Where a registered type comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Builtin(ComponentKind),
    Custom,
}

/// A registered type: its kind and its shared, immutable descriptor.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub kind: TypeKind,
    pub descriptor: Arc<ComponentTypeDescriptor>,
}

/// Catalogue mapping type tags to their descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: BTreeMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in component kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in ComponentKind::ALL {
            registry.insert(
                kind.type_tag().to_string(),
                TypeKind::Builtin(kind),
                kind.descriptor(),
            );
        }
        registry
    }

    /// Add or overwrite the descriptor for `type_tag`.
    ///
    /// The descriptor's own tag is aligned with `type_tag`. Returns the entry
    /// that was replaced, if any.
    pub fn register(
        &mut self,
        type_tag: impl Into<String>,
        mut descriptor: ComponentTypeDescriptor,
    ) -> RegistryResult<Option<TypeEntry>> {
        let type_tag = type_tag.into();
        descriptor.type_tag = type_tag.clone();
        descriptor.check()?;
        Ok(self.insert(type_tag, TypeKind::Custom, descriptor))
    }

    fn insert(
        &mut self,
        type_tag: String,
        kind: TypeKind,
        descriptor: ComponentTypeDescriptor,
    ) -> Option<TypeEntry> {
        let previous = self.entries.insert(
            type_tag.clone(),
            TypeEntry {
                kind,
                descriptor: Arc::new(descriptor),
            },
        );
        if previous.is_some() {
            debug!(type_tag = %type_tag, "replaced registered component type");
        }
        previous
    }

    /// Look up the entry for a type tag.
    pub fn resolve(&self, type_tag: &str) -> RegistryResult<&TypeEntry> {
        self.entries
            .get(type_tag)
            .ok_or_else(|| RegistryError::UnknownComponentType(type_tag.to_string()))
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.entries.contains_key(type_tag)
    }

    /// All entries, ordered by type tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeEntry)> + '_ {
        self.entries.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
