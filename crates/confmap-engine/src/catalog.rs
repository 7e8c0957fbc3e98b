//! Static registry of mappable types.
//!
//! Types are registered explicitly at startup, either in the *current*
//! module or under a named *referenced* module:
//!
//! ```
//! use confmap_engine::TypeCatalog;
//! # use confmap_test::fixtures::{CosmosConfiguration, InAssemblyObject, SinglePropConfiguration};
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<InAssemblyObject>();
//! catalog
//!     .module("AppConfigModelLib")
//!     .register::<CosmosConfiguration>()
//!     .register::<SinglePropConfiguration>();
//!
//! assert_eq!(catalog.current().len(), 1);
//! assert_eq!(catalog.find_module("ModelLib").map(|(_, types)| types.len()), Some(2));
//! ```

use std::fmt;

use confmap_core::{ConfigSection, SectionDescriptor, TypeRef};
use indexmap::IndexMap;

/// A registered type and its descriptor function.
#[derive(Clone, Copy)]
pub struct RegisteredType {
    type_ref: TypeRef,
    descriptor: fn() -> SectionDescriptor,
}

impl RegisteredType {
    /// Registration entry for `T`.
    pub fn of<T: ConfigSection>() -> Self {
        Self {
            type_ref: TypeRef::of::<T>(),
            descriptor: T::descriptor,
        }
    }

    /// The registered type.
    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// Builds the type's descriptor.
    pub fn descriptor(&self) -> SectionDescriptor {
        (self.descriptor)()
    }

    /// Whether the type carries a section identity.
    pub fn has_section(&self) -> bool {
        self.descriptor().section_name().is_some()
    }
}

impl fmt::Debug for RegisteredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegisteredType").field(&self.type_ref).finish()
    }
}

/// Module-scoped lists of registered types.
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    current: Vec<RegisteredType>,
    modules: IndexMap<String, Vec<RegisteredType>>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` in the current module.
    pub fn register<T: ConfigSection>(&mut self) -> &mut Self {
        push_unique(&mut self.current, RegisteredType::of::<T>());
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<T: ConfigSection>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Opens (creating if needed) a named referenced module for registration.
    pub fn module(&mut self, name: impl Into<String>) -> ModuleRegistrar<'_> {
        let types = self.modules.entry(name.into()).or_default();
        ModuleRegistrar { types }
    }

    /// Types registered in the current module.
    pub fn current(&self) -> &[RegisteredType] {
        &self.current
    }

    /// Names of referenced modules in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// First referenced module whose name contains `hint`.
    pub fn find_module(&self, hint: &str) -> Option<(&str, &[RegisteredType])> {
        self.modules
            .iter()
            .find(|(name, _)| name.contains(hint))
            .map(|(name, types)| (name.as_str(), types.as_slice()))
    }
}

/// Registration handle for one referenced module.
#[derive(Debug)]
pub struct ModuleRegistrar<'a> {
    types: &'a mut Vec<RegisteredType>,
}

impl ModuleRegistrar<'_> {
    /// Registers `T` in this module.
    pub fn register<T: ConfigSection>(&mut self) -> &mut Self {
        push_unique(self.types, RegisteredType::of::<T>());
        self
    }
}

fn push_unique(types: &mut Vec<RegisteredType>, entry: RegisteredType) {
    if !types.iter().any(|t| t.type_ref == entry.type_ref) {
        types.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmap_test::fixtures::{CosmosConfiguration, InAssemblyObject, UnsectionedObject};

    #[test]
    fn test_register_is_idempotent() {
        let mut catalog = TypeCatalog::new();
        catalog.register::<InAssemblyObject>().register::<InAssemblyObject>();
        assert_eq!(catalog.current().len(), 1);
    }

    #[test]
    fn test_find_module_by_substring() {
        let mut catalog = TypeCatalog::new();
        catalog.module("Contoso.Models").register::<CosmosConfiguration>();
        catalog.module("Contoso.Other");

        let (name, types) = catalog.find_module("Models").unwrap();
        assert_eq!(name, "Contoso.Models");
        assert_eq!(types.len(), 1);

        // First match in registration order wins.
        assert_eq!(catalog.find_module("Contoso").unwrap().0, "Contoso.Models");
        assert!(catalog.find_module("models").is_none());
    }

    #[test]
    fn test_has_section() {
        assert!(RegisteredType::of::<CosmosConfiguration>().has_section());
        assert!(!RegisteredType::of::<UnsectionedObject>().has_section());
    }
}
