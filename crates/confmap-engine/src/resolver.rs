//! Mapping resolution.

use std::any::TypeId;
use std::sync::Arc;

use confmap_core::{
    ConfigSection, ContentType, FieldIdentity, MappingError, MappingResult, ResolvedMapping,
    SectionDescriptor, SectionIdentity, TypeRef,
};
use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::RegisteredType;
use crate::scanner::TypeScanner;

/// Resolves and caches the mapping of each section type.
///
/// Mappings are computed once per type and shared as `Arc`s. When two
/// callers race to resolve the same type, the first insert wins and both
/// receive the same mapping.
#[derive(Debug)]
pub struct MappingResolver {
    scanner: TypeScanner,
    module_hint: Option<String>,
    cache: DashMap<TypeId, Arc<ResolvedMapping>>,
}

impl MappingResolver {
    /// Creates a resolver that discovers types through `scanner` using
    /// `module_hint`.
    pub fn new(scanner: TypeScanner, module_hint: Option<String>) -> Self {
        Self {
            scanner,
            module_hint,
            cache: DashMap::new(),
        }
    }

    /// The underlying scanner.
    pub fn scanner(&self) -> &TypeScanner {
        &self.scanner
    }

    /// Section types of the configured module.
    ///
    /// # Errors
    ///
    /// Propagates [`MappingError::Discovery`] from the scanner.
    pub fn discover(&self) -> MappingResult<Arc<[RegisteredType]>> {
        self.scanner.discover(self.module_hint.as_deref())
    }

    /// Resolves the mapping of `T`.
    ///
    /// Types outside the scanned module are resolved from their own
    /// descriptor.
    ///
    /// # Errors
    ///
    /// - [`MappingError::Discovery`] if the module hint is unresolvable
    /// - [`MappingError::NotFound`] if `T` has no section identity
    /// - [`MappingError::ContentTypeMismatch`] if `T` has a non-JSON
    ///   whole-object marker
    pub fn resolve<T: ConfigSection>(&self) -> MappingResult<Arc<ResolvedMapping>> {
        let id = TypeId::of::<T>();
        if let Some(mapping) = self.cache.get(&id) {
            return Ok(Arc::clone(mapping.value()));
        }

        self.discover()?;
        let registered = self.scanner.lookup(id).unwrap_or_else(|| {
            debug!(type_name = std::any::type_name::<T>(), "type not in scanned module");
            RegisteredType::of::<T>()
        });
        self.resolve_registered(&registered)
    }

    /// Resolves the mapping of an already registered type.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve), minus discovery.
    pub fn resolve_registered(
        &self,
        registered: &RegisteredType,
    ) -> MappingResult<Arc<ResolvedMapping>> {
        let type_ref = registered.type_ref();
        if let Some(mapping) = self.cache.get(&type_ref.id()) {
            return Ok(Arc::clone(mapping.value()));
        }

        let mapping = Arc::new(build_mapping(type_ref, &registered.descriptor())?);
        let entry = self
            .cache
            .entry(type_ref.id())
            .or_insert_with(|| {
                debug!(
                    type_name = type_ref.short_name(),
                    section = %mapping.section.section_name,
                    fields = mapping.fields.len(),
                    whole_object = mapping.is_whole_object(),
                    "cached section mapping"
                );
                Arc::clone(&mapping)
            });
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached mappings.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Builds a mapping from a descriptor.
fn build_mapping(
    type_ref: TypeRef,
    descriptor: &SectionDescriptor,
) -> MappingResult<ResolvedMapping> {
    let section_name = descriptor
        .section_name()
        .ok_or_else(|| MappingError::not_found(type_ref.short_name()))?;

    let section = SectionIdentity {
        section_name: section_name.to_string(),
        owner: type_ref,
    };

    if let Some(marker) = descriptor.whole_object_marker() {
        if marker.content_type != ContentType::Json {
            return Err(MappingError::content_type_mismatch(
                type_ref.short_name(),
                marker.content_type,
            ));
        }
        return Ok(ResolvedMapping {
            section,
            whole_object: Some(FieldIdentity {
                key: marker.key.clone(),
                content_type: marker.content_type,
                notify: marker.notify,
                owner_field: None,
            }),
            fields: IndexMap::new(),
        });
    }

    let fields = descriptor
        .fields()
        .iter()
        .map(|(name, marker)| {
            (
                name.clone(),
                FieldIdentity {
                    key: marker.key.clone(),
                    content_type: marker.content_type,
                    notify: marker.notify,
                    owner_field: Some(name.clone()),
                },
            )
        })
        .collect();

    Ok(ResolvedMapping {
        section,
        whole_object: None,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use confmap_test::fixtures::{
        CosmosConfiguration, EmptySection, InAssemblyObject, MismatchedWholeObject,
        SinglePropConfiguration, UnsectionedObject,
    };
    use pretty_assertions::assert_eq;

    fn resolver() -> MappingResolver {
        let catalog = TypeCatalog::new().with::<CosmosConfiguration>();
        MappingResolver::new(TypeScanner::new(catalog), None)
    }

    #[test]
    fn test_field_mode_mapping() {
        let mapping = resolver().resolve::<CosmosConfiguration>().unwrap();

        assert_eq!(mapping.section.section_name, "Cosmos");
        assert!(!mapping.is_whole_object());
        assert_eq!(
            mapping.fields.keys().collect::<Vec<_>>(),
            vec!["enabled", "connection_string", "database"]
        );
        let secret = &mapping.fields["connection_string"];
        assert_eq!(secret.content_type, ContentType::SecretRef);
        assert!(!secret.notify);
        assert_eq!(secret.owner_field.as_deref(), Some("connection_string"));
    }

    #[test]
    fn test_whole_object_mapping() {
        let mapping = resolver().resolve::<SinglePropConfiguration>().unwrap();

        let whole = mapping.whole_object.as_ref().unwrap();
        assert_eq!(whole.key, "SingleProp:Data");
        assert_eq!(whole.owner_field, None);
        assert!(mapping.fields.is_empty());
    }

    #[test]
    fn test_type_outside_scanned_module() {
        let mapping = resolver().resolve::<InAssemblyObject>().unwrap();
        assert_eq!(mapping.section.section_name, "InAssembly");
    }

    #[test]
    fn test_missing_section_is_not_found() {
        let err = resolver().resolve::<UnsectionedObject>().unwrap_err();
        assert!(matches!(
            err,
            MappingError::NotFound { ref type_name } if type_name == "UnsectionedObject"
        ));
    }

    #[test]
    fn test_non_json_whole_object_is_rejected() {
        let err = resolver().resolve::<MismatchedWholeObject>().unwrap_err();
        assert!(matches!(
            err,
            MappingError::ContentTypeMismatch {
                content_type: ContentType::String,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_section_is_valid() {
        let mapping = resolver().resolve::<EmptySection>().unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_mappings_are_cached() {
        let resolver = resolver();
        let first = resolver.resolve::<CosmosConfiguration>().unwrap();
        let second = resolver.resolve::<CosmosConfiguration>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn test_discovery_failure_propagates() {
        let resolver = MappingResolver::new(
            TypeScanner::new(TypeCatalog::new()),
            Some("Nowhere".to_string()),
        );
        let err = resolver.resolve::<CosmosConfiguration>().unwrap_err();
        assert!(matches!(err, MappingError::Discovery { .. }));
    }
}
