//! Section type discovery.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use confmap_core::{MappingError, MappingResult};
use tracing::{debug, info};

use crate::catalog::{RegisteredType, TypeCatalog};

/// Discovers the section types of one module and memoizes the result.
///
/// The first successful [`discover`](Self::discover) call fixes the result
/// for the life of the scanner; later calls return it regardless of the hint
/// they pass. A failed discovery is not memoized.
#[derive(Debug)]
pub struct TypeScanner {
    catalog: TypeCatalog,
    discovered: OnceLock<Arc<[RegisteredType]>>,
}

impl TypeScanner {
    /// Creates a scanner over `catalog`.
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            discovered: OnceLock::new(),
        }
    }

    /// The catalog this scanner reads.
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Returns every type carrying a section identity in the selected module.
    ///
    /// An empty or missing hint selects the current module. Otherwise the
    /// first referenced module whose name contains the hint is scanned.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Discovery`] when a non-empty hint matches no
    /// referenced module.
    pub fn discover(&self, hint: Option<&str>) -> MappingResult<Arc<[RegisteredType]>> {
        if let Some(types) = self.discovered.get() {
            return Ok(Arc::clone(types));
        }

        let candidates = match hint.filter(|hint| !hint.is_empty()) {
            None => self.catalog.current(),
            Some(hint) => {
                let (name, types) = self
                    .catalog
                    .find_module(hint)
                    .ok_or_else(|| MappingError::discovery(hint))?;
                debug!(module = %name, hint = %hint, "resolved module hint");
                types
            }
        };

        let sections: Arc<[RegisteredType]> = candidates
            .iter()
            .filter(|candidate| candidate.has_section())
            .copied()
            .collect();

        let winner = self.discovered.get_or_init(|| {
            info!(sections = sections.len(), "discovered section types");
            sections
        });
        Ok(Arc::clone(winner))
    }

    /// Looks up a type in the memoized discovery result.
    ///
    /// Returns `None` if discovery has not run yet or the type was not found.
    pub fn lookup(&self, id: TypeId) -> Option<RegisteredType> {
        self.discovered
            .get()?
            .iter()
            .find(|registered| registered.type_ref().id() == id)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmap_test::fixtures::{
        CosmosConfiguration, InAssemblyObject, SinglePropConfiguration, UnsectionedObject,
    };
    use pretty_assertions::assert_eq;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog
            .register::<InAssemblyObject>()
            .register::<UnsectionedObject>();
        catalog
            .module("AppConfigModelLib")
            .register::<CosmosConfiguration>()
            .register::<SinglePropConfiguration>();
        catalog
    }

    fn names(types: &[RegisteredType]) -> Vec<&'static str> {
        types.iter().map(|t| t.type_ref().short_name()).collect()
    }

    #[test]
    fn test_current_module_skips_unsectioned_types() {
        let scanner = TypeScanner::new(catalog());
        let types = scanner.discover(None).unwrap();
        assert_eq!(names(&types), vec!["InAssemblyObject"]);
    }

    #[test]
    fn test_empty_hint_selects_current_module() {
        let scanner = TypeScanner::new(catalog());
        let types = scanner.discover(Some("")).unwrap();
        assert_eq!(names(&types), vec!["InAssemblyObject"]);
    }

    #[test]
    fn test_hint_selects_referenced_module() {
        let scanner = TypeScanner::new(catalog());
        let types = scanner.discover(Some("ModelLib")).unwrap();
        assert_eq!(
            names(&types),
            vec!["CosmosConfiguration", "SinglePropConfiguration"]
        );
    }

    #[test]
    fn test_first_discovery_wins() {
        let scanner = TypeScanner::new(catalog());
        scanner.discover(Some("ModelLib")).unwrap();

        let again = scanner.discover(None).unwrap();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_unresolvable_hint_is_not_memoized() {
        let scanner = TypeScanner::new(catalog());
        let err = scanner.discover(Some("Missing")).unwrap_err();
        assert!(matches!(err, MappingError::Discovery { .. }));

        assert_eq!(scanner.discover(None).unwrap().len(), 1);
    }

    #[test]
    fn test_lookup() {
        let scanner = TypeScanner::new(catalog());
        assert!(scanner.lookup(TypeId::of::<InAssemblyObject>()).is_none());

        scanner.discover(None).unwrap();
        assert!(scanner.lookup(TypeId::of::<InAssemblyObject>()).is_some());
        assert!(scanner.lookup(TypeId::of::<CosmosConfiguration>()).is_none());
    }
}
