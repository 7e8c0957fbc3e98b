//! # Confmap Test
//!
//! Test utilities for confmap: in-memory collaborators and fixture sections,
//! so engine behavior can be exercised without a remote store.
//!
//! ## Key Features
//!
//! - **[`MemoryConfigStore`]**: ordered key/label map with read-only entries
//!   and injectable failures
//! - **[`MemorySecretStore`]**: per-vault secrets with connection counting
//! - **[`fixtures`]**: ready-made `ConfigSection` types
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use confmap_core::{ConfigStore, SecretStore};
//! use confmap_engine::{SectionService, TypeCatalog};
//! use confmap_test::{fixtures::InAssemblyObject, MemoryConfigStore, MemorySecretStore};
//!
//! #[tokio::test]
//! async fn test_round_trip() {
//!     let store = Arc::new(MemoryConfigStore::new());
//!     let service = SectionService::builder(Arc::clone(&store) as Arc<dyn ConfigStore>)
//!         .secrets(Arc::new(MemorySecretStore::new()) as Arc<dyn SecretStore>)
//!         .catalog(TypeCatalog::new().with::<InAssemblyObject>())
//!         .build();
//!
//!     let value = InAssemblyObject { property1: "Test1".into(), property2: "Test2".into() };
//!     service.save_section(&value, Some("First")).await.unwrap();
//!     let loaded = service.load_section::<InAssemblyObject>(Some("First")).await.unwrap();
//!     assert_eq!(loaded, Some(value));
//!     assert_eq!(store.len(), 2);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/confmap-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod secrets;
mod store;

pub use secrets::MemorySecretStore;
pub use store::MemoryConfigStore;
