//! # Confmap Engine
//!
//! Maps section types onto a key/value configuration store.
//!
//! The engine is layered leaf-first:
//!
//! | Component | Role |
//! |-----------|------|
//! | [`TypeCatalog`] | Explicit registry of section types per module |
//! | [`TypeScanner`] | Selects the section types of one module, memoized |
//! | [`MappingResolver`] | Builds and caches each type's `ResolvedMapping` |
//! | [`build_identities`] | Flattens a mapping into per-entry identities |
//! | [`SecretResolver`] | Resolves secret-reference payloads, one connection per vault |
//! | [`SectionService`] | Load, save, delete and notification planning |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use confmap_engine::{EngineOptions, SectionService, TypeCatalog};
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.module("AppConfigModelLib").register::<CosmosConfiguration>();
//!
//! let service = SectionService::builder(store)
//!     .secrets(secret_store)
//!     .catalog(catalog)
//!     .options(EngineOptions::new().module_hint("ModelLib"))
//!     .build();
//!
//! let cosmos = service.load_section::<CosmosConfiguration>(Some("Development")).await?;
//! let plan = service.notification_plan()?;
//! ```

#![doc(html_root_url = "https://docs.rs/confmap-engine/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod identity;
mod options;
mod resolver;
mod scanner;
mod secrets;
mod service;

pub use catalog::{ModuleRegistrar, RegisteredType, TypeCatalog};
pub use identity::build_identities;
pub use options::EngineOptions;
pub use resolver::MappingResolver;
pub use scanner::TypeScanner;
pub use secrets::SecretResolver;
pub use service::{SectionService, SectionServiceBuilder};
