//! # Confmap
//!
//! Maps strongly-typed application sections onto entries in a key/value
//! configuration store, resolving secret references along the way.
//!
//! - **Declarative mapping**: `#[derive(ConfigSection)]` with `#[section]` and
//!   `#[setting]` markers, checked at compile time
//! - **Labels**: the same keys carry independent values per label
//! - **Secret references**: vault-backed values resolved on load, one
//!   connection per vault host
//! - **Notification plans**: the keys a caller should watch, per section
//!
//! Generated code refers to `confmap_core`, so depend on `confmap-core`
//! alongside this crate when deriving.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use confmap::prelude::*;
//!
//! #[derive(Debug, Default, ConfigSection)]
//! #[section(name = "Cosmos")]
//! struct CosmosConfiguration {
//!     #[setting(key = "Cosmos:Enabled")]
//!     enabled: bool,
//!
//!     #[setting(key = "Cosmos:ConnectionString", content_type = "secret_ref", notify = false)]
//!     connection_string: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("confmap.toml")?
//!         .with_env_prefix("CONFMAP")
//!         .load()?;
//!     init_logging(&config.log_config())?;
//!
//!     let mut catalog = TypeCatalog::new();
//!     catalog.register::<CosmosConfiguration>();
//!
//!     let service = SectionService::builder(store)
//!         .secrets(secret_store)
//!         .catalog(catalog)
//!         .options(config.engine_options())
//!         .build();
//!
//!     let cosmos = service
//!         .load_section::<CosmosConfiguration>(config.active_label())
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/confmap/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use confmap_core as core;

// Re-export the mapping engine
pub use confmap_engine as engine;

// Re-export configuration loading
pub use confmap_config as config;

// Re-export logging and metrics
pub use confmap_telemetry as telemetry;

// Re-export the derive macro
pub use confmap_macros::ConfigSection;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use confmap::prelude::*;
/// ```
pub mod prelude {
    pub use confmap_core::{
        ConfigSection, ConfigStore, ContentType, Credential, EntryIdentity, Label, MappingError,
        MappingResult, NotificationPlan, SecretStore, StoreError, WireEntry,
    };

    // Derive macro; shares its name with the trait above
    pub use confmap_macros::ConfigSection;

    pub use confmap_engine::{EngineOptions, SectionService, TypeCatalog};

    pub use confmap_config::{ConfigError, ConfigLoader, EngineConfig};

    pub use confmap_telemetry::{init_logging, LogConfig, LogFormat};
}
