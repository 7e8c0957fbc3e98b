//! Layered configuration for the confmap engine.
//!
//! Settings are read from defaults, then an optional TOML or JSON file, then
//! environment variables (optionally seeded from `.env`). Unknown fields are
//! rejected.
//!
//! # Example
//!
//! ```no_run
//! use confmap_config::ConfigLoader;
//!
//! # fn main() -> Result<(), confmap_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("confmap.toml")?
//!     .with_env_prefix("CONFMAP")
//!     .load()?;
//!
//! let options = config.engine_options();
//! let logging = config.log_config();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [store]
//! endpoint = "https://myconfig.azconfig.io"
//! active_label = "Development"
//! model_module = "ModelLib"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::{EngineConfig, LoggingSettings, StoreSettings};
pub use error::ConfigError;
pub use loader::ConfigLoader;
