//! Observability for confmap.
//!
//! This crate provides the two ambient observability concerns of the engine:
//!
//! - **Logging**: structured JSON or pretty logs through `tracing-subscriber`
//! - **Metrics**: counters recorded through the `metrics` facade
//!
//! No metrics exporter is installed here. A host that wants to scrape the
//! counters installs its own recorder; without one, recording is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `confmap_section_loads_total` | Counter | `section`, `outcome` | Section loads |
//! | `confmap_section_saves_total` | Counter | `section` | Section saves |
//! | `confmap_entries_deleted_total` | Counter | `outcome` | Entry deletes |
//! | `confmap_secret_fetches_total` | Counter | `vault`, `outcome` | Secret fetches |
//! | `confmap_secret_connections_total` | Counter | `vault` | Vault connections opened |
//!
//! # Example
//!
//! ```rust,ignore
//! use confmap_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(section = "Cosmos", "loading section");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
