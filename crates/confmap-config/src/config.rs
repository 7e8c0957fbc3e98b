//! Engine configuration types.

use confmap_engine::EngineOptions;
use confmap_telemetry::{LogConfig, LogFormat};
use http::Uri;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete engine configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use confmap_config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.logging.level, "info");
/// assert!(config.store.endpoint.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Configuration store settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where section values live and which section types to map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct StoreSettings {
    /// Configuration store endpoint, e.g. `https://myconfig.azconfig.io`.
    pub endpoint: Option<String>,

    /// Label applied when the caller passes none.
    pub active_label: Option<String>,

    /// Module to discover section types in. Unset selects the current module.
    pub model_module: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingSettings {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl EngineConfig {
    /// Development preset: debug level, pretty output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            store: StoreSettings::default(),
            logging: LoggingSettings {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `store.endpoint` is set but is not an absolute http(s) URI
    /// - `logging.level` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.store.endpoint {
            validate_endpoint(endpoint)?;
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Engine options derived from the store settings.
    pub fn engine_options(&self) -> EngineOptions {
        match self.store.model_module.as_deref() {
            Some(module) if !module.is_empty() => EngineOptions::new().module_hint(module),
            _ => EngineOptions::new(),
        }
    }

    /// Logging configuration derived from the logging settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            format: self.logging.format,
            ..LogConfig::default()
        }
    }

    /// The label to use when the caller supplies none.
    pub fn active_label(&self) -> Option<&str> {
        self.store.active_label.as_deref().filter(|l| !l.is_empty())
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let uri: Uri = endpoint.parse().map_err(|e: http::uri::InvalidUri| {
        ConfigError::invalid_value("store.endpoint", format!("invalid URI {endpoint}: {e}"))
    })?;

    match uri.scheme_str() {
        Some("http" | "https") if uri.host().is_some() => Ok(()),
        _ => Err(ConfigError::invalid_value(
            "store.endpoint",
            format!("expected an absolute http(s) URI, got {endpoint}"),
        )),
    }
}
