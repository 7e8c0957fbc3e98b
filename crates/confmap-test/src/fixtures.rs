//! Fixture section types.
//!
//! These mirror the shapes a real model library uses: a field-mode section
//! with a secret and a nested JSON object, a whole-object section, and a
//! plain two-string section. A few deliberately broken shapes cover the
//! resolver's error paths.
//!
//! # Example
//!
//! ```
//! use confmap_core::ConfigSection;
//! use confmap_test::fixtures::CosmosConfiguration;
//!
//! let descriptor = CosmosConfiguration::descriptor();
//! assert_eq!(descriptor.section_name(), Some("Cosmos"));
//! assert_eq!(descriptor.fields().len(), 3);
//! ```

use confmap_macros::ConfigSection;
use serde::{Deserialize, Serialize};

/// Vault host used by the fixture secret references.
pub const FIXTURE_VAULT: &str = "myvault.vault.azure.net";

/// Secret-reference payload pointing at `dbpass` version `abc123`.
pub const FIXTURE_SECRET_PAYLOAD: &str =
    r#"{"uri":"https://myvault.vault.azure.net/secrets/dbpass/abc123"}"#;

/// Nested object stored as JSON under `Cosmos:Database`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CosmosDatabaseProperty {
    /// Database name.
    pub database: String,
    /// Collection names.
    pub collections: Vec<String>,
}

/// Field-mode section with a string, a secret and a JSON field.
#[derive(Debug, Clone, Default, PartialEq, Eq, ConfigSection)]
#[section(name = "Cosmos")]
pub struct CosmosConfiguration {
    /// Whether Cosmos is enabled.
    #[setting(key = "Cosmos:Enabled", notify = true)]
    pub enabled: bool,

    /// Connection string held in the secret store. Never written back.
    #[setting(key = "Cosmos:ConnectionString", content_type = "secret_ref", notify = false)]
    pub connection_string: String,

    /// Database settings.
    #[setting(key = "Cosmos:Database", content_type = "json", notify = true)]
    pub database: CosmosDatabaseProperty,
}

/// Whole-object section stored as one JSON value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ConfigSection)]
#[serde(rename_all = "PascalCase")]
#[section(name = "SingleProp:Data")]
#[setting(key = "SingleProp:Data", content_type = "json", notify = true)]
pub struct SinglePropConfiguration {
    /// Display name.
    pub name: String,
    /// Deployment region.
    pub region: String,
}

/// Two plain string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, ConfigSection)]
#[section(name = "InAssembly")]
pub struct InAssemblyObject {
    /// First property.
    #[setting(key = "InAssembly:Property1")]
    pub property1: String,

    /// Second property.
    #[setting(key = "InAssembly:Property2")]
    pub property2: String,
}

/// Numeric and boolean fields stored as plain strings.
#[derive(Debug, Clone, Default, PartialEq, ConfigSection)]
#[section(name = "Limits")]
pub struct LimitsConfiguration {
    /// Maximum retry count.
    #[setting(key = "Limits:MaxRetries")]
    pub max_retries: u32,

    /// Sampling ratio.
    #[setting(key = "Limits:SampleRatio")]
    pub sample_ratio: f64,

    /// Whether tracing is verbose. Not watched.
    #[setting(key = "Limits:Verbose", notify = false)]
    pub verbose: bool,
}

/// Whole-object marker declaring a non-JSON content type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ConfigSection)]
#[section(name = "Broken:Whole")]
#[setting(key = "Broken:Whole", content_type = "string")]
pub struct MismatchedWholeObject {
    /// Unused payload.
    pub value: String,
}

/// Field markers without a section identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, ConfigSection)]
pub struct UnsectionedObject {
    /// Orphan field.
    #[setting(key = "Orphan:Value")]
    pub value: String,
}

/// A section with no markers at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, ConfigSection)]
#[section(name = "Empty")]
pub struct EmptySection {
    /// Not mapped.
    pub ignored: String,
}
