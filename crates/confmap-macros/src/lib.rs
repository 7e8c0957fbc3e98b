//! Procedural macros for confmap sections.
//!
//! `#[derive(ConfigSection)]` turns attribute markers on a struct into a
//! static descriptor table plus typed field codecs, so the engine never needs
//! runtime type introspection.
//!
//! # Example
//!
//! ```rust,ignore
//! use confmap::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, ConfigSection)]
//! #[section(name = "Cosmos")]
//! struct CosmosConfiguration {
//!     #[setting(key = "Cosmos:Enabled")]
//!     enabled: bool,
//!
//!     #[setting(key = "Cosmos:ConnectionString", content_type = "secret_ref", notify = false)]
//!     connection_string: String,
//!
//!     #[setting(key = "Cosmos:Database", content_type = "json")]
//!     database: CosmosDatabaseProperty,
//! }
//!
//! // A single JSON-valued key for the whole struct.
//! #[derive(Debug, Default, Serialize, Deserialize, ConfigSection)]
//! #[section(name = "SingleProp:Data")]
//! #[setting(key = "SingleProp:Data", content_type = "json")]
//! struct SinglePropConfiguration {
//!     name: String,
//!     region: String,
//! }
//! ```
//!
//! # Attributes
//!
//! - `#[section(name = "...")]` on the struct: the section identity.
//! - `#[setting(key = "...", content_type = "...", notify = ...)]` on a field
//!   maps that field; on the struct it requests whole-object mapping.
//!   `content_type` is one of `string` (default), `json` or `secret_ref`;
//!   `notify` defaults to `true`.

mod parse;
mod section;

use proc_macro::TokenStream;

/// Derives `confmap_core::ConfigSection`.
///
/// Every field type mapped with `#[setting]` must implement
/// `serde::Serialize` and `serde::de::DeserializeOwned`. Whole-object
/// sections need the same bounds on the struct itself.
#[proc_macro_derive(ConfigSection, attributes(section, setting))]
pub fn derive_config_section(input: TokenStream) -> TokenStream {
    section::expand_section(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
