//! # Confmap Core
//!
//! Core types and traits for mapping typed application objects onto entries
//! in a remote key/value configuration store.
//!
//! This crate provides the foundational pieces used throughout confmap:
//!
//! - [`ConfigSection`] / [`SectionDescriptor`] - Static markers describing a mappable type
//! - [`ResolvedMapping`] - A type's section, whole-object and per-field identities
//! - [`codec`] - Content-type aware conversion between stored text and typed values
//! - [`ConfigStore`] / [`SecretStore`] - Collaborator capabilities the engine consumes
//! - [`MappingError`] - The engine's error taxonomy

#![doc(html_root_url = "https://docs.rs/confmap-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
mod content_type;
mod descriptor;
mod error;
mod label;
mod model;
mod store;

pub use content_type::{ContentType, CONTENT_JSON, CONTENT_SECRET_REF, CONTENT_STRING};
pub use descriptor::{ConfigSection, FieldMarker, SectionDescriptor, TypeRef, WILDCARD_KEY};
pub use error::{CodecError, MappingError, MappingResult, StoreError};
pub use label::{Label, NO_LABEL};
pub use model::{
    EntryIdentity, FieldIdentity, NotificationPlan, ResolvedMapping, SecretReference,
    SectionIdentity, WireEntry,
};
pub use store::{ConfigStore, Credential, SecretConnection, SecretStore};
