//! Declarative section descriptors.
//!
//! A [`SectionDescriptor`] is the static stand-in for the markers a mappable
//! type carries: the section identity, an optional whole-object marker, and
//! the per-field markers. It is normally produced by `#[derive(ConfigSection)]`
//! but can be written by hand.
//!
//! # Example
//!
//! ```
//! use confmap_core::{ContentType, FieldMarker, SectionDescriptor};
//!
//! let descriptor = SectionDescriptor::new("CosmosConfiguration")
//!     .section("Cosmos")
//!     .field("enabled", FieldMarker::new("Cosmos:Enabled"))
//!     .field(
//!         "database",
//!         FieldMarker::new("Cosmos:Database").content_type(ContentType::Json),
//!     );
//!
//! assert_eq!(descriptor.section_name(), Some("Cosmos"));
//! assert_eq!(descriptor.fields().len(), 2);
//! ```

use std::any::TypeId;
use std::fmt;

use crate::content_type::ContentType;
use crate::error::CodecError;

/// Identifies a mappable Rust type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    /// The type reference for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The last path segment of the type name.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Key used when a marker is declared with an empty key.
pub const WILDCARD_KEY: &str = "*";

/// A key/content-type/notify marker, attached either to a field or to a
/// whole type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMarker {
    /// Full store key, conventionally `section:property`.
    pub key: String,
    /// How the stored value is interpreted.
    pub content_type: ContentType,
    /// Whether a hosting layer should watch this key for changes.
    pub notify: bool,
}

impl FieldMarker {
    /// Creates a string marker that notifies on change.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            key: if key.is_empty() {
                WILDCARD_KEY.to_string()
            } else {
                key
            },
            content_type: ContentType::String,
            notify: true,
        }
    }

    /// Sets the content type.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Sets the notify flag.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

/// Everything the engine knows about a mappable type before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    type_name: String,
    section: Option<String>,
    whole_object: Option<FieldMarker>,
    fields: Vec<(String, FieldMarker)>,
}

impl SectionDescriptor {
    /// Starts a descriptor for the named type with no markers.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            section: None,
            whole_object: None,
            fields: Vec::new(),
        }
    }

    /// Attaches the section identity marker.
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.section = Some(name.into());
        self
    }

    /// Attaches a whole-object marker to the type itself.
    pub fn whole_object(mut self, marker: FieldMarker) -> Self {
        self.whole_object = Some(marker);
        self
    }

    /// Attaches a marker to a field. Later markers for the same field replace
    /// earlier ones.
    pub fn field(mut self, name: impl Into<String>, marker: FieldMarker) -> Self {
        let name = name.into();
        if let Some(existing) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = marker;
        } else {
            self.fields.push((name, marker));
        }
        self
    }

    /// Name of the described type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The section name, if the type carries a section identity.
    pub fn section_name(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// The whole-object marker, if any.
    pub fn whole_object_marker(&self) -> Option<&FieldMarker> {
        self.whole_object.as_ref()
    }

    /// Field markers in declaration order.
    pub fn fields(&self) -> &[(String, FieldMarker)] {
        &self.fields
    }
}

/// A type that can be mapped onto configuration store entries.
///
/// Implementations are normally generated by `#[derive(ConfigSection)]`,
/// which routes every field through [`codec`](crate::codec) according to the
/// content type its marker declares.
pub trait ConfigSection: Default + Send + Sync + 'static {
    /// The markers this type carries.
    fn descriptor() -> SectionDescriptor;

    /// Encodes the current value of `field`.
    ///
    /// Returns `Ok(None)` if the type has no such field.
    fn encode_field(
        &self,
        field: &str,
        content_type: ContentType,
    ) -> Result<Option<String>, CodecError>;

    /// Decodes `raw` into `field`.
    ///
    /// Returns `Ok(true)` if the field was assigned, `Ok(false)` if the value
    /// was empty or the type has no such field.
    fn decode_field(
        &mut self,
        field: &str,
        raw: &str,
        content_type: ContentType,
    ) -> Result<bool, CodecError>;

    /// Encodes the whole value for whole-object mapping.
    ///
    /// The default returns `Ok(None)`, which the engine reports as a missing
    /// codec rather than writing an empty value.
    fn encode_object(&self) -> Result<Option<String>, CodecError> {
        Ok(None)
    }

    /// Decodes a whole value for whole-object mapping.
    ///
    /// `Ok(None)` for non-empty input is reported as a missing codec.
    fn decode_object(raw: &str) -> Result<Option<Self>, CodecError> {
        let _ = raw;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_defaults() {
        let marker = FieldMarker::new("Cosmos:Enabled");
        assert_eq!(marker.content_type, ContentType::String);
        assert!(marker.notify);
    }

    #[test]
    fn test_empty_key_becomes_wildcard() {
        assert_eq!(FieldMarker::new("").key, WILDCARD_KEY);
    }

    #[test]
    fn test_duplicate_field_marker_replaces() {
        let descriptor = SectionDescriptor::new("T")
            .section("S")
            .field("a", FieldMarker::new("S:A"))
            .field("a", FieldMarker::new("S:A2"));
        assert_eq!(descriptor.fields().len(), 1);
        assert_eq!(descriptor.fields()[0].1.key, "S:A2");
    }

    #[test]
    fn test_type_ref_short_name() {
        struct Local;
        let type_ref = TypeRef::of::<Local>();
        assert_eq!(type_ref.short_name(), "Local");
        assert_eq!(type_ref, TypeRef::of::<Local>());
    }
}
