//! Resolved mappings and wire-level values.

use indexmap::IndexMap;
use serde::Serialize;

use crate::content_type::ContentType;
use crate::descriptor::TypeRef;
use crate::error::{MappingError, MappingResult};
use crate::label::Label;

/// The section a mappable type belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionIdentity {
    /// Key prefix shared by every entry of the section.
    pub section_name: String,
    /// The type that owns the section.
    pub owner: TypeRef,
}

/// One resolved key mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIdentity {
    /// Full store key.
    pub key: String,
    /// How the stored value is interpreted.
    pub content_type: ContentType,
    /// Whether the key belongs in the notification plan.
    pub notify: bool,
    /// The field this identity maps to; `None` for a whole-object identity.
    pub owner_field: Option<String>,
}

/// The full mapping of one type onto store keys.
///
/// At most one of `whole_object` and `fields` is populated. Both empty means
/// the type has a section but nothing to load or save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    /// The section identity.
    pub section: SectionIdentity,
    /// Identity for whole-object mapping. Always JSON.
    pub whole_object: Option<FieldIdentity>,
    /// Per-field identities keyed by field name, in declaration order.
    pub fields: IndexMap<String, FieldIdentity>,
}

impl ResolvedMapping {
    /// Whether the type maps onto a single JSON key.
    pub fn is_whole_object(&self) -> bool {
        self.whole_object.is_some()
    }

    /// Whether there is nothing to load or save.
    pub fn is_empty(&self) -> bool {
        self.whole_object.is_none() && self.fields.is_empty()
    }

    /// Finds the field mapped to `key`.
    pub fn field_for_key(&self, key: &str) -> Option<(&str, &FieldIdentity)> {
        self.fields
            .iter()
            .find(|(_, identity)| identity.key == key)
            .map(|(name, identity)| (name.as_str(), identity))
    }

    /// Keys that should be watched for changes.
    pub fn notification_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for identity in self.fields.values().filter(|identity| identity.notify) {
            if !keys.contains(&identity.key) {
                keys.push(identity.key.clone());
            }
        }
        if let Some(whole) = &self.whole_object {
            keys.push(whole.key.clone());
        }
        keys
    }
}

/// A wire-level identity emitted for writes and deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIdentity {
    /// Store key.
    pub key: String,
    /// Normalized label.
    pub label: Label,
    /// Content type written with the entry.
    pub content_type: ContentType,
    /// The field the value comes from; `None` for the whole object.
    pub owner_field: Option<String>,
}

/// The unit exchanged with the configuration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEntry {
    /// Store key.
    pub key: String,
    /// Normalized label; never empty.
    pub label: Label,
    /// Raw content type string as stored.
    pub content_type: String,
    /// Stored value.
    pub content: String,
}

impl WireEntry {
    /// Creates an entry.
    pub fn new(
        key: impl Into<String>,
        label: Label,
        content_type: ContentType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label,
            content_type: content_type.as_wire().to_string(),
            content: content.into(),
        }
    }

    /// The classified content type.
    pub fn kind(&self) -> ContentType {
        ContentType::from_wire(&self.content_type)
    }
}

/// Location of a secret, parsed from a secret-reference URI such as
/// `https://myvault.vault.azure.net/secrets/dbpass/abc123`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    /// URI scheme, usually `https`.
    pub scheme: String,
    /// Vault authority.
    pub vault_host: String,
    /// Secret name (second path segment).
    pub secret_name: String,
    /// Secret version (third path segment), if pinned.
    pub secret_version: Option<String>,
}

impl SecretReference {
    /// Parses an absolute secret URI.
    pub fn parse(uri: &str) -> MappingResult<Self> {
        let parsed: http::Uri = uri
            .parse()
            .map_err(|e| MappingError::invalid_secret_reference(format!("{uri}: {e}")))?;

        let vault_host = parsed
            .authority()
            .map(|authority| authority.as_str().to_string())
            .ok_or_else(|| {
                MappingError::invalid_secret_reference(format!("{uri}: missing vault host"))
            })?;
        let scheme = parsed.scheme_str().unwrap_or("https").to_string();

        let segments: Vec<&str> = parsed
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let secret_name = segments
            .get(1)
            .map(|segment| (*segment).to_string())
            .ok_or_else(|| {
                MappingError::invalid_secret_reference(format!("{uri}: missing secret name"))
            })?;
        let secret_version = segments.get(2).map(|segment| (*segment).to_string());

        Ok(Self {
            scheme,
            vault_host,
            secret_name,
            secret_version,
        })
    }

    /// Base URL of the vault (`scheme://host`).
    pub fn vault_url(&self) -> String {
        format!("{}://{}", self.scheme, self.vault_host)
    }
}

/// Keys a hosting layer should watch, grouped by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationPlan {
    sections: IndexMap<String, Vec<String>>,
}

impl NotificationPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the watched keys for a section, replacing any earlier entry.
    pub fn insert(&mut self, section: impl Into<String>, keys: Vec<String>) {
        self.sections.insert(section.into(), keys);
    }

    /// Watched keys for a section.
    pub fn keys(&self, section: &str) -> Option<&[String]> {
        self.sections.get(section).map(Vec::as_slice)
    }

    /// Section names in discovery order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Iterates `(section, keys)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sections
            .iter()
            .map(|(section, keys)| (section.as_str(), keys.as_slice()))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_versioned_secret_uri() {
        let reference =
            SecretReference::parse("https://myvault.vault.azure.net/secrets/dbpass/abc123")
                .unwrap();
        assert_eq!(reference.vault_host, "myvault.vault.azure.net");
        assert_eq!(reference.secret_name, "dbpass");
        assert_eq!(reference.secret_version.as_deref(), Some("abc123"));
        assert_eq!(reference.vault_url(), "https://myvault.vault.azure.net");
    }

    #[test]
    fn test_parse_unversioned_secret_uri() {
        let reference =
            SecretReference::parse("https://myvault.vault.azure.net/secrets/dbpass/").unwrap();
        assert_eq!(reference.secret_name, "dbpass");
        assert_eq!(reference.secret_version, None);
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        let err = SecretReference::parse("https://myvault.vault.azure.net/secrets").unwrap_err();
        assert!(matches!(err, MappingError::InvalidSecretReference { .. }));
    }

    #[test]
    fn test_parse_rejects_relative_uri() {
        assert!(SecretReference::parse("/secrets/dbpass").is_err());
    }

    #[test]
    fn test_wire_entry_kind() {
        let entry = WireEntry::new("A:B", Label::none(), ContentType::Json, "{}");
        assert_eq!(entry.content_type, "application/json");
        assert_eq!(entry.kind(), ContentType::Json);
    }

    #[test]
    fn test_notification_plan_serializes_as_map() {
        let mut plan = NotificationPlan::new();
        plan.insert("Cosmos", vec!["Cosmos:Enabled".to_string()]);
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(json, r#"{"Cosmos":["Cosmos:Enabled"]}"#);
    }
}
