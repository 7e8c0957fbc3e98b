//! Content types understood by the mapping engine.

use std::fmt;

/// Wire value for plain string content.
pub const CONTENT_STRING: &str = "string";

/// Wire value for JSON content.
pub const CONTENT_JSON: &str = "application/json";

/// Wire prefix for secret-reference content.
pub const CONTENT_SECRET_REF: &str = "application/vnd.microsoft.appconfig.keyvaultref";

/// How a stored value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Plain text, coerced into scalars on read.
    #[default]
    String,
    /// A JSON document deserialized into a structured value.
    Json,
    /// A pointer to a secret held in a separate secret store.
    SecretRef,
}

impl ContentType {
    /// Classifies a content type string read from the store.
    ///
    /// Matching is case-insensitive and by prefix, so parameters such as
    /// `;charset=utf-8` are accepted. Anything unrecognised is plain string.
    pub fn from_wire(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.starts_with(CONTENT_SECRET_REF) {
            Self::SecretRef
        } else if lowered.starts_with(CONTENT_JSON) {
            Self::Json
        } else {
            Self::String
        }
    }

    /// The value written to the store for this content type.
    pub const fn as_wire(&self) -> &'static str {
        match self {
            Self::String => CONTENT_STRING,
            Self::Json => CONTENT_JSON,
            Self::SecretRef => CONTENT_SECRET_REF,
        }
    }

    /// Whether this is a secret reference.
    pub const fn is_secret(&self) -> bool {
        matches!(self, Self::SecretRef)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
