//! Error types for confmap.
//!
//! Structural mapping defects (an unresolvable module, a type without a
//! section, a whole-object marker that is not JSON) surface as
//! [`MappingError`] immediately. Store and secret-store failures are carried
//! through untouched; nothing in this crate family retries.

use thiserror::Error;

use crate::content_type::ContentType;

/// Result type alias using [`MappingError`].
pub type MappingResult<T> = Result<T, MappingError>;

/// Errors raised by the mapping engine.
#[derive(Error, Debug)]
pub enum MappingError {
    /// A non-empty module hint did not match any registered module.
    #[error("unable to load any types from module matching '{hint}'")]
    Discovery {
        /// The module hint that could not be resolved.
        hint: String,
    },

    /// The type carries no section identity.
    #[error("{type_name} is not a valid configuration section")]
    NotFound {
        /// Name of the offending type.
        type_name: String,
    },

    /// A whole-object marker declared a content type other than JSON.
    #[error("whole-object mapping on {type_name} requires application/json, found {content_type}")]
    ContentTypeMismatch {
        /// Name of the offending type.
        type_name: String,
        /// The declared content type.
        content_type: ContentType,
    },

    /// The secret store failed to return a secret.
    #[error("failed to fetch secret '{secret_name}' from {vault_host}")]
    SecretFetch {
        /// Vault host the secret lives in.
        vault_host: String,
        /// Name of the secret.
        secret_name: String,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },

    /// A secret-reference payload could not be interpreted.
    #[error("invalid secret reference: {reason}")]
    InvalidSecretReference {
        /// Why the payload was rejected.
        reason: String,
    },

    /// A value could not be converted to or from its wire form.
    #[error("failed to convert value for key '{key}': {source}")]
    Codec {
        /// The key being converted.
        key: String,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// Opaque failure from the configuration store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MappingError {
    /// Create a new discovery error.
    pub fn discovery(hint: impl Into<String>) -> Self {
        Self::Discovery { hint: hint.into() }
    }

    /// Create a new not found error.
    pub fn not_found(type_name: impl Into<String>) -> Self {
        Self::NotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a new content type mismatch error.
    pub fn content_type_mismatch(type_name: impl Into<String>, content_type: ContentType) -> Self {
        Self::ContentTypeMismatch {
            type_name: type_name.into(),
            content_type,
        }
    }

    /// Create a new invalid secret reference error.
    pub fn invalid_secret_reference(reason: impl Into<String>) -> Self {
        Self::InvalidSecretReference {
            reason: reason.into(),
        }
    }

    /// Create a new codec error for a key.
    pub fn codec(key: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            key: key.into(),
            source,
        }
    }
}

/// Errors reported by the configuration store or secret store collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A create call found an existing entry.
    #[error("entry already exists: {key} (label {label})")]
    AlreadyExists {
        /// Key of the existing entry.
        key: String,
        /// Label of the existing entry.
        label: String,
    },

    /// The store refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The store could not be reached or failed transiently.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other collaborator failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Create a new already-exists error.
    pub fn already_exists(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::AlreadyExists {
            key: key.into(),
            label: label.into(),
        }
    }

    /// Create a new rejected error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a new unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether this error reports an existing entry on create.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Errors raised while converting between wire text and typed values.
#[derive(Error, Debug)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Plain text could not be coerced into the target type.
    #[error("cannot coerce '{raw}' into {target}")]
    Coerce {
        /// The raw text.
        raw: String,
        /// The target type name.
        target: &'static str,
    },

    /// The content type has no codec in this direction.
    #[error("content type {0} is not supported here")]
    Unsupported(ContentType),

    /// The section type provides no codec for this value.
    #[error("no codec for {target}")]
    NoCodec {
        /// The field name, or the type name for whole-object values.
        target: String,
    },
}

impl CodecError {
    /// Create a new missing codec error.
    pub fn no_codec(target: impl Into<String>) -> Self {
        Self::NoCodec {
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_codec_error() {
        let err = MappingError::codec("Hand:Data", CodecError::no_codec("HandWritten"));
        assert_eq!(
            err.to_string(),
            "failed to convert value for key 'Hand:Data': no codec for HandWritten"
        );
    }

    #[test]
    fn test_discovery_error() {
        let err = MappingError::discovery("ModelLib");
        assert!(err.to_string().contains("ModelLib"));
    }

    #[test]
    fn test_not_found_error() {
        let err = MappingError::not_found("Orphan");
        assert_eq!(err.to_string(), "Orphan is not a valid configuration section");
    }

    #[test]
    fn test_content_type_mismatch_error() {
        let err = MappingError::content_type_mismatch("Single", ContentType::String);
        assert!(err.to_string().contains("Single"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_store_error_passthrough() {
        let err: MappingError = StoreError::unavailable("throttled").into();
        assert_eq!(err.to_string(), "store unavailable: throttled");
    }

    #[test]
    fn test_already_exists_detection() {
        assert!(StoreError::already_exists("A:B", "\0").is_already_exists());
        assert!(!StoreError::rejected("forbidden").is_already_exists());
    }

    #[test]
    fn test_secret_fetch_keeps_source() {
        let err = MappingError::SecretFetch {
            vault_host: "myvault.vault.azure.net".to_string(),
            secret_name: "dbpass".to_string(),
            source: StoreError::unavailable("timeout"),
        };
        assert!(err.to_string().contains("dbpass"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
