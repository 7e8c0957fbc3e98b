//! Content-type aware conversion between stored text and typed values.
//!
//! Every typed value passes through `serde`:
//!
//! - **string**: decoding coerces the raw text into the target type (text
//!   passes through, numbers and booleans are parsed); encoding writes strings
//!   bare and other scalars in their compact text form.
//! - **application/json**: structured deserialization, and pretty-printed
//!   serialization on the way out.
//! - **secret references** are resolved by the engine before they reach this
//!   module, so both directions report [`CodecError::Unsupported`].
//!
//! An empty raw value always decodes to `None`.
//!
//! # Example
//!
//! ```
//! use confmap_core::codec;
//! use confmap_core::ContentType;
//!
//! let port: Option<u16> = codec::decode("8080", ContentType::String).unwrap();
//! assert_eq!(port, Some(8080));
//!
//! let text = codec::encode(&true, ContentType::String).unwrap();
//! assert_eq!(text, "true");
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::content_type::ContentType;
use crate::error::CodecError;

/// Decodes a stored value.
pub fn decode<T: DeserializeOwned>(
    raw: &str,
    content_type: ContentType,
) -> Result<Option<T>, CodecError> {
    if raw.is_empty() {
        return Ok(None);
    }

    match content_type {
        ContentType::Json => Ok(Some(serde_json::from_str(raw)?)),
        ContentType::String => coerce(raw).map(Some),
        ContentType::SecretRef => Err(CodecError::Unsupported(content_type)),
    }
}

/// Encodes a typed value for storage.
pub fn encode<T: Serialize + ?Sized>(
    value: &T,
    content_type: ContentType,
) -> Result<String, CodecError> {
    match content_type {
        ContentType::Json => Ok(serde_json::to_string_pretty(value)?),
        ContentType::String => Ok(match serde_json::to_value(value)? {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        }),
        ContentType::SecretRef => Err(CodecError::Unsupported(content_type)),
    }
}

/// Coerces plain text into `T`.
///
/// Tries the text as a string value, then as a JSON scalar, then as a
/// case-insensitive boolean.
pub fn coerce<T: DeserializeOwned>(raw: &str) -> Result<T, CodecError> {
    if let Ok(value) = serde_json::from_value(Value::String(raw.to_string())) {
        return Ok(value);
    }
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }

    let flag = match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    };
    if let Some(flag) = flag {
        if let Ok(value) = serde_json::from_value(Value::Bool(flag)) {
            return Ok(value);
        }
    }

    Err(CodecError::Coerce {
        raw: raw.to_string(),
        target: std::any::type_name::<T>(),
    })
}
