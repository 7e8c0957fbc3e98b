//! Labels distinguish multiple values stored under the same key.

use std::fmt;

/// Reserved label value meaning "no label".
///
/// Stores filter unlabelled entries with this value, so it is what travels on
/// the wire whenever a caller does not supply a label.
pub const NO_LABEL: &str = "\0";

/// A normalized label. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    /// The "no label" label.
    pub fn none() -> Self {
        Self(NO_LABEL.to_string())
    }

    /// Normalizes an optional label; `None` and `""` become [`NO_LABEL`].
    pub fn from_optional(label: Option<&str>) -> Self {
        match label {
            Some(value) if !value.is_empty() => Self(value.to_string()),
            _ => Self::none(),
        }
    }

    /// The wire value of the label.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the "no label" sentinel.
    pub fn is_none(&self) -> bool {
        self.0 == NO_LABEL
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::from_optional(Some(value))
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::none()
        } else {
            Self(value)
        }
    }
}

impl From<Option<&str>> for Label {
    fn from(value: Option<&str>) -> Self {
        Self::from_optional(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("(no label)")
        } else {
            f.write_str(&self.0)
        }
    }
}
