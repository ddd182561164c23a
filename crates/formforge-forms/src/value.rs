//! Candidate values entered for a field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value entered for one field: text for every kind except checkboxes.
///
/// A field with no entry at all is represented as `Option::<FieldValue>::None`
/// by callers; [`FieldValue::is_empty`] treats absent, `""` and `false` alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text, a selected option, or a `YYYY-MM-DD` date.
    Text(String),
    /// A checkbox state.
    Bool(bool),
}

impl FieldValue {
    /// Returns `true` for `""` and `false`.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Bool(b) => !b,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Returns the checkbox state, if this is a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }
}

/// Returns `true` when a possibly absent value counts as empty.
pub fn is_blank(value: Option<&FieldValue>) -> bool {
    value.map_or(true, FieldValue::is_empty)
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
