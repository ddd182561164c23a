//! Core error types for formforge.
//!
//! [`FormforgeError`] covers the three failure families of the application:
//! field validation, reading a stored form, and writing one. Builder misuse and
//! configuration problems have their own variants. Nothing here is fatal; every
//! variant degrades to a user-visible message.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A single field-scoped validation failure.
///
/// Carries the user-facing message, a short machine-readable code and
/// optional parameters (e.g. the bound that was violated).
///
/// # Examples
///
/// ```
/// use formforge_core::error::ValidationError;
///
/// let err = ValidationError::new("Minimum length is 3 characters", "min_length")
///     .with_param("min", "3");
/// assert_eq!(err.code, "min_length");
/// assert_eq!(err.params.get("min").map(String::as_str), Some("3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The user-facing error message.
    pub message: String,
    /// A short code identifying the failed check (e.g. "required", "invalid").
    pub code: String,
    /// Additional parameters providing context for the message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for formforge.
///
/// Each variant maps to an HTTP status code via [`FormforgeError::status_code`]
/// so the views layer can render it without a second lookup table.
#[derive(Error, Debug)]
pub enum FormforgeError {
    // ── Validation ───────────────────────────────────────────────────

    /// A field value or field configuration failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Store reads ──────────────────────────────────────────────────

    /// No form is stored under the given key.
    #[error("Form not found: {0}")]
    NotFound(String),

    /// The stored record exists but could not be decoded.
    #[error("Malformed form record '{key}': {reason}")]
    MalformedRecord {
        /// The storage key of the broken record.
        key: String,
        /// The decoder's description of the problem.
        reason: String,
    },

    // ── Store writes ─────────────────────────────────────────────────

    /// The backing store rejected a write (quota, serialization, I/O).
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// Any other backing-store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Builder ──────────────────────────────────────────────────────

    /// No field with the given id exists in the form.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// A reorder index was outside the field list.
    #[error("Index {index} out of range for {len} fields")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The number of fields in the form.
        len: usize,
    },

    /// A form was saved with a blank name.
    #[error("Please enter a form name")]
    EmptyFormName,

    // ── Plumbing ─────────────────────────────────────────────────────

    /// Malformed input from a caller (unknown field kind, bad argument).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormforgeError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `NotFound`, `FieldNotFound` -> 404
    /// - `MalformedRecord` -> 422
    /// - `ValidationError`, `BadRequest`, `EmptyFormName`, `IndexOutOfRange` -> 400
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::FieldNotFound(_) => 404,
            Self::MalformedRecord { .. } => 422,
            Self::ValidationError(_)
            | Self::BadRequest(_)
            | Self::EmptyFormName
            | Self::IndexOutOfRange { .. } => 400,
            Self::StorageWrite(_)
            | Self::Storage(_)
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns the short headline shown to a user for this error.
    ///
    /// The two store-read failures get the wording of the shared form page;
    /// everything else falls back to the error's `Display` output.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Form not found".to_string(),
            Self::MalformedRecord { .. } => "Error loading form data".to_string(),
            Self::StorageWrite(_) => "Failed to save form".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns `true` for the store-read failures (missing key or undecodable record).
    pub const fn is_read_failure(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MalformedRecord { .. })
    }
}

impl From<ValidationError> for FormforgeError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl From<serde_json::Error> for FormforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormforgeError>`.
pub type FormforgeResult<T> = Result<T, FormforgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("This field is required", "required");
        assert_eq!(err.to_string(), "This field is required");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "min_length").with_param("min", "8");
        assert_eq!(err.params.get("min").unwrap(), "8");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FormforgeError::NotFound("form_x".into()).status_code(), 404);
        assert_eq!(FormforgeError::FieldNotFound("f".into()).status_code(), 404);
        assert_eq!(
            FormforgeError::MalformedRecord {
                key: "form_x".into(),
                reason: "eof".into()
            }
            .status_code(),
            422
        );
        assert_eq!(FormforgeError::EmptyFormName.status_code(), 400);
        assert_eq!(
            FormforgeError::IndexOutOfRange { index: 4, len: 2 }.status_code(),
            400
        );
        assert_eq!(
            FormforgeError::ValidationError(ValidationError::new("x", "y")).status_code(),
            400
        );
        assert_eq!(FormforgeError::StorageWrite("quota".into()).status_code(), 500);
        assert_eq!(FormforgeError::Storage("poisoned".into()).status_code(), 500);
    }

    #[test]
    fn test_user_messages_for_read_failures() {
        assert_eq!(
            FormforgeError::NotFound("form_1".into()).user_message(),
            "Form not found"
        );
        let malformed = FormforgeError::MalformedRecord {
            key: "form_1".into(),
            reason: "expected value".into(),
        };
        assert_eq!(malformed.user_message(), "Error loading form data");
        assert!(malformed.is_read_failure());
        assert!(!FormforgeError::EmptyFormName.is_read_failure());
    }

    #[test]
    fn test_empty_name_display() {
        assert_eq!(
            FormforgeError::EmptyFormName.to_string(),
            "Please enter a form name"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormforgeError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: FormforgeError = json_err.into();
        assert!(matches!(err, FormforgeError::SerializationError(_)));
    }
}
