//! The field validation evaluator.
//!
//! [`FieldValidator::validate`] maps a field definition and a candidate value
//! to at most one error. Checks run in a fixed order and the first failure
//! wins:
//!
//! 1. required but empty
//! 2. shorter than `minLength`
//! 3. longer than `maxLength`
//! 4. does not match `pattern`
//! 5. outside `min`/`max` (dates; only with [`ValidationPolicy::enforce_date_range`])
//!
//! [`FieldValidator::validate_form`] runs the evaluator over every field and
//! accumulates one error per failing field rather than short-circuiting.

use std::collections::HashMap;

use chrono::NaiveDate;
use formforge_core::{ValidationError, ValidationSettings};
use regex::Regex;

use crate::field::{FieldDefinition, FieldKind};
use crate::form::FormDefinition;
use crate::value::{is_blank, FieldValue};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional checks layered on top of the four field checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Check `Date` values against `min`/`max`.
    pub enforce_date_range: bool,
    /// Treat `minLength > maxLength` as a configuration error in the builder.
    pub reject_inverted_length_bounds: bool,
}

impl From<ValidationSettings> for ValidationPolicy {
    fn from(settings: ValidationSettings) -> Self {
        Self {
            enforce_date_range: settings.enforce_date_range,
            reject_inverted_length_bounds: settings.reject_inverted_length_bounds,
        }
    }
}

/// Per-field errors for one submission, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: HashMap<String, ValidationError>,
}

impl FormErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the error for a field, replacing any earlier one.
    pub fn insert(&mut self, field_id: impl Into<String>, error: ValidationError) {
        self.errors.insert(field_id.into(), error);
    }

    /// Clears the error for a field, returning it.
    pub fn remove(&mut self, field_id: &str) -> Option<ValidationError> {
        self.errors.remove(field_id)
    }

    /// Returns the error for a field.
    pub fn get(&self, field_id: &str) -> Option<&ValidationError> {
        self.errors.get(field_id)
    }

    /// Returns the message for a field.
    pub fn message(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(|e| e.message.as_str())
    }

    /// Returns `true` when no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over `(field_id, error)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Removes every error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// Evaluates field values and field configuration under a [`ValidationPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator {
    policy: ValidationPolicy,
}

impl FieldValidator {
    /// Creates a validator with the given policy.
    pub const fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Returns the active policy.
    pub const fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validates one value. Returns the first failing check, or `None`.
    pub fn validate(
        &self,
        field: &FieldDefinition,
        value: Option<&FieldValue>,
    ) -> Option<ValidationError> {
        if is_blank(value) {
            return field.required.then(required_error);
        }

        let text = value.and_then(FieldValue::as_text)?;
        let length = text.chars().count();

        if let Some(min) = field.min_length.filter(|&m| m > 0) {
            if length < min {
                return Some(
                    ValidationError::new(
                        format!("Minimum length is {min} characters"),
                        "min_length",
                    )
                    .with_param("min", min.to_string()),
                );
            }
        }

        if let Some(max) = field.max_length.filter(|&m| m > 0) {
            if length > max {
                return Some(
                    ValidationError::new(
                        format!("Maximum length is {max} characters"),
                        "max_length",
                    )
                    .with_param("max", max.to_string()),
                );
            }
        }

        if let Some(pattern) = field.effective_pattern() {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(text) => {
                    return Some(
                        ValidationError::new("Invalid format", "invalid")
                            .with_param("pattern", pattern),
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(field = field.id(), pattern, "Skipping invalid pattern: {e}");
                }
            }
        }

        if self.policy.enforce_date_range && field.kind == FieldKind::Date {
            return date_range_error(field, text);
        }

        None
    }

    /// Validates every field of a form against the submitted values.
    ///
    /// Values are keyed by field id; a missing key is an empty value.
    pub fn validate_form(
        &self,
        form: &FormDefinition,
        values: &HashMap<String, FieldValue>,
    ) -> FormErrors {
        let mut errors = FormErrors::new();
        for field in &form.fields {
            if let Some(error) = self.validate(field, values.get(field.id())) {
                errors.insert(field.id(), error);
            }
        }
        errors
    }

    /// Reports problems with a field's configuration rather than a value.
    ///
    /// Covers inverted length bounds, a pattern that does not compile, and
    /// an inverted or unparsable date range.
    pub fn check_configuration(&self, field: &FieldDefinition) -> Vec<ValidationError> {
        let mut problems = Vec::new();

        if let Some(error) = inverted_length_bounds(field) {
            problems.push(error);
        }

        if let Some(pattern) = field.effective_pattern() {
            if let Err(e) = Regex::new(pattern) {
                problems.push(
                    ValidationError::new(format!("Invalid pattern: {e}"), "invalid_pattern")
                        .with_param("pattern", pattern),
                );
            }
        }

        if field.kind == FieldKind::Date {
            let min = field.min.as_deref().filter(|s| !s.is_empty());
            let max = field.max.as_deref().filter(|s| !s.is_empty());
            for bound in min.into_iter().chain(max) {
                if parse_date(bound).is_none() {
                    problems.push(
                        ValidationError::new(format!("'{bound}' is not a valid date"), "invalid_date")
                            .with_param("value", bound),
                    );
                }
            }
            if let (Some(lo), Some(hi)) = (min.and_then(parse_date), max.and_then(parse_date)) {
                if lo > hi {
                    problems.push(ValidationError::new(
                        "Min date is after max date",
                        "inverted_bounds",
                    ));
                }
            }
        }

        problems
    }
}

/// Validates one value under the default policy.
pub fn validate_field(field: &FieldDefinition, value: Option<&FieldValue>) -> Option<ValidationError> {
    FieldValidator::default().validate(field, value)
}

/// Validates a whole form under the default policy.
pub fn validate_form(form: &FormDefinition, values: &HashMap<String, FieldValue>) -> FormErrors {
    FieldValidator::default().validate_form(form, values)
}

/// Returns the configuration error for `minLength > maxLength`, if present.
pub fn inverted_length_bounds(field: &FieldDefinition) -> Option<ValidationError> {
    match (field.min_length, field.max_length) {
        (Some(min), Some(max)) if min > max => Some(
            ValidationError::new(
                format!("Min length {min} is greater than max length {max}"),
                "inverted_bounds",
            )
            .with_param("min", min.to_string())
            .with_param("max", max.to_string()),
        ),
        _ => None,
    }
}

fn required_error() -> ValidationError {
    ValidationError::new("This field is required", "required")
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn date_range_error(field: &FieldDefinition, text: &str) -> Option<ValidationError> {
    let date = parse_date(text)?;
    if let Some(min) = field.min.as_deref().and_then(parse_date) {
        if date < min {
            return Some(
                ValidationError::new(format!("Date must be on or after {min}"), "date_min")
                    .with_param("min", min.to_string()),
            );
        }
    }
    if let Some(max) = field.max.as_deref().and_then(parse_date) {
        if date > max {
            return Some(
                ValidationError::new(format!("Date must be on or before {max}"), "date_max")
                    .with_param("max", max.to_string()),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    fn bounded() -> FieldDefinition {
        FieldDefinition::with_id("name", FieldKind::ShortText)
            .required(true)
            .min_length(3)
            .max_length(5)
    }

    // ── Check order ─────────────────────────────────────────────────

    #[test]
    fn test_required_empty_reports_required_only() {
        let field = bounded().pattern("^[0-9]+$");
        for empty in [None, Some(text("")), Some(FieldValue::Bool(false))] {
            let err = validate_field(&field, empty.as_ref()).unwrap();
            assert_eq!(err.code, "required");
            assert_eq!(err.message, "This field is required");
        }
    }

    #[test]
    fn test_optional_empty_passes_every_check() {
        let field = bounded().required(false).pattern("^x$");
        assert!(validate_field(&field, None).is_none());
        assert!(validate_field(&field, Some(&text(""))).is_none());
    }

    #[test]
    fn test_length_bounds_example() {
        let field = bounded();
        let err = validate_field(&field, Some(&text("ab"))).unwrap();
        assert_eq!(err.message, "Minimum length is 3 characters");
        assert!(validate_field(&field, Some(&text("abc"))).is_none());
        assert!(validate_field(&field, Some(&text("abcde"))).is_none());
        let err = validate_field(&field, Some(&text("abcdef"))).unwrap();
        assert_eq!(err.message, "Maximum length is 5 characters");
        assert_eq!(err.params.get("max").unwrap(), "5");
    }

    #[test]
    fn test_min_length_reported_before_pattern() {
        let field = bounded().pattern("^[0-9]+$");
        let err = validate_field(&field, Some(&text("ab"))).unwrap();
        assert_eq!(err.code, "min_length");
    }

    #[test]
    fn test_pattern_mismatch() {
        let field = bounded().pattern("^[0-9]+$");
        let err = validate_field(&field, Some(&text("abcd"))).unwrap();
        assert_eq!(err.message, "Invalid format");
        assert!(validate_field(&field, Some(&text("1234"))).is_none());
    }

    #[test]
    fn test_pattern_is_unanchored_search() {
        let field = FieldDefinition::new(FieldKind::ShortText).pattern("[0-9]");
        assert!(validate_field(&field, Some(&text("abc1"))).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let field = FieldDefinition::new(FieldKind::ShortText).pattern("([a-z");
        assert!(validate_field(&field, Some(&text("anything"))).is_none());
    }

    #[test]
    fn test_zero_bounds_are_ignored() {
        let field = FieldDefinition::new(FieldKind::LongText)
            .min_length(0)
            .max_length(0);
        assert!(validate_field(&field, Some(&text("long enough text"))).is_none());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let field = FieldDefinition::new(FieldKind::ShortText).max_length(3);
        assert!(validate_field(&field, Some(&text("héé"))).is_none());
    }

    #[test]
    fn test_required_checkbox() {
        let field = FieldDefinition::new(FieldKind::Boolean).required(true);
        assert!(validate_field(&field, Some(&FieldValue::Bool(true))).is_none());
        assert_eq!(
            validate_field(&field, Some(&FieldValue::Bool(false))).unwrap().code,
            "required"
        );
    }

    // ── Date range ──────────────────────────────────────────────────

    fn date_field() -> FieldDefinition {
        FieldDefinition::new(FieldKind::Date).date_range(Some("2024-01-01"), Some("2024-12-31"))
    }

    #[test]
    fn test_date_range_not_enforced_by_default() {
        assert!(validate_field(&date_field(), Some(&text("1999-01-01"))).is_none());
    }

    #[test]
    fn test_date_range_enforced_when_enabled() {
        let validator = FieldValidator::new(ValidationPolicy {
            enforce_date_range: true,
            ..ValidationPolicy::default()
        });
        let field = date_field();
        assert_eq!(
            validator.validate(&field, Some(&text("2023-12-31"))).unwrap().code,
            "date_min"
        );
        assert_eq!(
            validator.validate(&field, Some(&text("2025-01-01"))).unwrap().code,
            "date_max"
        );
        assert!(validator.validate(&field, Some(&text("2024-06-15"))).is_none());
        // Unparsable values are not range-checked
        assert!(validator.validate(&field, Some(&text("soon"))).is_none());
    }

    // ── Whole form ──────────────────────────────────────────────────

    #[test]
    fn test_validate_form_collects_all_errors() {
        let form = FormDefinition::new("F")
            .with_field(bounded())
            .with_field(FieldDefinition::with_id("agree", FieldKind::Boolean).required(true))
            .with_field(FieldDefinition::with_id("note", FieldKind::LongText));
        let mut values = HashMap::new();
        values.insert("name".to_string(), text("ab"));
        let errors = validate_form(&form, &values);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message("name"), Some("Minimum length is 3 characters"));
        assert_eq!(errors.message("agree"), Some("This field is required"));
        assert!(errors.get("note").is_none());
    }

    // ── Configuration checks ────────────────────────────────────────

    #[test]
    fn test_check_configuration() {
        let validator = FieldValidator::default();
        let field = FieldDefinition::new(FieldKind::ShortText)
            .min_length(10)
            .max_length(2)
            .pattern("(");
        let codes: Vec<String> = validator
            .check_configuration(&field)
            .into_iter()
            .map(|e| e.code)
            .collect();
        assert_eq!(codes, vec!["inverted_bounds", "invalid_pattern"]);

        let dates = FieldDefinition::new(FieldKind::Date).date_range(Some("2025-01-01"), Some("2024-01-01"));
        assert_eq!(validator.check_configuration(&dates)[0].code, "inverted_bounds");

        let bad_date = FieldDefinition::new(FieldKind::Date).date_range(Some("01/02/2024"), None);
        assert_eq!(validator.check_configuration(&bad_date)[0].code, "invalid_date");

        assert!(validator.check_configuration(&bounded()).is_empty());
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = ValidationPolicy::from(ValidationSettings {
            enforce_date_range: true,
            reject_inverted_length_bounds: false,
        });
        assert!(policy.enforce_date_range);
        assert!(!policy.reject_inverted_length_bounds);
    }
}
