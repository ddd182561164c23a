//! Form definitions: a named, ordered collection of fields.
//!
//! The serialized form of [`FormDefinition`] is the persisted record:
//! `{ "name": ..., "fields": [...], "lastModified": "<RFC 3339>" }`.
//! Field order is display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::field::FieldDefinition;

/// The name a form gets before the user picks one, and when a record has none.
pub const DEFAULT_FORM_NAME: &str = "Untitled Form";

fn default_name() -> String {
    DEFAULT_FORM_NAME.to_string()
}

fn name_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_name))
}

fn fields_or_empty<'de, D>(deserializer: D) -> Result<Vec<FieldDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FieldDefinition>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named, ordered collection of fields.
///
/// Field ids are expected to be unique within one form; nothing enforces
/// uniqueness across forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    /// The form's display name. Missing, `null` or blank reads as "Untitled Form".
    #[serde(default = "default_name", deserialize_with = "name_or_default")]
    pub name: String,
    /// The fields, in display order. Missing or `null` reads as empty.
    #[serde(default, deserialize_with = "fields_or_empty")]
    pub fields: Vec<FieldDefinition>,
    /// When the form was last saved.
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl Default for FormDefinition {
    fn default() -> Self {
        Self::new(DEFAULT_FORM_NAME)
    }
}

impl FormDefinition {
    /// Creates an empty form with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Appends a field, builder style.
    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by id.
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id() == id)
    }

    /// Returns the display position of a field.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id() == id)
    }

    /// Stamps `last_modified` with the current time.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Returns `true` if two forms have the same name and fields, ignoring timestamps.
    pub fn same_content(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }

    /// Returns the ids that occur more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes = Vec::new();
        for field in &self.fields {
            if !seen.insert(field.id()) && !dupes.contains(&field.id()) {
                dupes.push(field.id());
            }
        }
        dupes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[test]
    fn test_missing_keys_take_defaults() {
        let form: FormDefinition = serde_json::from_str("{}").unwrap();
        assert_eq!(form.name, DEFAULT_FORM_NAME);
        assert!(form.fields.is_empty());

        let form: FormDefinition = serde_json::from_str(r#"{"name":"","fields":null}"#).unwrap();
        assert_eq!(form.name, DEFAULT_FORM_NAME);
        assert!(form.fields.is_empty());

        let form: FormDefinition = serde_json::from_str(r#"{"name":" \t "}"#).unwrap();
        assert_eq!(form.name, DEFAULT_FORM_NAME);
    }

    #[test]
    fn test_record_shape() {
        let mut form = FormDefinition::new("Survey")
            .with_field(FieldDefinition::with_id("a", FieldKind::Boolean));
        form.last_modified = "2024-05-01T10:00:00Z".parse().unwrap();
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["name"], "Survey");
        assert_eq!(json["fields"][0]["type"], "checkbox");
        assert_eq!(json["lastModified"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_accepts_javascript_iso_timestamps() {
        let json = r#"{"name":"X","fields":[],"lastModified":"2024-03-09T18:22:41.123Z"}"#;
        let form: FormDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(form.last_modified.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_lookup_and_position() {
        let form = FormDefinition::new("F")
            .with_field(FieldDefinition::with_id("a", FieldKind::ShortText))
            .with_field(FieldDefinition::with_id("b", FieldKind::Date));
        assert_eq!(form.field("b").unwrap().kind, FieldKind::Date);
        assert_eq!(form.position("b"), Some(1));
        assert!(form.field("zzz").is_none());
    }

    #[test]
    fn test_same_content_ignores_timestamp() {
        let a = FormDefinition::new("F");
        let mut b = a.clone();
        b.last_modified = "2000-01-01T00:00:00Z".parse().unwrap();
        assert!(a.same_content(&b));
        b.name = "G".into();
        assert!(!a.same_content(&b));
    }

    #[test]
    fn test_duplicate_ids() {
        let form = FormDefinition::new("F")
            .with_field(FieldDefinition::with_id("a", FieldKind::ShortText))
            .with_field(FieldDefinition::with_id("a", FieldKind::Date))
            .with_field(FieldDefinition::with_id("a", FieldKind::Date))
            .with_field(FieldDefinition::with_id("b", FieldKind::Date));
        assert_eq!(form.duplicate_ids(), vec!["a"]);
    }
}
