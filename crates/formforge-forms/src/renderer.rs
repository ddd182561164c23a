//! Whole-form rendering in fill and preview mode, and fill sessions.
//!
//! A [`FillSession`] holds the values a user has entered so far, keyed by
//! field id, and the errors from the last submit attempt. A [`Renderer`]
//! turns a form plus an optional session into HTML.
//!
//! Preview mode renders every control disabled and never collects or
//! validates values.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::field::{FieldDefinition, FieldKind};
use crate::form::FormDefinition;
use crate::validation::{FieldValidator, FormErrors, ValidationPolicy};
use crate::value::FieldValue;
use crate::widgets::{escape_html, render_field, value_from_data};

/// Which of the two rendering modes to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Editable controls with a submit button.
    Fill,
    /// Disabled controls, layout only.
    Preview,
}

/// The values accepted by a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Submitted values keyed by field id.
    pub values: HashMap<String, FieldValue>,
    /// When the submission was accepted.
    pub submitted_at: DateTime<Utc>,
}

/// In-progress values and errors for filling one form.
#[derive(Debug, Clone, Default)]
pub struct FillSession {
    values: HashMap<String, FieldValue>,
    errors: FormErrors,
    validator: FieldValidator,
}

impl FillSession {
    /// Starts a session with values seeded from each field's `defaultValue`.
    pub fn new(form: &FormDefinition) -> Self {
        let values = form
            .fields
            .iter()
            .filter_map(|field| seed_value(field).map(|v| (field.id().to_string(), v)))
            .collect();
        Self {
            values,
            errors: FormErrors::new(),
            validator: FieldValidator::default(),
        }
    }

    /// Sets the validation policy used by [`FillSession::submit`].
    #[must_use]
    pub const fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validator = FieldValidator::new(policy);
        self
    }

    /// The current value of a field.
    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    /// All current values.
    pub const fn values(&self) -> &HashMap<String, FieldValue> {
        &self.values
    }

    /// Errors from the last submit attempt, minus fields edited since.
    pub const fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Records a new value for a field and clears that field's error.
    pub fn set_value(&mut self, field_id: &str, value: impl Into<FieldValue>) {
        self.values.insert(field_id.to_string(), value.into());
        self.errors.remove(field_id);
    }

    /// Replaces the values of every field from submitted urlencoded data.
    ///
    /// Fields absent from the data (other than checkboxes, which read as
    /// unchecked) lose their value.
    pub fn apply_form_data(&mut self, form: &FormDefinition, data: &HashMap<String, String>) {
        for field in &form.fields {
            match value_from_data(field, data) {
                Some(value) => self.set_value(field.id(), value),
                None => {
                    self.values.remove(field.id());
                    self.errors.remove(field.id());
                }
            }
        }
    }

    /// Validates every field and either accepts the submission or keeps the errors.
    ///
    /// On success the values are logged, returned, and the session is reset to
    /// empty. On failure every field's error is kept and nothing is reset.
    pub fn submit(&mut self, form: &FormDefinition) -> Result<Submission, FormErrors> {
        let errors = self.validator.validate_form(form, &self.values);
        if !errors.is_empty() {
            tracing::debug!(form = %form.name, failing = errors.len(), "Submission blocked");
            self.errors = errors.clone();
            return Err(errors);
        }

        let values = std::mem::take(&mut self.values);
        self.errors.clear();
        tracing::info!(form = %form.name, values = ?values, "Form submitted");
        Ok(Submission {
            values,
            submitted_at: Utc::now(),
        })
    }
}

fn seed_value(field: &FieldDefinition) -> Option<FieldValue> {
    let default = field.default_value.as_deref()?;
    match field.kind {
        FieldKind::Boolean => Some(FieldValue::Bool(!matches!(default, "" | "false"))),
        FieldKind::ShortText | FieldKind::LongText | FieldKind::SingleChoice | FieldKind::Date => {
            Some(FieldValue::Text(default.to_string()))
        }
    }
}

/// Renders a form definition as an HTML `<form>`.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    form: &'a FormDefinition,
    mode: RenderMode,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer for the given form and mode.
    pub const fn new(form: &'a FormDefinition, mode: RenderMode) -> Self {
        Self { form, mode }
    }

    /// Creates a fill-mode renderer.
    pub const fn fill(form: &'a FormDefinition) -> Self {
        Self::new(form, RenderMode::Fill)
    }

    /// Creates a preview-mode renderer.
    pub const fn preview(form: &'a FormDefinition) -> Self {
        Self::new(form, RenderMode::Preview)
    }

    /// The rendering mode.
    pub const fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Renders the form.
    ///
    /// In fill mode, values and inline errors come from `session`; without
    /// one, a fresh session seeded from default values is used. Preview mode
    /// ignores `session` and shows default values only.
    pub fn render(&self, session: Option<&FillSession>) -> String {
        let seeded;
        let session = match (self.mode, session) {
            (RenderMode::Fill, Some(session)) => session,
            _ => {
                seeded = FillSession::new(self.form);
                &seeded
            }
        };
        let disabled = self.mode == RenderMode::Preview;

        let mut html = String::new();
        match self.mode {
            RenderMode::Fill => html.push_str(r#"<form class="formforge" method="post">"#),
            RenderMode::Preview => html.push_str(r#"<form class="formforge preview">"#),
        }
        let _ = write!(html, "<h1>{}</h1>", escape_html(&self.form.name));

        for field in &self.form.fields {
            let error = if disabled {
                None
            } else {
                session.errors().message(field.id())
            };
            html.push_str(&render_field(field, session.value(field.id()), error, disabled));
        }

        if self.mode == RenderMode::Fill {
            html.push_str(r#"<button type="submit">Submit Form</button>"#);
        }
        html.push_str("</form>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> FormDefinition {
        FormDefinition::new("Signup")
            .with_field(
                FieldDefinition::with_id("name", FieldKind::ShortText)
                    .label("Name")
                    .required(true)
                    .min_length(3)
                    .max_length(5),
            )
            .with_field(
                FieldDefinition::with_id("color", FieldKind::SingleChoice)
                    .options(["Red", "Blue"])
                    .default_value("Blue"),
            )
            .with_field(
                FieldDefinition::with_id("news", FieldKind::Boolean).default_value("true"),
            )
    }

    #[test]
    fn test_session_seeds_defaults() {
        let session = FillSession::new(&sample_form());
        assert_eq!(session.value("color"), Some(&FieldValue::from("Blue")));
        assert_eq!(session.value("news"), Some(&FieldValue::Bool(true)));
        assert!(session.value("name").is_none());
    }

    #[test]
    fn test_submit_blocks_on_errors_and_keeps_values() {
        let form = sample_form();
        let mut session = FillSession::new(&form);
        session.set_value("name", "ab");
        let errors = session.submit(&form).unwrap_err();
        assert_eq!(errors.message("name"), Some("Minimum length is 3 characters"));
        assert_eq!(session.errors().len(), 1);
        assert_eq!(session.value("name"), Some(&FieldValue::from("ab")));
    }

    #[test]
    fn test_set_value_clears_that_fields_error() {
        let form = sample_form();
        let mut session = FillSession::new(&form);
        assert!(session.submit(&form).is_err());
        assert!(session.errors().get("name").is_some());
        session.set_value("name", "abc");
        assert!(session.errors().get("name").is_none());
    }

    #[test]
    fn test_successful_submit_resets_values() {
        let form = sample_form();
        let mut session = FillSession::new(&form);
        session.set_value("name", "abc");
        let submission = session.submit(&form).unwrap();
        assert_eq!(submission.values.get("name"), Some(&FieldValue::from("abc")));
        assert_eq!(submission.values.get("color"), Some(&FieldValue::from("Blue")));
        assert!(session.values().is_empty());
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_apply_form_data() {
        let form = sample_form();
        let mut session = FillSession::new(&form);
        let mut data = HashMap::new();
        data.insert("name".to_string(), "abcd".to_string());
        session.apply_form_data(&form, &data);
        assert_eq!(session.value("name"), Some(&FieldValue::from("abcd")));
        // Unchecked checkbox and cleared select
        assert_eq!(session.value("news"), Some(&FieldValue::Bool(false)));
        assert!(session.value("color").is_none());
    }

    #[test]
    fn test_fill_render_shows_errors_and_submit_button() {
        let form = sample_form();
        let mut session = FillSession::new(&form);
        let _ = session.submit(&form);
        let html = Renderer::fill(&form).render(Some(&session));
        assert!(html.starts_with(r#"<form class="formforge" method="post"><h1>Signup</h1>"#));
        assert!(html.contains("This field is required"));
        assert!(html.contains(r#"<button type="submit">Submit Form</button>"#));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_preview_render_is_disabled_and_never_shows_errors() {
        let form = sample_form();
        let mut session = FillSession::new(&form);
        let _ = session.submit(&form);
        let html = Renderer::preview(&form).render(Some(&session));
        assert_eq!(html.matches(" disabled").count(), form.fields.len());
        assert!(!html.contains("This field is required"));
        assert!(!html.contains("<button"));
        // Default values still visible
        assert!(html.contains(r#"<option value="Blue" selected>"#));
    }

    #[test]
    fn test_render_preserves_field_order() {
        let form = sample_form();
        let html = Renderer::fill(&form).render(None);
        let name_at = html.find("field-name").unwrap();
        let color_at = html.find("field-color").unwrap();
        let news_at = html.find("field-news").unwrap();
        assert!(name_at < color_at && color_at < news_at);
    }

    #[test]
    fn test_title_is_escaped() {
        let form = FormDefinition::new("<script>");
        let html = Renderer::preview(&form).render(None);
        assert!(html.contains("<h1>&lt;script&gt;</h1>"));
    }
}
