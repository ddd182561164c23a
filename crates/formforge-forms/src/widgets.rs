//! HTML rendering of individual field controls.
//!
//! [`render_control`] turns one [`FieldDefinition`] into its HTML control with
//! a single exhaustive `match` on [`FieldKind`]; [`render_field`] wraps that
//! control with the label, the inline error and the help text.
//! [`value_from_data`] is the inverse direction: it extracts a field's value
//! from submitted urlencoded form data.
//!
//! Every attribute value and text node is HTML-escaped. Field ids are used as
//! the control's `name` and, prefixed with `field-`, as its `id`.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::field::{FieldDefinition, FieldKind};
use crate::value::FieldValue;

const TEXT_PLACEHOLDER: &str = "Enter text...";
const CHOICE_PROMPT: &str = "Select an option";

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// An HTML attribute: a valued one (`name="value"`) or a bare flag (`disabled`).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Attr {
    Value(&'static str, String),
    Flag(&'static str),
}

/// Formats attributes into a string like ` key="value" flag`, in insertion order.
fn render_attrs(attrs: &[Attr]) -> String {
    let mut out = String::new();
    for attr in attrs {
        match attr {
            Attr::Value(k, v) => {
                let _ = write!(out, r#" {k}="{}""#, escape_html(v));
            }
            Attr::Flag(k) => {
                let _ = write!(out, " {k}");
            }
        }
    }
    out
}

/// The HTML `id` of a field's control.
pub fn control_id(field: &FieldDefinition) -> String {
    format!("field-{}", field.id())
}

/// Renders the bare control for a field.
///
/// `disabled` renders a non-interactive control (preview mode); `has_error`
/// adds the `error` class so the control can be highlighted.
pub fn render_control(
    field: &FieldDefinition,
    value: Option<&FieldValue>,
    disabled: bool,
    has_error: bool,
) -> String {
    let text = value.and_then(FieldValue::as_text).unwrap_or("");

    let mut attrs = vec![
        Attr::Value("id", control_id(field)),
        Attr::Value("name", field.id().to_string()),
    ];
    if has_error {
        attrs.push(Attr::Value("class", "error".to_string()));
    }

    match field.kind {
        FieldKind::ShortText => {
            attrs.push(Attr::Value("type", "text".to_string()));
            attrs.push(Attr::Value("value", text.to_string()));
            push_placeholder(&mut attrs, field);
            push_length_bounds(&mut attrs, field);
            if let Some(pattern) = field.effective_pattern() {
                attrs.push(Attr::Value("pattern", pattern.to_string()));
            }
            push_common_flags(&mut attrs, field, disabled);
            format!("<input{} />", render_attrs(&attrs))
        }
        FieldKind::LongText => {
            attrs.push(Attr::Value("rows", "3".to_string()));
            push_placeholder(&mut attrs, field);
            push_length_bounds(&mut attrs, field);
            push_common_flags(&mut attrs, field, disabled);
            format!("<textarea{}>{}</textarea>", render_attrs(&attrs), escape_html(text))
        }
        FieldKind::SingleChoice => {
            push_common_flags(&mut attrs, field, disabled);
            let mut html = format!("<select{}>", render_attrs(&attrs));
            let _ = write!(html, r#"<option value="">{CHOICE_PROMPT}</option>"#);
            for option in &field.options {
                let mut option_attrs = vec![Attr::Value("value", option.clone())];
                if option == text {
                    option_attrs.push(Attr::Flag("selected"));
                }
                let _ = write!(
                    html,
                    "<option{}>{}</option>",
                    render_attrs(&option_attrs),
                    escape_html(option)
                );
            }
            html.push_str("</select>");
            html
        }
        FieldKind::Boolean => {
            attrs.push(Attr::Value("type", "checkbox".to_string()));
            if value.and_then(FieldValue::as_bool).unwrap_or(false) {
                attrs.push(Attr::Flag("checked"));
            }
            push_common_flags(&mut attrs, field, disabled);
            format!(
                r#"<input{} /><label for="{}">{}</label>"#,
                render_attrs(&attrs),
                escape_html(&control_id(field)),
                escape_html(&field.label)
            )
        }
        FieldKind::Date => {
            attrs.push(Attr::Value("type", "date".to_string()));
            attrs.push(Attr::Value("value", text.to_string()));
            if let Some(min) = field.min.as_deref().filter(|s| !s.is_empty()) {
                attrs.push(Attr::Value("min", min.to_string()));
            }
            if let Some(max) = field.max.as_deref().filter(|s| !s.is_empty()) {
                attrs.push(Attr::Value("max", max.to_string()));
            }
            push_common_flags(&mut attrs, field, disabled);
            format!("<input{} />", render_attrs(&attrs))
        }
    }
}

fn push_placeholder(attrs: &mut Vec<Attr>, field: &FieldDefinition) {
    let placeholder = field
        .placeholder
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(TEXT_PLACEHOLDER);
    attrs.push(Attr::Value("placeholder", placeholder.to_string()));
}

fn push_length_bounds(attrs: &mut Vec<Attr>, field: &FieldDefinition) {
    if let Some(min) = field.min_length.filter(|&m| m > 0) {
        attrs.push(Attr::Value("minlength", min.to_string()));
    }
    if let Some(max) = field.max_length.filter(|&m| m > 0) {
        attrs.push(Attr::Value("maxlength", max.to_string()));
    }
}

fn push_common_flags(attrs: &mut Vec<Attr>, field: &FieldDefinition, disabled: bool) {
    if field.required {
        attrs.push(Attr::Flag("required"));
    }
    if disabled {
        attrs.push(Attr::Flag("disabled"));
    }
}

/// Renders a field with its label, control, inline error and help text.
pub fn render_field(
    field: &FieldDefinition,
    value: Option<&FieldValue>,
    error: Option<&str>,
    disabled: bool,
) -> String {
    let mut html = String::from(r#"<div class="field">"#);
    let _ = write!(
        html,
        r#"<label for="{}">{}"#,
        escape_html(&control_id(field)),
        escape_html(&field.label)
    );
    if field.required {
        html.push_str(r#" <span class="required">*</span>"#);
    }
    html.push_str("</label>");
    html.push_str(&render_control(field, value, disabled, error.is_some()));
    if let Some(error) = error {
        let _ = write!(html, r#"<p class="error">{}</p>"#, escape_html(error));
    }
    if let Some(help) = field.help_text.as_deref().filter(|h| !h.is_empty()) {
        let _ = write!(html, r#"<p class="help">{}</p>"#, escape_html(help));
    }
    html.push_str("</div>");
    html
}

/// Extracts a field's value from submitted urlencoded form data.
///
/// Checkboxes are absent from the data when unchecked, so a `Boolean` field
/// always yields a value: `true` when its name was submitted with anything
/// other than `"false"`/`"off"`. Other kinds yield `None` when absent.
pub fn value_from_data(field: &FieldDefinition, data: &HashMap<String, String>) -> Option<FieldValue> {
    let raw = data.get(field.id());
    match field.kind {
        FieldKind::Boolean => Some(FieldValue::Bool(
            raw.is_some_and(|v| !matches!(v.as_str(), "false" | "off")),
        )),
        FieldKind::ShortText | FieldKind::LongText | FieldKind::SingleChoice | FieldKind::Date => {
            raw.map(|v| FieldValue::Text(v.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_short_text_control() {
        let field = FieldDefinition::with_id("f1", FieldKind::ShortText)
            .required(true)
            .min_length(2)
            .max_length(8)
            .pattern("[a-z]+");
        let html = render_control(&field, Some(&FieldValue::from("abc")), false, false);
        assert_eq!(
            html,
            r#"<input id="field-f1" name="f1" type="text" value="abc" placeholder="Enter text..." minlength="2" maxlength="8" pattern="[a-z]+" required />"#
        );
    }

    #[test]
    fn test_long_text_control_escapes_content() {
        let field = FieldDefinition::with_id("f2", FieldKind::LongText).placeholder("Say more");
        let html = render_control(&field, Some(&FieldValue::from("<b>hi</b>")), true, true);
        assert!(html.starts_with(r#"<textarea id="field-f2" name="f2" class="error" rows="3" placeholder="Say more" disabled>"#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;</textarea>"));
    }

    #[test]
    fn test_select_control_marks_selected_option() {
        let field = FieldDefinition::with_id("f3", FieldKind::SingleChoice).options(["Red", "Blue"]);
        let html = render_control(&field, Some(&FieldValue::from("Blue")), false, false);
        assert!(html.contains(r#"<option value="">Select an option</option>"#));
        assert!(html.contains(r#"<option value="Red">Red</option>"#));
        assert!(html.contains(r#"<option value="Blue" selected>Blue</option>"#));
    }

    #[test]
    fn test_select_without_options_only_has_prompt() {
        let field = FieldDefinition::with_id("f3", FieldKind::SingleChoice);
        let html = render_control(&field, None, false, false);
        assert_eq!(html.matches("<option").count(), 1);
    }

    #[test]
    fn test_checkbox_control() {
        let field = FieldDefinition::with_id("f4", FieldKind::Boolean).label("I agree");
        let checked = render_control(&field, Some(&FieldValue::Bool(true)), false, false);
        assert!(checked.contains(r#"type="checkbox" checked"#));
        assert!(checked.contains(r#"<label for="field-f4">I agree</label>"#));
        let unchecked = render_control(&field, None, false, false);
        assert!(!unchecked.contains("checked"));
    }

    #[test]
    fn test_date_control_bounds() {
        let field = FieldDefinition::with_id("f5", FieldKind::Date)
            .date_range(Some("2024-01-01"), Some(""));
        let html = render_control(&field, None, true, false);
        assert!(html.contains(r#"min="2024-01-01""#));
        assert!(!html.contains("max="));
        assert!(html.ends_with(" disabled />"));
    }

    #[test]
    fn test_render_field_chrome() {
        let field = FieldDefinition::with_id("f6", FieldKind::ShortText)
            .label("Name")
            .required(true)
            .help_text("As on your passport");
        let html = render_field(&field, None, Some("This field is required"), false);
        assert!(html.contains(r#"<label for="field-f6">Name <span class="required">*</span></label>"#));
        assert!(html.contains(r#"<p class="error">This field is required</p>"#));
        assert!(html.contains(r#"<p class="help">As on your passport</p>"#));
        assert!(html.contains(r#"class="error""#));
    }

    #[test]
    fn test_value_from_data() {
        let mut data = HashMap::new();
        data.insert("t".to_string(), "hello".to_string());
        data.insert("c".to_string(), "on".to_string());

        let text = FieldDefinition::with_id("t", FieldKind::ShortText);
        assert_eq!(value_from_data(&text, &data), Some(FieldValue::from("hello")));

        let checked = FieldDefinition::with_id("c", FieldKind::Boolean);
        assert_eq!(value_from_data(&checked, &data), Some(FieldValue::Bool(true)));

        let unchecked = FieldDefinition::with_id("u", FieldKind::Boolean);
        assert_eq!(value_from_data(&unchecked, &data), Some(FieldValue::Bool(false)));

        let missing = FieldDefinition::with_id("m", FieldKind::Date);
        assert_eq!(value_from_data(&missing, &data), None);
    }
}
