//! HTML page assembly.
//!
//! Every page shares one [`layout`]: a minimal document with a header linking
//! to the saved-forms list. Form bodies themselves come from
//! [`formforge_forms::Renderer`].

use std::fmt::Write as _;

use formforge_core::FormforgeError;
use formforge_forms::widgets::escape_html;
use formforge_forms::{FillSession, FormDefinition, Renderer};
use formforge_store::StoredForm;

use crate::urls::{delete_path, fill_path, preview_path, share_url, MY_FORMS_PATH};

/// The line shown under both store-read failures.
pub const MISSING_FORM_DETAIL: &str = "The form you're looking for doesn't exist or has been removed.";

/// A one-line banner shown above page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    /// Something worked.
    Success(&'a str),
    /// Something needs the user's attention.
    Error(&'a str),
}

impl Notice<'_> {
    fn render(self) -> String {
        let (class, text) = match self {
            Self::Success(text) => ("notice success", text),
            Self::Error(text) => ("notice error", text),
        };
        format!(r#"<div class="{class}" role="status">{}</div>"#, escape_html(text))
    }
}

/// Wraps page content in the shared document chrome.
pub fn layout(title: &str, content: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>",
            r#"<html lang="en"><head><meta charset="utf-8">"#,
            "<title>{title} | FormForge</title></head>",
            r#"<body><header><a href="/">FormForge</a> <a href="{my_forms}">My Forms</a></header>"#,
            "<main>{content}</main></body></html>"
        ),
        title = escape_html(title),
        my_forms = MY_FORMS_PATH,
        content = content,
    )
}

/// The shared fill page, optionally with a notice from the last submit.
pub fn fill_page(form: &FormDefinition, session: &FillSession, notice: Option<Notice<'_>>) -> String {
    let mut content = String::new();
    if let Some(notice) = notice {
        content.push_str(&notice.render());
    }
    content.push_str(&Renderer::fill(form).render(Some(session)));
    layout(&form.name, &content)
}

/// The preview page: the disabled form plus a link to its fill page.
pub fn preview_page(key: &str, form: &FormDefinition) -> String {
    let mut content = String::from(r#"<p class="preview-banner">Preview mode</p>"#);
    content.push_str(&Renderer::preview(form).render(None));
    let _ = write!(
        content,
        r#"<p><a href="{}">Open the fill page</a></p>"#,
        escape_html(&fill_path(key))
    );
    layout(&format!("Preview: {}", form.name), &content)
}

/// The saved-forms listing.
pub fn my_forms_page(forms: &[StoredForm], base_url: &str, notice: Option<Notice<'_>>) -> String {
    let mut content = String::new();
    if let Some(notice) = notice {
        content.push_str(&notice.render());
    }
    content.push_str("<h1>My Forms</h1>");

    if forms.is_empty() {
        content.push_str(concat!(
            r#"<div class="empty"><h3>No forms found</h3>"#,
            "<p>Get started by creating a new form</p></div>"
        ));
        return layout("My Forms", &content);
    }

    content.push_str(r#"<ul class="forms">"#);
    for StoredForm { key, form } in forms {
        let count = form.fields.len();
        let _ = write!(
            content,
            concat!(
                r#"<li class="form-card"><h3>{name}</h3>"#,
                "<p>{count} field{plural}</p>",
                "<p>Last modified: {modified}</p>",
                r#"<input type="text" readonly value="{share}" />"#,
                r#"<a href="{preview}">Preview</a> "#,
                r#"<form method="post" action="{delete}"><button type="submit">Delete</button></form>"#,
                "</li>"
            ),
            name = escape_html(&form.name),
            count = count,
            plural = if count == 1 { "" } else { "s" },
            modified = form.last_modified.format("%Y-%m-%d %H:%M:%S UTC"),
            share = escape_html(&share_url(base_url, key)),
            preview = escape_html(&preview_path(key)),
            delete = escape_html(&delete_path(key)),
        );
    }
    content.push_str("</ul>");
    layout("My Forms", &content)
}

/// The full-page message for a failed request.
///
/// Store-read failures get their headline plus [`MISSING_FORM_DETAIL`];
/// anything else shows the error's user-facing message.
pub fn error_page(err: &FormforgeError) -> String {
    let headline = err.user_message();
    let mut content = format!(r#"<div class="error-page"><h1>{}</h1>"#, escape_html(&headline));
    if err.is_read_failure() {
        let _ = write!(content, "<p>{MISSING_FORM_DETAIL}</p>");
    }
    let _ = write!(content, r#"<a href="{MY_FORMS_PATH}">Back to My Forms</a></div>"#);
    layout(&headline, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formforge_forms::{FieldDefinition, FieldKind};

    fn stored(key: &str, name: &str, fields: usize) -> StoredForm {
        let mut form = FormDefinition::new(name);
        for _ in 0..fields {
            form.fields.push(FieldDefinition::new(FieldKind::ShortText));
        }
        StoredForm {
            key: key.to_string(),
            form,
        }
    }

    #[test]
    fn test_layout_escapes_title() {
        let html = layout("<x>", "<p>body</p>");
        assert!(html.contains("<title>&lt;x&gt; | FormForge</title>"));
        assert!(html.contains("<main><p>body</p></main>"));
    }

    #[test]
    fn test_my_forms_empty_state() {
        let html = my_forms_page(&[], "http://localhost:8000", None);
        assert!(html.contains("No forms found"));
        assert!(html.contains("Get started by creating a new form"));
    }

    #[test]
    fn test_my_forms_cards() {
        let forms = vec![stored("form_a", "Alpha", 1), stored("form_b", "Beta", 3)];
        let html = my_forms_page(&forms, "http://host", Some(Notice::Success("Form deleted successfully")));
        assert!(html.contains("Form deleted successfully"));
        assert!(html.contains("<p>1 field</p>"));
        assert!(html.contains("<p>3 fields</p>"));
        assert!(html.contains(r#"value="http://host/forms/form_a""#));
        assert!(html.contains(r#"href="/preview/form_b""#));
        assert!(html.contains(r#"action="/my-forms/form_b/delete""#));
        assert!(html.find("Alpha").unwrap() < html.find("Beta").unwrap());
    }

    #[test]
    fn test_error_page_for_read_failures() {
        let html = error_page(&FormforgeError::NotFound("form_x".into()));
        assert!(html.contains("<h1>Form not found</h1>"));
        assert!(html.contains(MISSING_FORM_DETAIL));

        let html = error_page(&FormforgeError::MalformedRecord {
            key: "form_x".into(),
            reason: "eof".into(),
        });
        assert!(html.contains("<h1>Error loading form data</h1>"));
        assert!(html.contains(MISSING_FORM_DETAIL));

        let html = error_page(&FormforgeError::Storage("disk".into()));
        assert!(!html.contains(MISSING_FORM_DETAIL));
    }

    #[test]
    fn test_preview_page_links_to_fill_page() {
        let form = stored("form_a", "Alpha", 1).form;
        let html = preview_page("form_a", &form);
        assert!(html.contains("Preview mode"));
        assert!(html.contains(r#"<form class="formforge preview">"#));
        assert!(html.contains(r#"href="/forms/form_a""#));
    }
}
