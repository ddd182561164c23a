//! Route paths and shareable links.
//!
//! Keys are percent-encoded as a single path segment, so any key the store
//! accepts produces a valid link. Axum decodes the segment again when the
//! route is matched.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a path segment: everything except the RFC 3986
/// unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The saved-forms listing.
pub const MY_FORMS_PATH: &str = "/my-forms";

fn encode(key: &str) -> String {
    utf8_percent_encode(key, PATH_SEGMENT).to_string()
}

/// The path of the shared fill page for `key`.
pub fn fill_path(key: &str) -> String {
    format!("/forms/{}", encode(key))
}

/// The path of the preview page for `key`.
pub fn preview_path(key: &str) -> String {
    format!("/preview/{}", encode(key))
}

/// The path that deletes the form under `key`.
pub fn delete_path(key: &str) -> String {
    format!("{MY_FORMS_PATH}/{}/delete", encode(key))
}

/// The absolute link a form's owner hands out: `{base_url}/forms/{key}`.
///
/// A trailing slash on `base_url` is ignored.
///
/// # Examples
///
/// ```
/// use formforge_views::share_url;
///
/// assert_eq!(
///     share_url("http://localhost:8000/", "form_1"),
///     "http://localhost:8000/forms/form_1"
/// );
/// ```
pub fn share_url(base_url: &str, key: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), fill_path(key))
}
