//! Route handlers.
//!
//! Store access is synchronous; handlers call the [`FormStore`] directly and
//! render a full page for every outcome. Store-read failures become an error
//! page with the error's status code.
//!
//! [`FormStore`]: formforge_store::FormStore

use std::collections::HashMap;

use axum::extract::{Form, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use http::StatusCode;
use serde::Deserialize;

use formforge_core::logging::form_span;
use formforge_core::FormforgeError;
use formforge_forms::FillSession;

use crate::pages::{self, Notice};
use crate::server::AppState;
use crate::urls::MY_FORMS_PATH;

const SUBMIT_OK: &str = "Form submitted successfully!";
const SUBMIT_BLOCKED: &str = "Please fix the errors in the form";
const DELETED: &str = "Form deleted successfully";

/// Renders an error as a full page with its status code.
pub fn error_response(err: &FormforgeError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Request rejected");
    }
    (status, Html(pages::error_page(err))).into_response()
}

/// `GET /` redirects to the saved-forms list.
pub async fn index() -> Redirect {
    Redirect::to(MY_FORMS_PATH)
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::layout("Not found", "<h1>Page not found</h1>")),
    )
        .into_response()
}

/// `GET /forms/{key}`: the shared fill page, seeded with default values.
pub async fn fill_form(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    form_span(&key).in_scope(|| match state.store.load(&key) {
        Ok(form) => {
            let session = FillSession::new(&form).with_policy(state.policy());
            Html(pages::fill_page(&form, &session, None)).into_response()
        }
        Err(e) => error_response(&e),
    })
}

/// `POST /forms/{key}`: validates and accepts a submission.
///
/// A blocked submit re-renders the entered values with every inline error; an
/// accepted one renders the emptied form with a success notice.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Form(data): Form<HashMap<String, String>>,
) -> Response {
    form_span(&key).in_scope(|| {
        let form = match state.store.load(&key) {
            Ok(form) => form,
            Err(e) => return error_response(&e),
        };

        let mut session = FillSession::new(&form).with_policy(state.policy());
        session.apply_form_data(&form, &data);
        let notice = match session.submit(&form) {
            Ok(_) => Notice::Success(SUBMIT_OK),
            Err(_) => Notice::Error(SUBMIT_BLOCKED),
        };
        Html(pages::fill_page(&form, &session, Some(notice))).into_response()
    })
}

/// `GET /preview/{key}`: the disabled preview.
pub async fn preview_form(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    form_span(&key).in_scope(|| match state.store.load(&key) {
        Ok(form) => Html(pages::preview_page(&key, &form)).into_response(),
        Err(e) => error_response(&e),
    })
}

/// Query string of the saved-forms list.
#[derive(Debug, Default, Deserialize)]
pub struct MyFormsQuery {
    /// Set after a redirect from a successful delete.
    #[serde(default)]
    pub deleted: bool,
}

/// `GET /my-forms`: every saved form, newest first.
pub async fn my_forms(State(state): State<AppState>, Query(query): Query<MyFormsQuery>) -> Response {
    match state.store.list() {
        Ok(forms) => {
            let notice = query.deleted.then_some(Notice::Success(DELETED));
            Html(pages::my_forms_page(
                &forms,
                &state.settings.server.base_url,
                notice,
            ))
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// `POST /my-forms/{key}/delete`: removes a form and redirects to the list.
///
/// Deleting a key that holds nothing still redirects, without the notice.
pub async fn delete_form(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    form_span(&key).in_scope(|| match state.store.delete(&key) {
        Ok(true) => Redirect::to(&format!("{MY_FORMS_PATH}?deleted=true")).into_response(),
        Ok(false) => Redirect::to(MY_FORMS_PATH).into_response(),
        Err(e) => error_response(&e),
    })
}
