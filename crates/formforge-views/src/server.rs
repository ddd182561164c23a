//! HTTP server integration for formforge.
//!
//! [`FormforgeApp`] combines the settings and a [`FormStore`] into an Axum
//! router, or runs it directly as a server.
//!
//! # Examples
//!
//! ```no_run
//! use formforge_core::Settings;
//! use formforge_views::FormforgeApp;
//!
//! # async fn example() -> Result<(), formforge_core::FormforgeError> {
//! let settings = Settings::default();
//! let addr = settings.bind_addr();
//! FormforgeApp::from_settings(settings)?.run(&addr).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use formforge_core::{FormforgeError, FormforgeResult, Settings};
use formforge_forms::ValidationPolicy;
use formforge_store::FormStore;

use crate::handlers;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Where forms are read from and deleted.
    pub store: FormStore,
    /// The application settings.
    pub settings: Arc<Settings>,
}

impl AppState {
    /// The validation policy configured for fill sessions.
    pub fn policy(&self) -> ValidationPolicy {
        self.settings.validation.into()
    }
}

/// The formforge web application.
#[derive(Debug, Clone)]
pub struct FormforgeApp {
    settings: Settings,
    store: FormStore,
}

impl FormforgeApp {
    /// Creates an application over an existing store.
    pub const fn new(settings: Settings, store: FormStore) -> Self {
        Self { settings, store }
    }

    /// Creates an application, opening the store configured in `settings`.
    pub fn from_settings(settings: Settings) -> FormforgeResult<Self> {
        let store = FormStore::from_settings(&settings)?;
        Ok(Self::new(settings, store))
    }

    /// Returns a reference to the application settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns a reference to the form store.
    pub const fn store(&self) -> &FormStore {
        &self.store
    }

    /// Converts the application into an Axum router.
    pub fn into_axum_router(self) -> axum::Router {
        let state = AppState {
            store: self.store,
            settings: Arc::new(self.settings),
        };

        axum::Router::new()
            .route("/", get(handlers::index))
            .route(
                "/forms/{key}",
                get(handlers::fill_form).post(handlers::submit_form),
            )
            .route("/preview/{key}", get(handlers::preview_form))
            .route("/my-forms", get(handlers::my_forms))
            .route("/my-forms/{key}/delete", post(handlers::delete_form))
            .fallback(handlers::not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Runs the application as an HTTP server on the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the address or
    /// encounters a runtime error.
    pub async fn run(self, addr: &str) -> FormforgeResult<()> {
        let debug = self.settings.debug;
        let base_url = self.settings.server.base_url.clone();
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            FormforgeError::ConfigurationError(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        }
        tracing::info!(%base_url, "Share links use this base URL");

        axum::serve(listener, router).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formforge_store::InMemoryStore;

    fn app() -> FormforgeApp {
        FormforgeApp::new(
            Settings::default(),
            FormStore::new(Arc::new(InMemoryStore::new())),
        )
    }

    #[test]
    fn test_app_accessors() {
        let app = app();
        assert_eq!(app.settings().server.port, 8000);
        assert_eq!(app.store().prefix(), "form_");
    }

    #[test]
    fn test_state_policy_follows_settings() {
        let mut settings = Settings::default();
        settings.validation.enforce_date_range = true;
        let state = AppState {
            store: FormStore::new(Arc::new(InMemoryStore::new())),
            settings: Arc::new(settings),
        };
        assert!(state.policy().enforce_date_range);
        assert!(!state.policy().reject_inverted_length_bounds);
    }

    #[tokio::test]
    async fn test_run_fails_on_bad_address() {
        let err = app().run("not-an-address").await.unwrap_err();
        assert!(matches!(err, FormforgeError::ConfigurationError(_)));
    }
}
