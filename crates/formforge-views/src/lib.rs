//! # formforge-views
//!
//! The HTTP surface of formforge, built on Axum.
//!
//! ## Modules
//!
//! - [`server`] - [`FormforgeApp`], the application builder and server entry point
//! - [`handlers`] - Route handlers for filling, previewing, listing and deleting forms
//! - [`pages`] - HTML page assembly
//! - [`urls`] - Route paths and shareable links
//!
//! ## Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/forms/{key}` | Shared fill page |
//! | `POST` | `/forms/{key}` | Submit a filled form |
//! | `GET` | `/preview/{key}` | Disabled preview |
//! | `GET` | `/my-forms` | Saved forms, newest first |
//! | `POST` | `/my-forms/{key}/delete` | Delete a form, then redirect back |

pub mod handlers;
pub mod pages;
pub mod server;
pub mod urls;

pub use server::{AppState, FormforgeApp};
pub use urls::share_url;
