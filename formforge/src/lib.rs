//! # formforge
//!
//! A form builder: compose forms from a toolbox of field types, configure
//! their validation, save them to a local key-value store and share them as
//! fill pages.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `formforge` for everything, or on individual crates for a smaller build.

/// Settings, logging and the error type.
pub use formforge_core as core;

/// Field model, validation, the builder surface and the renderer.
pub use formforge_forms as forms;

/// The key-value interface and the form store on top of it.
pub use formforge_store as store;

/// Fill, preview and saved-forms pages served with axum.
#[cfg(feature = "views")]
pub use formforge_views as views;

/// Management commands.
#[cfg(feature = "cli")]
pub use formforge_cli as cli;

/// Third-party crates re-exported for applications that embed the server.
pub mod reexports {
    pub use axum;
    pub use serde;
    pub use serde_json;
    pub use tokio;
    pub use tracing;
}

/// The types most programs need.
pub mod prelude {
    pub use formforge_core::{FormforgeError, FormforgeResult, Settings};
    pub use formforge_forms::{
        BuilderSurface, FieldDefinition, FieldKind, FieldValue, FillSession, FormDefinition,
        RenderMode, Renderer, Submission, ValidationPolicy,
    };
    pub use formforge_store::{FileStore, FormStore, InMemoryStore, KeyValueStore};

    #[cfg(feature = "views")]
    pub use formforge_views::{share_url, FormforgeApp};
}
