//! # formforge-forms
//!
//! The form model and everything that operates on it in memory:
//!
//! - [`field`] - Field kinds, field definitions, and the per-kind settings panel
//! - [`value`] - Candidate values submitted for a field
//! - [`form`] - Named, ordered collections of fields
//! - [`validation`] - The field validation evaluator and configuration checks
//! - [`builder`] - The builder surface state machine (add, update, delete, reorder, select)
//! - [`widgets`] - HTML rendering of a single field control
//! - [`renderer`] - Fill and preview rendering of a whole form, and fill sessions
//!
//! Persistence lives in `formforge-store`; this crate never touches storage.

pub mod builder;
pub mod field;
pub mod form;
pub mod renderer;
pub mod validation;
pub mod value;
pub mod widgets;

pub use builder::BuilderSurface;
pub use field::{FieldAttribute, FieldDefinition, FieldKind};
pub use form::{FormDefinition, DEFAULT_FORM_NAME};
pub use renderer::{FillSession, RenderMode, Renderer, Submission};
pub use validation::{FieldValidator, FormErrors, ValidationPolicy};
pub use value::FieldValue;
