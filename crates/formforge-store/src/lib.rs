//! # formforge-store
//!
//! Persistence for form definitions.
//!
//! - [`backend`] - The [`KeyValueStore`] trait and its in-memory and file-backed
//!   implementations
//! - [`form_store`] - [`FormStore`]: save, load, list and delete form records,
//!   plus opening and saving builder sessions
//!
//! The key-value layer is synchronous and origin-scoped: no transactions, no
//! locking across writers, and the last write to a key wins.

pub mod backend;
pub mod form_store;

pub use backend::{open_store, FileStore, InMemoryStore, KeyValueStore};
pub use form_store::{FormStore, StoredForm, DEFAULT_PREFIX};
