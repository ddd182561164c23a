//! The form store: form definitions persisted in a [`KeyValueStore`].
//!
//! Each form is one JSON record under a key of the form `<prefix><uuid>`
//! (`form_` by default). Listing scans only keys with the prefix, so other
//! entries in the same backend are left alone.
//!
//! Saving to an existing key overwrites it. There is no versioning and no
//! concurrency control: the last write wins.

use std::sync::Arc;

use formforge_core::{FormforgeError, FormforgeResult, Settings};
use formforge_forms::{BuilderSurface, FormDefinition, ValidationPolicy};

use crate::backend::{open_store, KeyValueStore};

/// The default key prefix for form records.
pub const DEFAULT_PREFIX: &str = "form_";

/// A form definition together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredForm {
    /// The storage key.
    pub key: String,
    /// The decoded definition.
    pub form: FormDefinition,
}

/// Loads, saves, lists and deletes form definitions.
///
/// Cloning is cheap; clones share the backend.
#[derive(Debug, Clone)]
pub struct FormStore {
    backend: Arc<dyn KeyValueStore>,
    prefix: String,
    policy: ValidationPolicy,
}

impl FormStore {
    /// Wraps a backend using the default `form_` prefix.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            prefix: DEFAULT_PREFIX.to_string(),
            policy: ValidationPolicy::default(),
        }
    }

    /// Opens the backend configured in `settings` with its prefix and policy.
    pub fn from_settings(settings: &Settings) -> FormforgeResult<Self> {
        let store = Self::new(open_store(settings)?)
            .with_prefix(settings.key_prefix.clone())
            .with_policy(settings.validation.into());
        Ok(store)
    }

    /// Uses a different key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the validation policy handed to builder sessions.
    #[must_use]
    pub const fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The underlying key-value backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Generates a fresh `<prefix><uuid>` key.
    pub fn new_key(&self) -> String {
        format!("{}{}", self.prefix, uuid::Uuid::new_v4())
    }

    /// Serializes `form` under `key`, stamping `lastModified` with the current time.
    ///
    /// Returns the definition as stored. A rejected write surfaces as
    /// [`FormforgeError::StorageWrite`].
    pub fn save(&self, key: &str, form: &FormDefinition) -> FormforgeResult<FormDefinition> {
        let mut stamped = form.clone();
        stamped.touch();
        let record = serde_json::to_string(&stamped)
            .map_err(|e| FormforgeError::StorageWrite(format!("cannot serialize form: {e}")))?;
        self.backend.set(key, &record)?;
        tracing::debug!(key, fields = stamped.fields.len(), "Saved form");
        Ok(stamped)
    }

    /// Reads the form stored under `key`.
    ///
    /// A missing key is [`FormforgeError::NotFound`]; a record that does not
    /// decode is [`FormforgeError::MalformedRecord`].
    pub fn load(&self, key: &str) -> FormforgeResult<FormDefinition> {
        self.try_load(key)?
            .ok_or_else(|| FormforgeError::NotFound(key.to_string()))
    }

    /// Like [`FormStore::load`], but a missing key is `Ok(None)`.
    pub fn try_load(&self, key: &str) -> FormforgeResult<Option<FormDefinition>> {
        let Some(record) = self.backend.get(key)? else {
            tracing::debug!(key, "No form stored under key");
            return Ok(None);
        };
        let form = decode(key, &record)?;
        tracing::debug!(key, fields = form.fields.len(), "Loaded form");
        Ok(Some(form))
    }

    /// Returns `true` if a record exists under `key`, decodable or not.
    pub fn exists(&self, key: &str) -> FormforgeResult<bool> {
        Ok(self.backend.get(key)?.is_some())
    }

    /// Lists every form whose key carries the prefix, newest first.
    ///
    /// Records that fail to decode are logged and skipped.
    pub fn list(&self) -> FormforgeResult<Vec<StoredForm>> {
        let mut forms = Vec::new();
        for key in self.backend.keys()? {
            if !key.starts_with(&self.prefix) {
                continue;
            }
            let Some(record) = self.backend.get(&key)? else {
                continue;
            };
            match decode(&key, &record) {
                Ok(form) => forms.push(StoredForm { key, form }),
                Err(e) => tracing::error!(key = %key, error = %e, "Skipping unreadable form"),
            }
        }
        forms.sort_by(|a, b| b.form.last_modified.cmp(&a.form.last_modified));
        Ok(forms)
    }

    /// Removes the form under `key`. Returns `false` if nothing was stored there.
    pub fn delete(&self, key: &str) -> FormforgeResult<bool> {
        let removed = self.backend.delete(key)?;
        tracing::debug!(key, removed, "Deleted form");
        Ok(removed)
    }

    /// Opens a builder session.
    ///
    /// Without a key, the session starts empty under a fresh key. With a key,
    /// the stored form is loaded when present and the session is marked as
    /// editing an existing form; otherwise it starts empty under that key.
    pub fn open_builder(&self, key: Option<&str>) -> FormforgeResult<BuilderSurface> {
        let surface = match key {
            None => BuilderSurface::new(&self.prefix),
            Some(key) => match self.try_load(key)? {
                Some(form) => BuilderSurface::from_saved(key, form),
                None => BuilderSurface::with_key(key),
            },
        };
        Ok(surface.with_policy(self.policy))
    }

    /// Saves a builder session under its key with the chosen name.
    ///
    /// The name is trimmed and must not be blank
    /// ([`FormforgeError::EmptyFormName`]). On success the session adopts the
    /// stored timestamp and is marked as editing an existing form.
    pub fn save_builder(
        &self,
        surface: &mut BuilderSurface,
        name: &str,
    ) -> FormforgeResult<FormDefinition> {
        let key = surface.key().to_string();
        let form = surface.prepare_save(name)?;
        let saved = self.save(&key, form)?;
        surface.mark_saved(&saved);
        Ok(saved)
    }
}

/// Decodes one record. Only a JSON object is a form; serde would otherwise
/// accept a positional array and fill the gaps with defaults.
fn decode(key: &str, record: &str) -> FormforgeResult<FormDefinition> {
    let malformed = |reason: String| FormforgeError::MalformedRecord {
        key: key.to_string(),
        reason,
    };
    let value: serde_json::Value = serde_json::from_str(record).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("record is not a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
}
