//! The builder surface: an in-memory editing session over one form.
//!
//! [`BuilderSurface`] owns the form being edited, the storage key it will be
//! saved under, and the current selection. Every operation is synchronous and
//! runs to completion. Drag-and-drop maps onto the same operations: dropping a
//! toolbox item is [`BuilderSurface::add_field_at`], and dropping one field on
//! another is [`BuilderSurface::move_field`].
//!
//! Persisting a session is the store's job; see `formforge_store::FormStore`.

use formforge_core::{FormforgeError, FormforgeResult};

use crate::field::{FieldAttribute, FieldDefinition, FieldKind};
use crate::form::FormDefinition;
use crate::validation::{inverted_length_bounds, FieldValidator, ValidationPolicy};

/// An editing session over one form definition.
#[derive(Debug, Clone)]
pub struct BuilderSurface {
    key: String,
    form: FormDefinition,
    selection: Option<String>,
    editing_existing: bool,
    validator: FieldValidator,
}

impl BuilderSurface {
    /// Starts an empty "Untitled Form" under a fresh `<prefix><uuid>` key.
    pub fn new(prefix: &str) -> Self {
        Self::with_key(format!("{prefix}{}", uuid::Uuid::new_v4()))
    }

    /// Starts an empty form under the given key.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            form: FormDefinition::default(),
            selection: None,
            editing_existing: false,
            validator: FieldValidator::default(),
        }
    }

    /// Resumes editing a form that was loaded from storage.
    pub fn from_saved(key: impl Into<String>, form: FormDefinition) -> Self {
        Self {
            form,
            editing_existing: true,
            ..Self::with_key(key)
        }
    }

    /// Sets the validation policy used when fields are updated.
    #[must_use]
    pub const fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validator = FieldValidator::new(policy);
        self
    }

    /// The storage key this session saves under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The form as currently edited.
    pub const fn form(&self) -> &FormDefinition {
        &self.form
    }

    /// The fields in display order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.form.fields
    }

    /// The form's working name.
    pub fn name(&self) -> &str {
        &self.form.name
    }

    /// Changes the working name without saving.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    /// Returns `true` if this session was opened from a saved form.
    pub const fn is_editing_existing(&self) -> bool {
        self.editing_existing
    }

    /// The id of the selected field, if any.
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// The selected field, if any.
    pub fn selected_field(&self) -> Option<&FieldDefinition> {
        self.selection.as_deref().and_then(|id| self.form.field(id))
    }

    /// The selected field together with the settings panel its kind shows.
    pub fn selected_settings(&self) -> Option<(&FieldDefinition, &'static [FieldAttribute])> {
        self.selected_field().map(|f| (f, f.settings()))
    }

    /// Selects a field, or clears the selection with `None`.
    ///
    /// Selecting an id that is not in the form leaves the selection unchanged
    /// and returns `false`.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selection = None;
                true
            }
            Some(id) if self.form.position(id).is_some() => {
                self.selection = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    /// Appends a new field of `kind` and selects it.
    pub fn add_field(&mut self, kind: FieldKind) -> &FieldDefinition {
        let index = self.form.fields.len();
        self.add_field_at(kind, index)
    }

    /// Inserts a new field of `kind` at `index` and selects it.
    ///
    /// An index past the end appends.
    pub fn add_field_at(&mut self, kind: FieldKind, index: usize) -> &FieldDefinition {
        let field = FieldDefinition::new(kind);
        let index = index.min(self.form.fields.len());
        tracing::debug!(key = %self.key, field = field.id(), %kind, index, "Adding field");
        self.selection = Some(field.id().to_string());
        self.form.fields.insert(index, field);
        &self.form.fields[index]
    }

    /// Applies `edit` to the field with the given id.
    ///
    /// Returns `Ok(false)` when no such field exists. The id cannot be changed
    /// through this method. When the policy rejects inverted length bounds, an
    /// edit that leaves `minLength > maxLength` is rolled back and reported.
    pub fn update_field<F>(&mut self, id: &str, edit: F) -> FormforgeResult<bool>
    where
        F: FnOnce(&mut FieldDefinition),
    {
        let Some(index) = self.form.position(id) else {
            return Ok(false);
        };
        let mut updated = self.form.fields[index].clone();
        edit(&mut updated);
        updated.set_id(id.to_string());
        self.commit(index, updated)?;
        Ok(true)
    }

    /// Replaces the field that has the same id as `field`.
    ///
    /// Returns `Ok(false)` when no such field exists.
    pub fn replace_field(&mut self, field: FieldDefinition) -> FormforgeResult<bool> {
        let Some(index) = self.form.position(field.id()) else {
            return Ok(false);
        };
        self.commit(index, field)?;
        Ok(true)
    }

    fn commit(&mut self, index: usize, field: FieldDefinition) -> FormforgeResult<()> {
        if self.validator.policy().reject_inverted_length_bounds {
            if let Some(error) = inverted_length_bounds(&field) {
                return Err(FormforgeError::ValidationError(error));
            }
        }
        self.form.fields[index] = field;
        Ok(())
    }

    /// Removes the field with the given id, clearing the selection if it
    /// pointed at that field.
    pub fn delete_field(&mut self, id: &str) -> Option<FieldDefinition> {
        let index = self.form.position(id)?;
        if self.selection.as_deref() == Some(id) {
            self.selection = None;
        }
        tracing::debug!(key = %self.key, field = id, "Deleting field");
        Some(self.form.fields.remove(index))
    }

    /// Moves the field at `from` to position `to`, shifting the others.
    pub fn reorder(&mut self, from: usize, to: usize) -> FormforgeResult<()> {
        let len = self.form.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(FormforgeError::IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let field = self.form.fields.remove(from);
            self.form.fields.insert(to, field);
        }
        Ok(())
    }

    /// Moves the field `active_id` to the position currently held by `over_id`,
    /// as completing a drag of one field onto another does.
    pub fn move_field(&mut self, active_id: &str, over_id: &str) -> FormforgeResult<()> {
        let from = self
            .form
            .position(active_id)
            .ok_or_else(|| FormforgeError::FieldNotFound(active_id.to_string()))?;
        let to = self
            .form
            .position(over_id)
            .ok_or_else(|| FormforgeError::FieldNotFound(over_id.to_string()))?;
        self.reorder(from, to)
    }

    /// Moves a field one position up. Returns `false` if it is already first
    /// or does not exist.
    pub fn move_up(&mut self, id: &str) -> bool {
        match self.form.position(id) {
            Some(index) if index > 0 => self.reorder(index, index - 1).is_ok(),
            _ => false,
        }
    }

    /// Moves a field one position down. Returns `false` if it is already last
    /// or does not exist.
    pub fn move_down(&mut self, id: &str) -> bool {
        match self.form.position(id) {
            Some(index) if index + 1 < self.form.fields.len() => {
                self.reorder(index, index + 1).is_ok()
            }
            _ => false,
        }
    }

    /// Checks and applies the name chosen in the save dialog.
    ///
    /// The name is trimmed; a blank name is rejected with
    /// [`FormforgeError::EmptyFormName`]. Returns the definition to persist.
    pub fn prepare_save(&mut self, name: &str) -> FormforgeResult<&FormDefinition> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FormforgeError::EmptyFormName);
        }
        self.form.name = name.to_string();
        Ok(&self.form)
    }

    /// Records a successful save: adopts the stored timestamp and marks the
    /// session as editing an existing form.
    pub fn mark_saved(&mut self, saved: &FormDefinition) {
        self.form.last_modified = saved.last_modified;
        self.editing_existing = true;
    }
}
