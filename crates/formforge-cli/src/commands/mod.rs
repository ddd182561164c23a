//! Built-in management commands.
//!
//! Each command implements [`ManagementCommand`](crate::command::ManagementCommand)
//! and opens the store configured in the settings on every run. Commands that
//! edit a form load it into a builder session, apply the change, and save it
//! back under the same key and name.

pub mod check;
pub mod field;
pub mod fill;
pub mod form;
pub mod runserver;

pub use check::CheckCommand;
pub use field::{AddFieldCommand, ConfigureCommand, MoveFieldCommand, RemoveFieldCommand};
pub use fill::FillCommand;
pub use form::{DeleteCommand, ListCommand, NewCommand, ShareCommand, ShowCommand};
pub use runserver::RunserverCommand;

use formforge_core::{FormforgeError, FormforgeResult, Settings, StorageBackendKind};
use formforge_forms::{BuilderSurface, FormDefinition};
use formforge_store::FormStore;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(NewCommand));
    registry.register(Box::new(ShowCommand));
    registry.register(Box::new(ListCommand));
    registry.register(Box::new(DeleteCommand));
    registry.register(Box::new(ShareCommand));
    registry.register(Box::new(AddFieldCommand));
    registry.register(Box::new(ConfigureCommand));
    registry.register(Box::new(RemoveFieldCommand));
    registry.register(Box::new(MoveFieldCommand));
    registry.register(Box::new(FillCommand));
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(RunserverCommand));
}

/// Opens the configured store, warning when it will not outlive the command.
pub(crate) fn open_store(settings: &Settings) -> FormforgeResult<FormStore> {
    if settings.storage.backend == StorageBackendKind::Memory {
        tracing::warn!("storage.backend is \"memory\"; changes are lost when the command exits");
    }
    FormStore::from_settings(settings)
}

/// Loads a stored form into a builder session. A missing key is an error.
pub(crate) fn open_existing(store: &FormStore, key: &str) -> FormforgeResult<BuilderSurface> {
    let surface = store.open_builder(Some(key))?;
    if surface.is_editing_existing() {
        Ok(surface)
    } else {
        Err(FormforgeError::NotFound(key.to_string()))
    }
}

/// Saves a builder session back under its key, keeping its current name.
pub(crate) fn persist(store: &FormStore, surface: &mut BuilderSurface) -> FormforgeResult<FormDefinition> {
    let name = surface.name().to_string();
    store.save_builder(surface, &name)
}

/// A store over a fresh in-memory backend.
#[cfg(test)]
pub(crate) fn memory_store() -> FormStore {
    FormStore::new(std::sync::Arc::new(formforge_store::InMemoryStore::new()))
}

/// Reads a required positional string argument.
pub(crate) fn required_arg<'a>(matches: &'a clap::ArgMatches, name: &str) -> FormforgeResult<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| FormforgeError::BadRequest(format!("Missing argument <{name}>")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtin_commands() {
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![
                "add-field",
                "check",
                "configure",
                "delete",
                "fill",
                "list",
                "move-field",
                "new",
                "remove-field",
                "runserver",
                "share",
                "show",
            ]
        );
    }

    #[test]
    fn test_open_existing_rejects_missing_key() {
        let store = memory_store();
        assert!(matches!(
            open_existing(&store, "form_nope"),
            Err(FormforgeError::NotFound(_))
        ));
        store.save("form_yes", &FormDefinition::new("Yes")).unwrap();
        assert!(open_existing(&store, "form_yes").unwrap().is_editing_existing());
    }

    #[test]
    fn test_persist_record_with_blank_name() {
        use formforge_forms::FieldKind;
        use formforge_store::KeyValueStore;

        let store = memory_store();
        store
            .backend()
            .set("form_blank", r#"{"name":" \t ","fields":[]}"#)
            .unwrap();
        let mut surface = open_existing(&store, "form_blank").unwrap();
        surface.add_field(FieldKind::Date);
        let saved = persist(&store, &mut surface).unwrap();
        assert_eq!(saved.name, "Untitled Form");
        assert_eq!(store.load("form_blank").unwrap().fields.len(), 1);
    }
}
