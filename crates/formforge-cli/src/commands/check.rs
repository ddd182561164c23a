//! The `check` management command.
//!
//! Inspects the settings and every stored form for problems: unreadable
//! records, duplicate field ids, dropdowns without options, and field
//! configurations the validator flags.

use std::fmt;

use async_trait::async_trait;
use formforge_core::{FormforgeError, Settings, StorageBackendKind};
use formforge_forms::{FieldKind, FieldValidator};
use formforge_store::{FormStore, KeyValueStore};

use super::open_store;
use crate::command::ManagementCommand;

/// Runs checks on the settings and the stored forms.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level of this check result.
    pub level: CheckLevel,
    /// A human-readable description of the issue.
    pub msg: String,
    /// An optional hint for how to resolve the issue.
    pub hint: Option<String>,
    /// A unique identifier for this check (e.g. "forms.E001").
    pub id: String,
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}) {}", self.level, self.id, self.msg)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        Ok(())
    }
}

fn message(level: CheckLevel, id: &str, msg: String, hint: Option<&str>) -> CheckMessage {
    CheckMessage {
        level,
        msg,
        hint: hint.map(str::to_string),
        id: id.to_string(),
    }
}

/// Checks the settings alone.
pub fn check_settings(settings: &Settings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    if settings.storage.backend == StorageBackendKind::Memory {
        messages.push(message(
            CheckLevel::Warning,
            "storage.W001",
            "The memory backend does not persist forms between runs".to_string(),
            Some("Remove storage.backend = \"memory\" to keep forms on disk"),
        ));
    }

    if settings.key_prefix.is_empty() {
        messages.push(message(
            CheckLevel::Error,
            "storage.E001",
            "key_prefix is empty, so every stored key is treated as a form".to_string(),
            Some("Use a prefix such as \"form_\""),
        ));
    }

    if settings.server.base_url.is_empty() {
        messages.push(message(
            CheckLevel::Warning,
            "server.W001",
            "server.base_url is empty; share links will be relative".to_string(),
            Some("Set server.base_url to the public address of the server"),
        ));
    }

    messages
}

/// Checks every record in the store.
pub fn check_forms(store: &FormStore, settings: &Settings) -> Result<Vec<CheckMessage>, FormforgeError> {
    let validator = FieldValidator::new(settings.validation.into());
    let mut messages = Vec::new();

    let mut keys: Vec<String> = store
        .backend()
        .keys()?
        .into_iter()
        .filter(|k| k.starts_with(store.prefix()))
        .collect();
    keys.sort();

    for key in keys {
        let form = match store.load(&key) {
            Ok(form) => form,
            Err(FormforgeError::NotFound(_)) => continue,
            Err(e) => {
                messages.push(message(
                    CheckLevel::Error,
                    "forms.E001",
                    format!("{key}: {e}"),
                    Some("Delete the record or restore it from a backup"),
                ));
                continue;
            }
        };

        for id in form.duplicate_ids() {
            messages.push(message(
                CheckLevel::Error,
                "forms.E002",
                format!("{key}: field id '{id}' is used more than once"),
                None,
            ));
        }

        for field in &form.fields {
            if field.kind == FieldKind::SingleChoice && field.options.is_empty() {
                messages.push(message(
                    CheckLevel::Warning,
                    "forms.W001",
                    format!("{key}: dropdown '{}' has no options", field.label),
                    Some("Add options with `configure KEY FIELD --option ...`"),
                ));
            }
            for problem in validator.check_configuration(field) {
                messages.push(message(
                    CheckLevel::Warning,
                    "forms.W002",
                    format!("{key}: field '{}': {}", field.label, problem.message),
                    None,
                ));
            }
        }
    }

    Ok(messages)
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the settings and every stored form for problems"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("fail-level")
                .long("fail-level")
                .value_parser(["warning", "error"])
                .default_value("error")
                .help("Exit with an error at or above this level"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let fail_level = match matches.get_one::<String>("fail-level").map(String::as_str) {
            Some("warning") => CheckLevel::Warning,
            _ => CheckLevel::Error,
        };

        let store = open_store(settings)?;
        let mut messages = check_settings(settings);
        messages.extend(check_forms(&store, settings)?);

        if messages.is_empty() {
            println!("System check identified no issues.");
            return Ok(());
        }

        for msg in &messages {
            println!("{msg}");
        }
        println!("System check identified {} issue(s).", messages.len());

        let failing = messages.iter().filter(|m| m.level >= fail_level).count();
        if failing > 0 {
            return Err(FormforgeError::BadRequest(format!(
                "System check found {failing} problem(s) at or above {fail_level}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use formforge_forms::{FieldDefinition, FormDefinition};
    use formforge_store::InMemoryStore;

    #[test]
    fn test_check_level_ordering_and_display() {
        assert!(CheckLevel::Info < CheckLevel::Warning);
        assert!(CheckLevel::Warning < CheckLevel::Error);
        assert_eq!(CheckLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_check_message_display() {
        let msg = message(CheckLevel::Warning, "x.W1", "Careful".into(), Some("Do this"));
        assert_eq!(msg.to_string(), "WARNING: (x.W1) Careful\n\tHINT: Do this");
    }

    #[test]
    fn test_check_settings() {
        assert!(check_settings(&Settings::default()).is_empty());

        let mut settings = Settings::default();
        settings.storage.backend = StorageBackendKind::Memory;
        let ids: Vec<_> = check_settings(&settings).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["storage.W001"]);

        let mut settings = Settings::default();
        settings.key_prefix = String::new();
        let ids: Vec<_> = check_settings(&settings).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["storage.E001"]);
    }

    #[test]
    fn test_check_forms() {
        let backend = InMemoryStore::new();
        let store = FormStore::new(Arc::new(backend.clone()));
        let form = FormDefinition::new("F")
            .with_field(FieldDefinition::with_id("a", FieldKind::SingleChoice))
            .with_field(FieldDefinition::with_id("a", FieldKind::ShortText).pattern("("))
            .with_field(FieldDefinition::with_id("b", FieldKind::LongText).min_length(9).max_length(2));
        store.save("form_1", &form).unwrap();
        store.save("form_ok", &FormDefinition::new("Fine")).unwrap();
        backend.set("form_broken", "nope").unwrap();
        backend.set("unrelated", "nope").unwrap();

        let ids: Vec<_> = check_forms(&store, &Settings::default())
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(
            ids,
            vec!["forms.E002", "forms.W001", "forms.W002", "forms.W002", "forms.E001"]
        );
    }
}
