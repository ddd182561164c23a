//! Whole-form commands: `new`, `show`, `list`, `delete` and `share`.

use std::fmt::Write as _;

use async_trait::async_trait;
use formforge_core::{FormforgeError, FormforgeResult, Settings};
use formforge_forms::{FieldDefinition, FormDefinition, DEFAULT_FORM_NAME};
use formforge_store::{FormStore, StoredForm};
use formforge_views::share_url;

use super::{open_store, required_arg};
use crate::command::ManagementCommand;

fn key_arg() -> clap::Arg {
    clap::Arg::new("key").required(true).help("Storage key of the form")
}

/// Creates an empty form under a fresh key and prints the key.
pub struct NewCommand;

/// Saves an empty form named `name` and returns its key.
pub fn create_form(store: &FormStore, name: &str) -> FormforgeResult<String> {
    let mut surface = store.open_builder(None)?;
    store.save_builder(&mut surface, name)?;
    Ok(surface.key().to_string())
}

#[async_trait]
impl ManagementCommand for NewCommand {
    fn name(&self) -> &'static str {
        "new"
    }

    fn help(&self) -> &'static str {
        "Create an empty form and print its key"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("name")
                .long("name")
                .short('n')
                .default_value(DEFAULT_FORM_NAME)
                .help("Form name"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let name = matches
            .get_one::<String>("name")
            .map_or(DEFAULT_FORM_NAME, String::as_str);
        let store = open_store(settings)?;
        let key = create_form(&store, name)?;
        println!("{key}");
        Ok(())
    }
}

/// Prints a form's fields, or its raw record with `--json`.
pub struct ShowCommand;

fn describe_field(index: usize, field: &FieldDefinition) -> String {
    let mut line = format!("{index:>3}. [{}] {}", field.kind, field.label);
    if field.required {
        line.push_str(" *");
    }
    let _ = write!(line, "  (id: {})", field.id());

    let mut details = Vec::new();
    if let Some(placeholder) = field.placeholder.as_deref().filter(|s| !s.is_empty()) {
        details.push(format!("placeholder={placeholder:?}"));
    }
    if let Some(min) = field.min_length {
        details.push(format!("minLength={min}"));
    }
    if let Some(max) = field.max_length {
        details.push(format!("maxLength={max}"));
    }
    if let Some(pattern) = field.effective_pattern() {
        details.push(format!("pattern={pattern:?}"));
    }
    if !field.options.is_empty() {
        details.push(format!("options={:?}", field.options));
    }
    if let Some(min) = field.min.as_deref().filter(|s| !s.is_empty()) {
        details.push(format!("min={min}"));
    }
    if let Some(max) = field.max.as_deref().filter(|s| !s.is_empty()) {
        details.push(format!("max={max}"));
    }
    if let Some(default) = field.default_value.as_deref() {
        details.push(format!("default={default:?}"));
    }
    if let Some(help) = field.help_text.as_deref().filter(|s| !s.is_empty()) {
        details.push(format!("help={help:?}"));
    }
    if !details.is_empty() {
        let _ = write!(line, "\n       {}", details.join(" "));
    }
    line
}

/// Formats a form for the terminal.
pub fn describe_form(key: &str, form: &FormDefinition) -> String {
    let mut out = format!(
        "{}\n  key: {key}\n  last modified: {}\n",
        form.name,
        form.last_modified.to_rfc3339()
    );
    if form.fields.is_empty() {
        out.push_str("  (no fields)\n");
    }
    for (index, field) in form.fields.iter().enumerate() {
        out.push_str(&describe_field(index, field));
        out.push('\n');
    }
    out
}

#[async_trait]
impl ManagementCommand for ShowCommand {
    fn name(&self) -> &'static str {
        "show"
    }

    fn help(&self) -> &'static str {
        "Show a form's fields"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(key_arg()).arg(
            clap::Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the stored record as JSON"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let store = open_store(settings)?;
        let form = store.load(key)?;
        if matches.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&form)?);
        } else {
            print!("{}", describe_form(key, &form));
        }
        Ok(())
    }
}

/// Lists saved forms, newest first.
pub struct ListCommand;

/// Formats the saved-forms listing, one line per form.
pub fn describe_list(forms: &[StoredForm]) -> String {
    if forms.is_empty() {
        return "No forms found\n".to_string();
    }
    let mut out = String::new();
    for StoredForm { key, form } in forms {
        let count = form.fields.len();
        let _ = writeln!(
            out,
            "{key}  {}  {count} field{}  {}",
            form.name,
            if count == 1 { "" } else { "s" },
            form.last_modified.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out
}

#[async_trait]
impl ManagementCommand for ListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn help(&self) -> &'static str {
        "List saved forms, newest first"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let store = open_store(settings)?;
        print!("{}", describe_list(&store.list()?));
        Ok(())
    }
}

/// Deletes a form.
pub struct DeleteCommand;

#[async_trait]
impl ManagementCommand for DeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn help(&self) -> &'static str {
        "Delete a form"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(key_arg())
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let store = open_store(settings)?;
        if store.delete(key)? {
            println!("Form deleted successfully");
        } else {
            println!("No form stored under {key}");
        }
        Ok(())
    }
}

/// Prints the shareable link of a form.
pub struct ShareCommand;

/// Returns the share link for a stored form. A missing key is an error.
pub fn share_link(store: &FormStore, settings: &Settings, key: &str) -> FormforgeResult<String> {
    if !store.exists(key)? {
        return Err(FormforgeError::NotFound(key.to_string()));
    }
    Ok(share_url(&settings.server.base_url, key))
}

#[async_trait]
impl ManagementCommand for ShareCommand {
    fn name(&self) -> &'static str {
        "share"
    }

    fn help(&self) -> &'static str {
        "Print a form's shareable link"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(key_arg())
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let store = open_store(settings)?;
        println!("{}", share_link(&store, settings, key)?);
        Ok(())
    }
}
