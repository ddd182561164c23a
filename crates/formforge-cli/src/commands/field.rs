//! Field-editing commands: `add-field`, `configure`, `remove-field` and
//! `move-field`.
//!
//! These are the builder operations driven from the terminal. Each one loads
//! the form, applies the edit through [`BuilderSurface`], and saves it back.

use async_trait::async_trait;
use formforge_core::{FormforgeError, FormforgeResult, Settings};
use formforge_forms::{BuilderSurface, FieldAttribute, FieldDefinition, FieldKind, FieldValidator};
use formforge_store::FormStore;

use super::{open_existing, open_store, persist, required_arg};
use crate::command::ManagementCommand;

fn key_arg() -> clap::Arg {
    clap::Arg::new("key").required(true).help("Storage key of the form")
}

fn field_arg() -> clap::Arg {
    clap::Arg::new("field").required(true).help("Field id")
}

/// Adds a field of the given kind, appending or inserting at `--at`.
pub struct AddFieldCommand;

/// Adds a field to a stored form and returns the new field's id.
pub fn add_field(
    store: &FormStore,
    key: &str,
    kind: FieldKind,
    at: Option<usize>,
) -> FormforgeResult<String> {
    let mut surface = open_existing(store, key)?;
    let id = match at {
        Some(index) => surface.add_field_at(kind, index),
        None => surface.add_field(kind),
    }
    .id()
    .to_string();
    persist(store, &mut surface)?;
    Ok(id)
}

#[async_trait]
impl ManagementCommand for AddFieldCommand {
    fn name(&self) -> &'static str {
        "add-field"
    }

    fn help(&self) -> &'static str {
        "Add a field (text, textarea, dropdown, checkbox, date) and print its id"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(key_arg())
            .arg(clap::Arg::new("kind").required(true).help("Field kind"))
            .arg(
                clap::Arg::new("at")
                    .long("at")
                    .value_parser(clap::value_parser!(usize))
                    .help("Insert at this position instead of appending"),
            )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let kind: FieldKind = required_arg(matches, "kind")?.parse()?;
        let at = matches.get_one::<usize>("at").copied();
        let store = open_store(settings)?;
        println!("{}", add_field(&store, key, kind, at)?);
        Ok(())
    }
}

/// Attribute changes requested on the command line.
///
/// `None` leaves an attribute untouched. An empty string (or a zero length)
/// clears an optional attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldEdits {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub default_value: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl FieldEdits {
    /// Collects the edits from parsed `configure` arguments.
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        let text = |name: &str| matches.get_one::<String>(name).cloned();
        let required = if matches.get_flag("required") {
            Some(true)
        } else if matches.get_flag("optional") {
            Some(false)
        } else {
            None
        };
        Self {
            label: text("label"),
            placeholder: text("placeholder"),
            help_text: text("help-text"),
            required,
            options: matches
                .get_many::<String>("option")
                .map(|values| values.cloned().collect()),
            min_length: matches.get_one::<usize>("min-length").copied(),
            max_length: matches.get_one::<usize>("max-length").copied(),
            pattern: text("pattern"),
            min: text("min"),
            max: text("max"),
            default_value: text("default"),
        }
    }

    /// Returns `true` if nothing would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The settings-panel attributes these edits touch.
    pub fn attributes(&self) -> Vec<FieldAttribute> {
        [
            (self.label.is_some(), FieldAttribute::Label),
            (self.placeholder.is_some(), FieldAttribute::Placeholder),
            (self.help_text.is_some(), FieldAttribute::HelpText),
            (self.required.is_some(), FieldAttribute::Required),
            (self.options.is_some(), FieldAttribute::Options),
            (self.min_length.is_some(), FieldAttribute::MinLength),
            (self.max_length.is_some(), FieldAttribute::MaxLength),
            (self.pattern.is_some(), FieldAttribute::Pattern),
            (self.min.is_some(), FieldAttribute::MinDate),
            (self.max.is_some(), FieldAttribute::MaxDate),
        ]
        .into_iter()
        .filter_map(|(touched, attr)| touched.then_some(attr))
        .collect()
    }

    /// Rejects edits to attributes the field's kind does not offer.
    pub fn check_kind(&self, kind: FieldKind) -> FormforgeResult<()> {
        let offered = kind.settings();
        match self.attributes().into_iter().find(|a| !offered.contains(a)) {
            Some(attr) => Err(FormforgeError::BadRequest(format!(
                "{} fields have no '{}' setting",
                kind.toolbox_label(),
                attr.caption()
            ))),
            None => Ok(()),
        }
    }

    /// Applies the edits to a field.
    pub fn apply(self, field: &mut FieldDefinition) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(placeholder) = self.placeholder {
            field.placeholder = non_empty(placeholder);
        }
        if let Some(help) = self.help_text {
            field.help_text = non_empty(help);
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
        if let Some(min) = self.min_length {
            field.min_length = (min > 0).then_some(min);
        }
        if let Some(max) = self.max_length {
            field.max_length = (max > 0).then_some(max);
        }
        if let Some(pattern) = self.pattern {
            field.pattern = non_empty(pattern);
        }
        if let Some(min) = self.min {
            field.min = non_empty(min);
        }
        if let Some(max) = self.max {
            field.max = non_empty(max);
        }
        if let Some(default) = self.default_value {
            field.default_value = non_empty(default);
        }
    }
}

/// Sets attributes on one field.
pub struct ConfigureCommand;

/// Applies `edits` to a field of a stored form and returns the updated field.
pub fn configure_field(
    store: &FormStore,
    key: &str,
    field_id: &str,
    edits: FieldEdits,
) -> FormforgeResult<FieldDefinition> {
    let mut surface = open_existing(store, key)?;
    let kind = surface
        .form()
        .field(field_id)
        .map(|f| f.kind)
        .ok_or_else(|| FormforgeError::FieldNotFound(field_id.to_string()))?;
    edits.check_kind(kind)?;

    surface.select(Some(field_id));
    surface.update_field(field_id, |field| edits.apply(field))?;
    persist(store, &mut surface)?;
    selected(&surface, field_id)
}

fn selected(surface: &BuilderSurface, field_id: &str) -> FormforgeResult<FieldDefinition> {
    surface
        .selected_field()
        .cloned()
        .ok_or_else(|| FormforgeError::FieldNotFound(field_id.to_string()))
}

#[async_trait]
impl ManagementCommand for ConfigureCommand {
    fn name(&self) -> &'static str {
        "configure"
    }

    fn help(&self) -> &'static str {
        "Set a field's attributes (an empty value clears an optional attribute)"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        let text = |name: &'static str, help: &'static str| {
            clap::Arg::new(name).long(name).allow_hyphen_values(true).help(help)
        };
        let length = |name: &'static str, help: &'static str| {
            clap::Arg::new(name)
                .long(name)
                .value_parser(clap::value_parser!(usize))
                .help(help)
        };
        cmd.arg(key_arg())
            .arg(field_arg())
            .arg(text("label", "Label"))
            .arg(text("placeholder", "Placeholder (text kinds)"))
            .arg(text("help-text", "Help text"))
            .arg(
                clap::Arg::new("required")
                    .long("required")
                    .action(clap::ArgAction::SetTrue)
                    .conflicts_with("optional")
                    .help("Make the field required"),
            )
            .arg(
                clap::Arg::new("optional")
                    .long("optional")
                    .action(clap::ArgAction::SetTrue)
                    .help("Make the field optional"),
            )
            .arg(
                clap::Arg::new("option")
                    .long("option")
                    .action(clap::ArgAction::Append)
                    .help("Dropdown option; repeat to replace the whole list"),
            )
            .arg(length("min-length", "Minimum length (text kinds); 0 clears"))
            .arg(length("max-length", "Maximum length (text kinds); 0 clears"))
            .arg(text("pattern", "Regular expression (text input)"))
            .arg(text("min", "Earliest date, YYYY-MM-DD"))
            .arg(text("max", "Latest date, YYYY-MM-DD"))
            .arg(text("default", "Default value"))
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let field_id = required_arg(matches, "field")?;
        let edits = FieldEdits::from_matches(matches);
        if edits.is_empty() {
            return Err(FormforgeError::BadRequest(
                "Nothing to change; pass at least one attribute".to_string(),
            ));
        }

        let store = open_store(settings)?;
        let field = configure_field(&store, key, field_id, edits)?;
        for problem in FieldValidator::new(settings.validation.into()).check_configuration(&field) {
            tracing::warn!(field = field_id, code = %problem.code, "{}", problem.message);
        }
        println!("Updated {} ({})", field.label, field.id());
        Ok(())
    }
}

/// Removes a field.
pub struct RemoveFieldCommand;

/// Removes a field from a stored form and returns it.
pub fn remove_field(store: &FormStore, key: &str, field_id: &str) -> FormforgeResult<FieldDefinition> {
    let mut surface = open_existing(store, key)?;
    let removed = surface
        .delete_field(field_id)
        .ok_or_else(|| FormforgeError::FieldNotFound(field_id.to_string()))?;
    persist(store, &mut surface)?;
    Ok(removed)
}

#[async_trait]
impl ManagementCommand for RemoveFieldCommand {
    fn name(&self) -> &'static str {
        "remove-field"
    }

    fn help(&self) -> &'static str {
        "Remove a field"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(key_arg()).arg(field_arg())
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let field_id = required_arg(matches, "field")?;
        let store = open_store(settings)?;
        let removed = remove_field(&store, key, field_id)?;
        println!("Removed {} ({})", removed.label, removed.id());
        Ok(())
    }
}

/// Moves a field to another position.
pub struct MoveFieldCommand;

/// A position given either as a 0-based index or as a field id.
fn resolve_position(surface: &BuilderSurface, position: &str) -> FormforgeResult<usize> {
    if let Ok(index) = position.parse::<usize>() {
        return Ok(index);
    }
    surface
        .form()
        .position(position)
        .ok_or_else(|| FormforgeError::FieldNotFound(position.to_string()))
}

/// Moves the field at `from` to `to` in a stored form.
///
/// Both positions accept a 0-based index or a field id; moving by id onto
/// another id behaves like dropping one field onto the other.
pub fn move_field(store: &FormStore, key: &str, from: &str, to: &str) -> FormforgeResult<()> {
    let mut surface = open_existing(store, key)?;
    let from = resolve_position(&surface, from)?;
    let to = resolve_position(&surface, to)?;
    surface.reorder(from, to)?;
    persist(store, &mut surface)?;
    Ok(())
}

#[async_trait]
impl ManagementCommand for MoveFieldCommand {
    fn name(&self) -> &'static str {
        "move-field"
    }

    fn help(&self) -> &'static str {
        "Move a field; FROM and TO are 0-based positions or field ids"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(key_arg())
            .arg(clap::Arg::new("from").required(true).help("Current position or field id"))
            .arg(clap::Arg::new("to").required(true).help("Target position or field id"))
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let from = required_arg(matches, "from")?;
        let to = required_arg(matches, "to")?;
        let store = open_store(settings)?;
        move_field(&store, key, from, to)?;
        println!("Moved {from} to {to}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formforge_forms::FormDefinition;

    fn store_with_form() -> FormStore {
        let store = crate::commands::memory_store();
        let form = FormDefinition::new("Profile")
            .with_field(FieldDefinition::with_id("a", FieldKind::ShortText))
            .with_field(FieldDefinition::with_id("b", FieldKind::Boolean))
            .with_field(FieldDefinition::with_id("c", FieldKind::Date));
        store.save("form_p", &form).unwrap();
        store
    }

    fn ids(store: &FormStore) -> Vec<String> {
        store
            .load("form_p")
            .unwrap()
            .fields
            .iter()
            .map(|f| f.id().to_string())
            .collect()
    }

    #[test]
    fn test_add_field_appends_or_inserts() {
        let store = store_with_form();
        let id = add_field(&store, "form_p", FieldKind::LongText, None).unwrap();
        assert_eq!(ids(&store).last(), Some(&id));
        let id = add_field(&store, "form_p", FieldKind::SingleChoice, Some(0)).unwrap();
        assert_eq!(ids(&store).first(), Some(&id));
        let form = store.load("form_p").unwrap();
        assert_eq!(form.fields[0].label, "New Dropdown");
        assert_eq!(form.name, "Profile");
    }

    #[test]
    fn test_add_field_to_missing_form() {
        let store = store_with_form();
        assert!(matches!(
            add_field(&store, "form_missing", FieldKind::Date, None),
            Err(FormforgeError::NotFound(_))
        ));
    }

    #[test]
    fn test_configure_field() {
        let store = store_with_form();
        let edits = FieldEdits {
            label: Some("Nickname".into()),
            required: Some(true),
            min_length: Some(2),
            placeholder: Some(String::new()),
            ..FieldEdits::default()
        };
        let field = configure_field(&store, "form_p", "a", edits).unwrap();
        assert_eq!(field.label, "Nickname");
        assert!(field.required);
        assert_eq!(field.min_length, Some(2));
        assert_eq!(field.placeholder, None);
        assert_eq!(store.load("form_p").unwrap().fields[0], field);
    }

    #[test]
    fn test_configure_rejects_attributes_the_kind_lacks() {
        let store = store_with_form();
        let edits = FieldEdits {
            pattern: Some("x".into()),
            ..FieldEdits::default()
        };
        let err = configure_field(&store, "form_p", "b", edits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Checkbox fields have no 'Pattern (RegEx)' setting"
        );
    }

    #[test]
    fn test_configure_unknown_field() {
        let store = store_with_form();
        let edits = FieldEdits {
            label: Some("x".into()),
            ..FieldEdits::default()
        };
        assert!(matches!(
            configure_field(&store, "form_p", "zzz", edits),
            Err(FormforgeError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_edits_attributes_and_emptiness() {
        assert!(FieldEdits::default().is_empty());
        let edits = FieldEdits {
            min: Some("2024-01-01".into()),
            default_value: Some("2024-02-02".into()),
            ..FieldEdits::default()
        };
        assert!(!edits.is_empty());
        assert_eq!(edits.attributes(), vec![FieldAttribute::MinDate]);
        assert!(edits.check_kind(FieldKind::Date).is_ok());
    }

    #[test]
    fn test_remove_field() {
        let store = store_with_form();
        assert_eq!(remove_field(&store, "form_p", "b").unwrap().id(), "b");
        assert_eq!(ids(&store), vec!["a", "c"]);
        assert!(matches!(
            remove_field(&store, "form_p", "b"),
            Err(FormforgeError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_move_field_by_index_and_id() {
        let store = store_with_form();
        move_field(&store, "form_p", "0", "2").unwrap();
        assert_eq!(ids(&store), vec!["b", "c", "a"]);
        move_field(&store, "form_p", "a", "b").unwrap();
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert!(matches!(
            move_field(&store, "form_p", "0", "7"),
            Err(FormforgeError::IndexOutOfRange { index: 7, len: 3 })
        ));
    }
}
