//! Field kinds and field definitions.
//!
//! A [`FieldDefinition`] describes one control on a form: its kind, label,
//! whether it is required, and the optional attributes that only some kinds
//! use. The [`FieldKind`] enum is closed; every place that dispatches on it
//! does so with an exhaustive `match`.
//!
//! The serialized shape is the persisted record shape: camelCase keys, a
//! `type` tag carrying the kind's wire name, and absent optionals omitted.

use std::fmt;
use std::str::FromStr;

use formforge_core::FormforgeError;
use serde::{Deserialize, Deserializer, Serialize};

/// The closed set of form-control kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Single-line text.
    #[serde(rename = "text")]
    ShortText,
    /// Multi-line text.
    #[serde(rename = "textarea")]
    LongText,
    /// One value picked from `options`.
    #[serde(rename = "dropdown")]
    SingleChoice,
    /// A checkbox.
    #[serde(rename = "checkbox")]
    Boolean,
    /// A calendar date (`YYYY-MM-DD`).
    #[serde(rename = "date")]
    Date,
}

impl FieldKind {
    /// Every kind, in toolbox order.
    pub const ALL: [Self; 5] = [
        Self::ShortText,
        Self::LongText,
        Self::SingleChoice,
        Self::Boolean,
        Self::Date,
    ];

    /// The name used for this kind in persisted records.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::ShortText => "text",
            Self::LongText => "textarea",
            Self::SingleChoice => "dropdown",
            Self::Boolean => "checkbox",
            Self::Date => "date",
        }
    }

    /// The name shown for this kind in the builder toolbox.
    pub const fn toolbox_label(self) -> &'static str {
        match self {
            Self::ShortText => "Text Input",
            Self::LongText => "Text Area",
            Self::SingleChoice => "Dropdown",
            Self::Boolean => "Checkbox",
            Self::Date => "Date Picker",
        }
    }

    /// The label a freshly created field of this kind starts with, e.g. "New Text".
    pub fn default_label(self) -> String {
        let wire = self.wire_name();
        let mut chars = wire.chars();
        let capitalised: String = chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default();
        format!("New {capitalised}")
    }

    /// Returns `true` for the kinds that accept free text and length bounds.
    pub const fn is_text(self) -> bool {
        matches!(self, Self::ShortText | Self::LongText)
    }

    /// The attributes the settings panel offers for this kind, in display order.
    pub const fn settings(self) -> &'static [FieldAttribute] {
        use FieldAttribute::{
            HelpText, Label, MaxDate, MaxLength, MinDate, MinLength, Options, Pattern,
            Placeholder, Required,
        };
        match self {
            Self::ShortText => &[
                Label, Placeholder, HelpText, Required, MinLength, MaxLength, Pattern,
            ],
            Self::LongText => &[Label, Placeholder, HelpText, Required, MinLength, MaxLength],
            Self::SingleChoice => &[Label, HelpText, Required, Options],
            Self::Boolean => &[Label, HelpText, Required],
            Self::Date => &[Label, HelpText, Required, MinDate, MaxDate],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for FieldKind {
    type Err = FormforgeError;

    /// Accepts wire names (`text`, `dropdown`, ...) and the kind names
    /// (`short-text`, `single_choice`, `ShortText`, ...), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalised.as_str() {
            "text" | "shorttext" => Ok(Self::ShortText),
            "textarea" | "longtext" => Ok(Self::LongText),
            "dropdown" | "singlechoice" | "select" => Ok(Self::SingleChoice),
            "checkbox" | "boolean" | "bool" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            _ => Err(FormforgeError::BadRequest(format!("Unknown field kind '{s}'"))),
        }
    }
}

/// One configurable attribute in the field settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAttribute {
    Label,
    Placeholder,
    HelpText,
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Options,
    MinDate,
    MaxDate,
}

impl FieldAttribute {
    /// The caption shown next to the attribute's input.
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::Placeholder => "Placeholder",
            Self::HelpText => "Help Text",
            Self::Required => "Required field",
            Self::MinLength => "Min Length",
            Self::MaxLength => "Max Length",
            Self::Pattern => "Pattern (RegEx)",
            Self::Options => "Options",
            Self::MinDate => "Min Date",
            Self::MaxDate => "Max Date",
        }
    }
}

/// Complete definition of one form field.
///
/// Only `id`, `kind`, `label` and `required` apply to every kind; the rest are
/// meaningful for some kinds only (see [`FieldKind::settings`]). The data model
/// does not police that: setting `pattern` on a checkbox is representable and
/// simply never rendered.
///
/// The `id` is assigned at creation and has no setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    id: String,
    /// The field kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Display text.
    #[serde(default)]
    pub label: String,
    /// Whether an empty value is rejected.
    #[serde(default)]
    pub required: bool,
    /// Input placeholder (text kinds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text shown under the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Selectable values (`SingleChoice`).
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<String>,
    /// Minimum length in characters (text kinds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters (text kinds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the value must match (`ShortText`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Earliest allowed date, `YYYY-MM-DD` (`Date`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Latest allowed date, `YYYY-MM-DD` (`Date`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Seeds the control's value when a form is filled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FieldDefinition {
    /// Creates a field of the given kind with a fresh UUID and the kind's default label.
    pub fn new(kind: FieldKind) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), kind)
    }

    /// Creates a field with an explicit id and the kind's default label.
    pub fn with_id(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: kind.default_label(),
            required: false,
            placeholder: None,
            help_text: None,
            options: Vec::new(),
            min_length: None,
            max_length: None,
            pattern: None,
            min: None,
            max: None,
            default_value: None,
        }
    }

    /// The field's immutable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets whether this field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the placeholder.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Replaces the option list.
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the minimum length.
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Sets the pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the allowed date range. Either end may be omitted.
    #[must_use]
    pub fn date_range(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min = min.map(String::from);
        self.max = max.map(String::from);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Appends an empty option, as the settings panel's "+ Add Option" does.
    pub fn push_option(&mut self) {
        self.options.push(String::new());
    }

    /// Overwrites option `index`. Returns `false` if the index is out of range.
    pub fn set_option(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.options.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Removes option `index`, returning it if it existed.
    pub fn remove_option(&mut self, index: usize) -> Option<String> {
        (index < self.options.len()).then(|| self.options.remove(index))
    }

    /// The pattern, treating an empty string as unset.
    pub fn effective_pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }

    /// The settings-panel attributes for this field's kind.
    pub const fn settings(&self) -> &'static [FieldAttribute] {
        self.kind.settings()
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
