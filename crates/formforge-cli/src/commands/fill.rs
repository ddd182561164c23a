//! The `fill` command: submit values to a stored form from the terminal.
//!
//! Values go through the same [`FillSession`] the web fill page uses, so
//! defaults, validation and messages are identical.

use std::fmt::Write as _;

use async_trait::async_trait;
use formforge_core::{FormforgeError, FormforgeResult, Settings};
use formforge_forms::{FieldKind, FieldValue, FillSession, FormDefinition, Submission};

use super::{open_store, required_arg};
use crate::command::ManagementCommand;

/// Fills and submits a form.
pub struct FillCommand;

/// Splits an `ID=VALUE` assignment.
pub fn parse_assignment(raw: &str) -> FormforgeResult<(&str, &str)> {
    raw.split_once('=')
        .filter(|(id, _)| !id.is_empty())
        .ok_or_else(|| FormforgeError::BadRequest(format!("Expected ID=VALUE, got '{raw}'")))
}

fn parse_bool(raw: &str) -> FormforgeResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" | "" => Ok(false),
        other => Err(FormforgeError::BadRequest(format!(
            "'{other}' is not a checkbox value"
        ))),
    }
}

/// Builds a session from `ID=VALUE` assignments and submits it.
///
/// Returns `Ok(Err(session))` when validation blocks the submission, so the
/// caller can report every field's error.
pub fn fill_form(
    form: &FormDefinition,
    assignments: &[(&str, &str)],
    settings: &Settings,
) -> FormforgeResult<Result<Submission, FillSession>> {
    let mut session = FillSession::new(form).with_policy(settings.validation.into());
    for &(id, raw) in assignments {
        let field = form
            .field(id)
            .ok_or_else(|| FormforgeError::FieldNotFound(id.to_string()))?;
        let value = match field.kind {
            FieldKind::Boolean => FieldValue::Bool(parse_bool(raw)?),
            FieldKind::ShortText | FieldKind::LongText | FieldKind::SingleChoice | FieldKind::Date => {
                FieldValue::from(raw)
            }
        };
        session.set_value(id, value);
    }
    Ok(session.submit(form).map_err(|_| session))
}

/// Formats the inline errors of a blocked submission, in field order.
pub fn describe_errors(form: &FormDefinition, session: &FillSession) -> String {
    let mut out = String::from("Please fix the errors in the form\n");
    for field in &form.fields {
        if let Some(message) = session.errors().message(field.id()) {
            let _ = writeln!(out, "  {} ({}): {message}", field.label, field.id());
        }
    }
    out
}

#[async_trait]
impl ManagementCommand for FillCommand {
    fn name(&self) -> &'static str {
        "fill"
    }

    fn help(&self) -> &'static str {
        "Fill in and submit a form"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(clap::Arg::new("key").required(true).help("Storage key of the form"))
            .arg(
                clap::Arg::new("value")
                    .long("value")
                    .short('v')
                    .action(clap::ArgAction::Append)
                    .help("A field value as ID=VALUE; repeat for each field"),
            )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let key = required_arg(matches, "key")?;
        let assignments = matches
            .get_many::<String>("value")
            .into_iter()
            .flatten()
            .map(|raw| parse_assignment(raw))
            .collect::<FormforgeResult<Vec<_>>>()?;

        let store = open_store(settings)?;
        let form = store.load(key)?;
        match fill_form(&form, &assignments, settings)? {
            Ok(submission) => {
                println!("Form submitted successfully!");
                println!("{}", serde_json::to_string_pretty(&submission.values)?);
                Ok(())
            }
            Err(session) => {
                print!("{}", describe_errors(&form, &session));
                Err(FormforgeError::BadRequest(format!(
                    "{} field(s) failed validation",
                    session.errors().len()
                )))
            }
        }
    }
}
