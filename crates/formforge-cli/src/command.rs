//! The command table behind the `formforge` binary.
//!
//! A [`ManagementCommand`] describes one subcommand: its name, its clap
//! arguments and an async handler that receives the loaded [`Settings`].
//! [`CommandRegistry`] keeps commands ordered by name, turns them into one
//! clap tree, and routes parsed arguments to the right handler.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use formforge_cli::command::{CommandRegistry, ManagementCommand};
//! use formforge_core::{FormforgeError, Settings};
//!
//! struct CountCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for CountCommand {
//!     fn name(&self) -> &'static str { "count" }
//!     fn help(&self) -> &'static str { "Count saved forms" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         settings: &Settings,
//!     ) -> Result<(), FormforgeError> {
//!         let store = formforge_store::FormStore::from_settings(settings)?;
//!         println!("{}", store.list()?.len());
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<(), FormforgeError> {
//! let mut registry = CommandRegistry::with_builtin_commands();
//! registry.register(Box::new(CountCommand));
//! registry.run(["formforge", "count"], &Settings::default()).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;

use async_trait::async_trait;
use formforge_core::{FormforgeError, FormforgeResult, Settings};

/// One `formforge` subcommand.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// The subcommand name typed on the command line.
    fn name(&self) -> &'static str;

    /// One line shown in `formforge --help`.
    fn help(&self) -> &'static str;

    /// Declares the subcommand's arguments. No arguments by default.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// The complete clap subcommand.
    fn subcommand(&self) -> clap::Command {
        self.add_arguments(clap::Command::new(self.name()).about(self.help()))
    }

    /// Runs the command with its parsed arguments.
    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError>;
}

/// Commands keyed by name, in name order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in command.
    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        crate::commands::register_builtin_commands(&mut registry);
        registry
    }

    /// Adds a command. A command already registered under the same name is
    /// replaced and handed back.
    pub fn register(
        &mut self,
        command: Box<dyn ManagementCommand>,
    ) -> Option<Box<dyn ManagementCommand>> {
        self.commands.insert(command.name(), command)
    }

    /// Looks up a command by name.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// The top-level `formforge` command with one subcommand per entry.
    pub fn build_cli(&self) -> clap::Command {
        let root = clap::Command::new("formforge")
            .about("Build, inspect, fill and serve forms")
            .subcommand_required(true);
        self.commands
            .values()
            .fold(root, |root, cmd| root.subcommand(cmd.subcommand()))
    }

    /// Routes already-parsed arguments to the chosen command.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormforgeResult<()> {
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(FormforgeError::BadRequest("No subcommand specified".to_string()));
        };
        let cmd = self
            .get(name)
            .ok_or_else(|| FormforgeError::BadRequest(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "Running management command");
        cmd.handle(sub_matches, settings).await
    }

    /// Parses `args` (program name first) and runs the command.
    ///
    /// Usage errors become [`FormforgeError::BadRequest`] carrying clap's
    /// rendered message.
    pub async fn run<I, T>(&self, args: I, settings: &Settings) -> FormforgeResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .build_cli()
            .try_get_matches_from(args)
            .map_err(|e| FormforgeError::BadRequest(e.render().to_string()))?;
        self.execute(&matches, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeyCommand {
        name: &'static str,
    }

    #[async_trait]
    impl ManagementCommand for KeyCommand {
        fn name(&self) -> &'static str {
            self.name
        }

        fn help(&self) -> &'static str {
            "Accept form keys only"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(clap::Arg::new("key").required(true))
        }

        async fn handle(
            &self,
            matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), FormforgeError> {
            let key = matches.get_one::<String>("key").map_or("", String::as_str);
            if key.starts_with("form_") {
                Ok(())
            } else {
                Err(FormforgeError::NotFound(key.to_string()))
            }
        }
    }

    fn registry(names: &[&'static str]) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        for &name in names {
            registry.register(Box::new(KeyCommand { name }));
        }
        registry
    }

    #[test]
    fn test_register_orders_by_name_and_returns_replaced() {
        let mut registry = registry(&["show", "delete"]);
        let replaced = registry.register(Box::new(KeyCommand { name: "show" }));
        assert_eq!(replaced.map(|c| c.name()), Some("show"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["delete", "show"]);
        assert!(registry.get("list").is_none());
        assert_eq!(registry.get("show").map(|c| c.help()), Some("Accept form keys only"));
    }

    #[test]
    fn test_build_cli_lists_subcommands_with_arguments() {
        let cli = registry(&["show", "delete"]).build_cli();
        let names: Vec<_> = cli.get_subcommands().map(|s| s.get_name().to_string()).collect();
        assert_eq!(names, vec!["delete", "show"]);
        assert!(cli.clone().try_get_matches_from(["formforge", "show"]).is_err());
        assert!(cli.clone().try_get_matches_from(["formforge"]).is_err());
        assert!(cli.try_get_matches_from(["formforge", "show", "form_1"]).is_ok());
    }

    #[test]
    fn test_builtin_registry() {
        let registry = CommandRegistry::with_builtin_commands();
        assert!(registry.get("runserver").is_some());
        assert!(registry.get("fill").is_some());
    }

    #[tokio::test]
    async fn test_run_dispatches_and_propagates_errors() {
        let registry = registry(&["show"]);
        let settings = Settings::default();

        registry.run(["formforge", "show", "form_1"], &settings).await.unwrap();

        let err = registry.run(["formforge", "show", "other"], &settings).await.unwrap_err();
        assert!(matches!(err, FormforgeError::NotFound(_)));

        let err = registry.run(["formforge", "nope"], &settings).await.unwrap_err();
        assert!(matches!(err, FormforgeError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_execute_without_subcommand_is_bad_request() {
        let registry = registry(&["show"]);
        let matches = clap::Command::new("formforge").try_get_matches_from(["formforge"]).unwrap();
        let err = registry.execute(&matches, &Settings::default()).await.unwrap_err();
        assert!(matches!(err, FormforgeError::BadRequest(_)));
    }
}
