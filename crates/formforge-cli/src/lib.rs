//! # formforge-cli
//!
//! The `formforge` management CLI.
//!
//! - **Command framework** - [`ManagementCommand`] and [`CommandRegistry`]
//! - **Built-in commands** - form and field editing, `fill`, `check`, `runserver`
//! - **Settings discovery** - [`load_settings`]
//!
//! ## Quick Start
//!
//! ```rust
//! use formforge_cli::command::CommandRegistry;
//!
//! let registry = CommandRegistry::with_builtin_commands();
//!
//! let names: Vec<_> = registry.names().collect();
//! assert!(names.contains(&"add-field"));
//! assert!(names.contains(&"runserver"));
//! ```

// unused_async: command handlers keep one async signature
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

use std::path::{Path, PathBuf};

use formforge_core::settings_loader;
use formforge_core::{FormforgeResult, Settings};

pub use command::{CommandRegistry, ManagementCommand};

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV: &str = "FORMFORGE_SETTINGS";

/// The settings file picked up from the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "formforge.toml";

/// Finds the settings file to use, if any.
///
/// `explicit` (from `FORMFORGE_SETTINGS`) wins; otherwise `formforge.toml`
/// inside `dir` is used when it exists.
pub fn settings_path(explicit: Option<&str>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let candidate = dir.join(DEFAULT_SETTINGS_FILE);
    candidate.is_file().then_some(candidate)
}

/// Loads settings from the discovered file (TOML or JSON) with environment
/// overrides, or from defaults plus the environment when there is no file.
pub fn load_settings(path: Option<&Path>) -> FormforgeResult<Settings> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading settings file");
            settings_loader::from_file_with_env(path)
        }
        None => Ok(settings_loader::from_env()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_path_prefers_explicit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_SETTINGS_FILE), "").unwrap();
        assert_eq!(
            settings_path(Some("/etc/ff.json"), dir.path()),
            Some(PathBuf::from("/etc/ff.json"))
        );
        assert_eq!(
            settings_path(None, dir.path()),
            Some(dir.path().join(DEFAULT_SETTINGS_FILE))
        );
    }

    #[test]
    fn test_settings_path_none_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(settings_path(None, dir.path()), None);
        assert_eq!(settings_path(Some(""), dir.path()), None);
    }

    #[test]
    fn test_load_settings_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formforge.toml");
        std::fs::write(&path, "key_prefix = \"survey_\"\n[server]\nport = 9001\n").unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.key_prefix, "survey_");
        assert_eq!(settings.server.port, 9001);
    }

    #[test]
    fn test_load_settings_missing_file_is_error() {
        assert!(load_settings(Some(Path::new("/nonexistent/formforge.toml"))).is_err());
    }
}
