//! Settings loading from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with [`Settings::default`].
//! 2. Deep-merge a TOML or JSON file over the defaults.
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variables
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMFORGE_DEBUG` | `debug` |
//! | `FORMFORGE_LOG_LEVEL` | `log_level` |
//! | `FORMFORGE_KEY_PREFIX` | `key_prefix` |
//! | `FORMFORGE_STORAGE_BACKEND` | `storage.backend` |
//! | `FORMFORGE_STORAGE_DIR` | `storage.location` |
//! | `FORMFORGE_HOST` | `server.host` |
//! | `FORMFORGE_PORT` | `server.port` |
//! | `FORMFORGE_BASE_URL` | `server.base_url` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formforge_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("formforge.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::FormforgeError;
use crate::settings::Settings;

/// Loads settings from a TOML string. Keys absent from the TOML keep their defaults.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormforgeError> {
    let layer: serde_json::Value = toml::from_str(toml_str)
        .map_err(|e| FormforgeError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(layer, "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormforgeError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormforgeError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string. Keys absent from the JSON keep their defaults.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormforgeError> {
    let layer: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormforgeError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(layer, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormforgeError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies environment overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormforgeError> {
    let path = path.as_ref();
    let mut settings = if path.extension().is_some_and(|ext| ext == "json") {
        from_json_file(path)?
    } else {
        from_toml_file(path)?
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FORMFORGE_*` environment variable overrides to a settings struct.
///
/// Values that fail to parse (a non-numeric port, an unknown backend) are
/// ignored and the existing setting is kept.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMFORGE_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FORMFORGE_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMFORGE_KEY_PREFIX") {
        settings.key_prefix = val;
    }

    if let Ok(val) = std::env::var("FORMFORGE_STORAGE_BACKEND") {
        match val.parse() {
            Ok(kind) => settings.storage.backend = kind,
            Err(e) => tracing::warn!("Ignoring FORMFORGE_STORAGE_BACKEND: {e}"),
        }
    }

    if let Ok(val) = std::env::var("FORMFORGE_STORAGE_DIR") {
        settings.storage.location = PathBuf::from(val);
    }

    if let Ok(val) = std::env::var("FORMFORGE_HOST") {
        settings.server.host = val;
    }

    if let Ok(val) = std::env::var("FORMFORGE_PORT") {
        if let Ok(port) = val.parse::<u16>() {
            settings.server.port = port;
        }
    }

    if let Ok(val) = std::env::var("FORMFORGE_BASE_URL") {
        settings.server.base_url = val.trim_end_matches('/').to_string();
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, FormforgeError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormforgeError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(layer: serde_json::Value, format: &str) -> Result<Settings, FormforgeError> {
    let mut merged = serde_json::to_value(Settings::default()).map_err(|e| {
        FormforgeError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    overlay(&mut merged, layer);
    serde_json::from_value(merged).map_err(|e| {
        FormforgeError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Overlays `layer` onto `base`: objects merge key by key, any other value
/// replaces what was there.
fn overlay(base: &mut serde_json::Value, layer: serde_json::Value) {
    match (base, layer) {
        (serde_json::Value::Object(base), serde_json::Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}
