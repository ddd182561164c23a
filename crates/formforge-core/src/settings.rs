//! Settings for formforge.
//!
//! [`Settings`] holds everything the store, the HTTP surface and the CLI need
//! to be configured. The defaults suit local use: forms saved as files under
//! `./formforge-data`, the `form_` key prefix, and only the four field checks.
//! The memory backend is for tests and for embedding.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which key-value backend holds saved forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Process-local map; contents vanish on exit.
    Memory,
    /// One JSON file per key inside [`StorageSettings::location`].
    File,
}

impl fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for StorageBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// The backend kind.
    pub backend: StorageBackendKind,
    /// Directory used by the file backend. Ignored by the memory backend.
    pub location: PathBuf,
    /// Optional byte quota for the memory backend, emulating a browser store limit.
    pub quota_bytes: Option<usize>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::File,
            location: PathBuf::from("formforge-data"),
            quota_bytes: None,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Public origin used when building shareable links.
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

/// Optional validation behaviour beyond the four field checks.
///
/// Both switches default to `false`: date bounds are declared but not
/// enforced, and inverted length bounds are accepted at configuration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Check `Date` values against the field's `min`/`max`.
    pub enforce_date_range: bool,
    /// Reject field updates that leave `minLength > maxLength`.
    pub reject_inverted_length_bounds: bool,
}

/// The complete set of formforge settings.
///
/// # Examples
///
/// ```
/// use formforge_core::settings::{Settings, StorageBackendKind};
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.key_prefix, "form_");
/// assert_eq!(settings.storage.backend, StorageBackendKind::File);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The tracing filter directive, e.g. "info" or "formforge_store=debug".
    pub log_level: String,
    /// Prefix that marks a storage key as a saved form.
    pub key_prefix: String,
    /// Storage backend configuration.
    pub storage: StorageSettings,
    /// HTTP server configuration.
    pub server: ServerSettings,
    /// Optional validation behaviour.
    pub validation: ValidationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            key_prefix: "form_".to_string(),
            storage: StorageSettings::default(),
            server: ServerSettings::default(),
            validation: ValidationSettings::default(),
        }
    }
}

impl Settings {
    /// Returns the `host:port` pair the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
