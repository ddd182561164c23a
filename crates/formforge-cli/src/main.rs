//! The `formforge` binary.

use std::process::ExitCode;

use anyhow::Context;
use formforge_cli::{load_settings, settings_path, CommandRegistry, SETTINGS_ENV};
use formforge_core::logging::setup_logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    let explicit = std::env::var(SETTINGS_ENV).ok();
    let path = settings_path(explicit.as_deref(), &cwd);
    let settings = load_settings(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("failed to load settings from {}", path.display()),
        None => "failed to load settings from the environment".to_string(),
    })?;
    setup_logging(&settings);

    let registry = CommandRegistry::with_builtin_commands();
    let matches = registry.build_cli().get_matches();

    match registry.execute(&matches, &settings).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            tracing::debug!(error = %e, status = e.status_code(), "Command failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
