//! The `runserver` management command.
//!
//! Serves the shared fill pages, previews and the saved-forms list.

use async_trait::async_trait;
use formforge_core::{FormforgeError, Settings};
use formforge_views::FormforgeApp;

use super::open_store;
use crate::command::ManagementCommand;

/// Starts the HTTP server.
///
/// The address defaults to `server.host` and `server.port` from the settings
/// and can be overridden with `--host` and `--port`.
pub struct RunserverCommand;

/// Resolves the bind address from the arguments, falling back to the settings.
pub fn bind_addr(matches: &clap::ArgMatches, settings: &Settings) -> String {
    let host = matches
        .get_one::<String>("host")
        .map_or(settings.server.host.as_str(), String::as_str);
    let port = matches
        .get_one::<u16>("port")
        .copied()
        .unwrap_or(settings.server.port);
    format!("{host}:{port}")
}

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Start the HTTP server"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(clap::Arg::new("host").long("host").help("Host to bind to"))
            .arg(
                clap::Arg::new("port")
                    .long("port")
                    .value_parser(clap::value_parser!(u16))
                    .help("Port to bind to"),
            )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormforgeError> {
        let addr = bind_addr(matches, settings);
        let store = open_store(settings)?;
        tracing::info!(
            "Starting server at http://{addr}/ (debug={})",
            settings.debug
        );
        FormforgeApp::new(settings.clone(), store).run(&addr).await
    }
}
