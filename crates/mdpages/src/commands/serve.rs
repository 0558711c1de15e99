//! `mdpages serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdpages_config::{CliSettings, Config};
use mdpages_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdpages.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Reload pages and templates when their files change.
    #[arg(long)]
    hot_reload: bool,

    /// Disable hot reload.
    #[arg(long, conflicts_with = "hot_reload")]
    no_hot_reload: bool,

    /// Enable verbose output (log every rendered request).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
            hot_reload: resolve_flag(self.hot_reload, self.no_hot_reload),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.config_path, "Configuration loaded");

        if config.config_path.is_none() {
            output.warning("No mdpages.toml found, using defaults");
        }
        output.serving(&config.server.host, config.server.port);
        output.setting("Source directory", config.pages.source_dir.display());
        output.setting(
            "Hot reload",
            if config.pages.hot_reload { "enabled" } else { "disabled" },
        );
        if let Some(path) = &config.pages.default_template {
            output.setting("Default template", path);
        }

        let server_config = server_config_from_config(&config, version.to_owned(), self.verbose);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Resolve an on/off flag pair; `None` leaves the config value in place.
fn resolve_flag(on: bool, off: bool) -> Option<bool> {
    if off {
        Some(false)
    } else if on {
        Some(true)
    } else {
        None
    }
}
