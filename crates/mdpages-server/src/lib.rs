//! HTTP server for mdpages.
//!
//! Serves rendered pages through an axum router:
//! - a catch-all fallback resolving request paths to content pages
//! - `/api/views/{name}` for rendering named views with a JSON model
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use mdpages_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source_dir: PathBuf::from("site"),
//!         ..Default::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (mdpages-server)
//!                        │
//!                        ├─► /api/views/{name} ──► PageEngine::render_view
//!                        │
//!                        └─► fallback ──► PageEngine::catch_all
//!                                           ├─► Page     → render (ETag, 304)
//!                                           ├─► Redirect → 301
//!                                           └─► NotFound → 404
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mdpages_engine::{EngineConfig, PageEngine};
use mdpages_storage::FsStorage;

pub use app::create_router;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Site source directory.
    pub source_dir: PathBuf,
    /// Engine configuration.
    pub engine: EngineConfig,
    /// Log every rendered request.
    pub verbose: bool,
    /// Application version (part of every `ETag`).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            source_dir: PathBuf::from("site"),
            engine: EngineConfig::default(),
            verbose: false,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// Registers every page under `source_dir`, then serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if registration fails or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Arc::new(FsStorage::new(config.source_dir.clone()));
    let engine = Arc::new(PageEngine::new(storage, config.engine.clone()));
    let report = engine.register_pages()?;
    tracing::info!(
        source_dir = %config.source_dir.display(),
        pages = report.pages,
        templates = report.templates,
        hot_reload = config.engine.hot_reload,
        "Site loaded"
    );

    let app = create_router(engine, config.version.clone(), config.verbose);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdpages config.
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `version` - Application version
/// * `verbose` - Enable verbose output
#[must_use]
pub fn server_config_from_config(
    config: &mdpages_config::Config,
    version: String,
    verbose: bool,
) -> ServerConfig {
    let pages = &config.pages;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: pages.source_dir.clone(),
        engine: EngineConfig {
            hot_reload: pages.hot_reload,
            default_page: pages.default_page.clone(),
            default_template: pages.default_template.clone(),
            layout_name: pages.layout_name.clone(),
            markdown_ext: pages.markdown_ext.clone(),
            template_ext: pages.template_ext.clone(),
            views_dir: pages.views_dir.clone(),
            shared_dirs: pages.shared_dirs.clone(),
            exclude_prefixes: pages.exclude_prefixes.clone(),
            replace_tokens: config
                .replace_tokens
                .iter()
                .map(|(token, replacement)| (token.clone(), replacement.clone()))
                .collect(),
        },
        verbose,
        version,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let mut config = mdpages_config::Config::default();
        config.server.port = 9000;
        config.pages.hot_reload = true;
        config.pages.markdown_ext = "markdown".to_owned();
        config
            .replace_tokens
            .insert("~/".to_owned(), "/docs/".to_owned());

        let server = server_config_from_config(&config, "1.2.3".to_owned(), true);

        assert_eq!(server.port, 9000);
        assert_eq!(server.version, "1.2.3");
        assert!(server.verbose);
        assert!(server.engine.hot_reload);
        assert_eq!(server.engine.markdown_ext, "markdown");
        assert_eq!(
            server.engine.replace_tokens,
            vec![("~/".to_owned(), "/docs/".to_owned())]
        );
    }
}
