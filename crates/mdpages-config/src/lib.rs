//! Configuration management for mdpages.
//!
//! Parses `mdpages.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - every value of the `[replace_tokens]` table
//!
//! ## Example
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [pages]
//! source_dir = "site"
//! hot_reload = true
//! default_template = "_layout.html"
//!
//! [replace_tokens]
//! "~/" = "${SITE_URL:-/}"
//! ```

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override page source directory.
    pub source_dir: Option<PathBuf>,
    /// Override hot reload flag.
    pub hot_reload: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpages.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Page discovery and rendering configuration.
    pub pages: PagesConfig,
    /// Token substitutions applied to every loaded document before compiling.
    pub replace_tokens: BTreeMap<String, String>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Page discovery and rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Root directory of pages and templates.
    ///
    /// Relative paths are resolved against the config file's directory.
    pub source_dir: PathBuf,
    /// Reload edited pages and templates without a restart.
    pub hot_reload: bool,
    /// Page name used for directory indexes.
    pub default_page: String,
    /// Template applied to pages with no other template.
    pub default_template: Option<String>,
    /// Name of the per-directory convention template (without extension).
    pub layout_name: String,
    /// Page file extension (without dot).
    pub markdown_ext: String,
    /// Template file extension (without dot).
    pub template_ext: String,
    /// Directory whose pages are views.
    pub views_dir: String,
    /// Directories whose pages are shared views.
    ///
    /// The first entry also hosts shared templates.
    pub shared_dirs: Vec<String>,
    /// Path prefixes skipped during discovery.
    pub exclude_prefixes: Vec<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("site"),
            hot_reload: false,
            default_page: "index".to_owned(),
            default_template: Some("_layout.html".to_owned()),
            layout_name: "_layout".to_owned(),
            markdown_ext: "md".to_owned(),
            template_ext: "html".to_owned(),
            views_dir: "views".to_owned(),
            shared_dirs: vec!["views/shared".to_owned()],
            exclude_prefixes: vec![
                "target/".to_owned(),
                "bin/".to_owned(),
                "obj/".to_owned(),
                "node_modules/".to_owned(),
            ],
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require an extension field to be non-empty and written without a dot.
fn require_extension(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "{field} must not start with '.'"
        )));
    }
    Ok(())
}

impl CliSettings {
    /// Overwrite the fields of `config` that were given on the command line.
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        config.server.port = self.port.unwrap_or(config.server.port);
        if let Some(source_dir) = &self.source_dir {
            config.pages.source_dir.clone_from(source_dir);
        }
        config.pages.hot_reload = self.hot_reload.unwrap_or(config.pages.hot_reload);
    }
}

/// Nearest `mdpages.toml` in `start` or one of its ancestors.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

impl Config {
    /// Load the site configuration.
    ///
    /// An explicit `config_path` must exist. Without one, the nearest
    /// `mdpages.toml` in the working directory or its parents is used, and
    /// when there is none the defaults apply, with `source_dir` relative to
    /// the working directory. `cli_settings` win over every file value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit file, or a
    /// parse, expansion or validation error for a bad one.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_default();
        let file = match config_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(&cwd),
        };

        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default_with_base(&cwd),
        };
        if let Some(settings) = cli_settings {
            settings.apply(&mut config);
        }
        Ok(config)
    }

    /// Defaults with `source_dir` placed under `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            pages: PagesConfig {
                source_dir: base.join("site"),
                ..PagesConfig::default()
            },
            replace_tokens: BTreeMap::new(),
            config_path: None,
        }
    }

    /// Load one file; relative paths resolve against its directory.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(&std::fs::read_to_string(path)?)?;

        config.server.host = expand::expand_env(&config.server.host, "server.host")?;
        expand::expand_token_values(&mut config.replace_tokens, "replace_tokens")?;

        let base = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(base);
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_pages()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_pages(&self) -> Result<(), ConfigError> {
        let pages = &self.pages;
        require_non_empty(&pages.default_page, "pages.default_page")?;
        require_non_empty(&pages.layout_name, "pages.layout_name")?;
        require_extension(&pages.markdown_ext, "pages.markdown_ext")?;
        require_extension(&pages.template_ext, "pages.template_ext")?;

        if pages.markdown_ext == pages.template_ext {
            return Err(ConfigError::Validation(
                "pages.markdown_ext and pages.template_ext must differ".to_owned(),
            ));
        }

        if let Some(template) = &pages.default_template {
            require_non_empty(template, "pages.default_template")?;
        }

        if self.replace_tokens.keys().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "replace_tokens keys cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.pages.source_dir = config_dir.join(&self.pages.source_dir);
    }
}
