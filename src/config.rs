//! # Configuration File
//!
//! `antsibull-tool` reads an optional YAML configuration file. It holds
//! logging preferences and defaults for subcommand options; flags given on
//! the command line always win.
//!
//! ```yaml
//! log_level: info
//! color: auto
//! run_local_collection:
//!   vcs: git
//!   template: true
//! ```
//!
//! ## Lookup
//!
//! 1. The path given with `--config-file` or in `ANTSIBULL_TOOL_CONFIG`. The
//!    file must exist.
//! 2. Otherwise `antsibull-tool/config.yaml` in the user configuration
//!    directory, if present.
//! 3. Otherwise built-in defaults.
//!
//! Unknown keys are rejected so typos do not go unnoticed.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::logging::{parse_level, ColorChoice};
use crate::vcs::VcsMode;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "ANTSIBULL_TOOL_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Log level name, validated by [`parse`].
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub color: Option<ColorChoice>,
    #[serde(default)]
    pub run_local_collection: RunLocalCollectionConfig,
}

/// Defaults for the `run-local-collection` subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunLocalCollectionConfig {
    #[serde(default)]
    pub vcs: Option<VcsMode>,
    #[serde(default)]
    pub template: Option<bool>,
}

impl AppConfig {
    /// The configured log level, if any.
    pub fn log_level(&self) -> Option<LevelFilter> {
        // Validated when parsed.
        self.log_level
            .as_deref()
            .and_then(|level| parse_level(level).ok())
    }
}

/// Parse configuration from YAML. `path` is used for error messages.
pub fn parse(content: &str, path: &Path) -> Result<AppConfig> {
    let config_error = |message: String| Error::Config {
        path: path.to_path_buf(),
        message,
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| config_error(e.to_string()))?;
    // An empty file or one holding only comments.
    if value.is_null() {
        return Ok(AppConfig::default());
    }

    let config: AppConfig =
        serde_yaml::from_value(value).map_err(|e| config_error(e.to_string()))?;
    if let Some(level) = &config.log_level {
        parse_level(level).map_err(config_error)?;
    }
    Ok(config)
}

/// Load configuration from a file.
pub fn from_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse(&content, path)
}

/// Location of the per-user configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("antsibull-tool").join("config.yaml"))
}

/// The configuration file [`load`] reads, if any.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.is_file()),
    }
}

/// Load the configuration, see the module documentation for the lookup order.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
    match resolve_path(explicit) {
        Some(path) => from_file(&path),
        None => Ok(AppConfig::default()),
    }
}
