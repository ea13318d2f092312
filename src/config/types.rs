//! Configuration types

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::WatchResult;
use crate::properties::ExtensionSet;
use crate::watcher::WatchOptions;

use super::loader::{self, ConfigWarning};

/// Defaults applied to every watched root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    /// Watch subdirectories too
    pub recursive: bool,
    /// Log every registration and event
    pub verbose: bool,
    /// Semicolon-delimited suffixes of tracked property files
    pub property_extensions: ExtensionSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit records as NDJSON on stdout
    pub json: bool,
    /// Maximum log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            log_level: "info".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub watch: WatchConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> WatchResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> WatchResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (FOLDER_MONITOR_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Log level, `info` when unset or unrecognized
    pub fn log_level(&self) -> Level {
        Level::from_str(self.output.log_level.trim()).unwrap_or(Level::INFO)
    }

    /// Watch options for a root, before per-root CLI flags
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            recursive: self.watch.recursive,
            verbose: self.watch.verbose,
            extensions: self.watch.property_extensions.clone(),
        }
    }
}
