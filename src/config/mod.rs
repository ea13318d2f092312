//! Configuration module for folder-monitor
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (FOLDER_MONITOR_*)
//! 3. Explicit config file (`--config`)
//! 4. User config (~/.config/folder-monitor/config.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use loader::{apply_env, load_or_default, load_with_warnings, with_env_overrides, ConfigWarning};
pub use types::{Config, OutputConfig, WatchConfig};
