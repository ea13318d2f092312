//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WatchError, WatchResult};
use crate::properties::ExtensionSet;

use super::types::Config;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> WatchResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| WatchError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the explicit config file, else the user config, else defaults
///
/// An explicit file must exist and parse. A broken user config is reported
/// as an error too; a missing one is not.
pub fn load_or_default(explicit: Option<&Path>) -> WatchResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => match user_config_path().filter(|p| p.exists()) {
            Some(path) => load_with_warnings(&path)?,
            None => (Config::default(), Vec::new()),
        },
    };
    Ok((with_env_overrides(config), warnings))
}

/// Apply environment variable overrides (FOLDER_MONITOR_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_env(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`
pub fn apply_env(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    // FOLDER_MONITOR_PROPERTY_EXT (semicolon-separated)
    if let Some(exts) = lookup("FOLDER_MONITOR_PROPERTY_EXT") {
        config.watch.property_extensions = ExtensionSet::parse(&exts);
    }

    if let Some(val) = lookup("FOLDER_MONITOR_RECURSIVE") {
        config.watch.recursive = is_truthy(&val);
    }

    if let Some(val) = lookup("FOLDER_MONITOR_VERBOSE") {
        config.watch.verbose = is_truthy(&val);
    }

    // FOLDER_MONITOR_LOG
    if let Some(level) = lookup("FOLDER_MONITOR_LOG") {
        config.output.log_level = level.trim().to_lowercase();
    }

    config
}

fn is_truthy(val: &str) -> bool {
    let val = val.trim().to_lowercase();
    val != "false" && val != "0" && val != "no" && !val.is_empty()
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folder-monitor/config.toml"))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "watch",
        "recursive",
        "verbose",
        "property_extensions",
        "output",
        "json",
        "log_level",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
