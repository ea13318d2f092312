//! Tests for the config module

use super::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tracing::Level;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(!config.watch.recursive);
    assert!(!config.watch.verbose);
    assert_eq!(config.watch.property_extensions.to_string(), ".properties;.conf");
    assert!(!config.output.json);
    assert_eq!(config.log_level(), Level::INFO);
}

#[test]
fn test_config_parse_toml() {
    let toml = r#"
[watch]
recursive = true
property_extensions = ".ini; .env"

[output]
json = true
log_level = "debug"
"#;

    let config: Config = toml::from_str(toml).unwrap();

    assert!(config.watch.recursive);
    assert!(!config.watch.verbose);
    let exts: Vec<&str> = config.watch.property_extensions.iter().collect();
    assert_eq!(exts, vec![".ini", ".env"]);
    assert!(config.output.json);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_config_partial_sections_keep_defaults() {
    let config: Config = toml::from_str("[watch]\nverbose = true\n").unwrap();

    assert!(config.watch.verbose);
    assert_eq!(config.watch.property_extensions.iter().count(), 2);
    assert_eq!(config.output, OutputConfig::default());
}

#[test]
fn test_load_with_warnings_reports_unknown_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[watch]\nrecursiv = true\n\n[output]\njson = true\n").unwrap();

    let (config, warnings) = load_with_warnings(&path).unwrap();

    assert!(config.output.json);
    assert!(!config.watch.recursive);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "recursiv");
    assert_eq!(warnings[0].line, Some(2));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("recursive"));
}

#[test]
fn test_load_rejects_invalid_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[watch\nrecursive = ").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, crate::error::WatchError::Config { .. }));
}

#[test]
fn test_load_or_default_requires_explicit_file() {
    assert!(load_or_default(Some(Path::new("/nonexistent/folder-monitor.toml"))).is_err());
}

#[test]
fn test_env_overrides() {
    let config = apply_env(
        Config::default(),
        env(&[
            ("FOLDER_MONITOR_PROPERTY_EXT", ".yaml;;.yml"),
            ("FOLDER_MONITOR_RECURSIVE", "1"),
            ("FOLDER_MONITOR_VERBOSE", "false"),
            ("FOLDER_MONITOR_LOG", " TRACE "),
        ]),
    );

    let exts: Vec<&str> = config.watch.property_extensions.iter().collect();
    assert_eq!(exts, vec![".yaml", ".yml"]);
    assert!(config.watch.recursive);
    assert!(!config.watch.verbose);
    assert_eq!(config.log_level(), Level::TRACE);
}

#[test]
fn test_env_overrides_leave_unset_values() {
    let mut base = Config::default();
    base.watch.verbose = true;

    let config = apply_env(base.clone(), env(&[]));
    assert_eq!(config, base);
}

#[test]
fn test_unknown_log_level_falls_back_to_info() {
    let config = apply_env(Config::default(), env(&[("FOLDER_MONITOR_LOG", "loud")]));
    assert_eq!(config.log_level(), Level::INFO);
}

#[test]
fn test_watch_options_from_config() {
    let mut config = Config::default();
    config.watch.recursive = true;

    let options = config.watch_options();
    assert!(options.recursive);
    assert!(!options.verbose);
    assert!(options.extensions.matches(Path::new("a/app.conf")));
}
