//! folder-monitor CLI
//!
//! Usage: folder-monitor [OPTIONS] [+r|-r] [+v|-v] <PATH>...
//!
//! Each path is watched on its own thread. `+r`/`-r` switch recursive
//! watching on or off and `+v`/`-v` switch verbose logging, for the paths
//! listed after them.

mod cli;
mod commands;

use std::process;

use anyhow::Result;
use clap::Parser;
use folder_monitor::config;
use folder_monitor::ExtensionSet;
use tracing::warn;

use crate::cli::{parse_targets, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, warnings) = config::load_or_default(cli.config.as_deref())?;
    if cli.json {
        config.output.json = true;
    }
    if let Some(exts) = &cli.property_ext {
        config.watch.property_extensions = ExtensionSet::parse(exts);
    }

    // Logs go to stderr; stdout carries NDJSON records.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .init();

    for warning in &warnings {
        let location = warning
            .line
            .map(|line| format!("{}:{line}", warning.file.display()))
            .unwrap_or_else(|| warning.file.display().to_string());
        match &warning.suggestion {
            Some(suggestion) => warn!(
                "Unknown config key '{}' in {location}, did you mean '{suggestion}'?",
                warning.key
            ),
            None => warn!("Unknown config key '{}' in {location}", warning.key),
        }
    }

    let targets = match parse_targets(&cli.args, config.watch.recursive, config.watch.verbose) {
        Ok(targets) => targets,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let code = commands::watch::cmd_watch(targets, &config)?;
    process::exit(code);
}
