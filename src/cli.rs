use std::path::PathBuf;

use clap::Parser;
use folder_monitor::{WatchError, WatchResult};

pub const USAGE: &str = "folder-monitor [OPTIONS] [+r|-r] [+v|-v] <PATH>...";

/// folder-monitor - watch folders and track property file changes
#[derive(Parser, Debug)]
#[command(name = "folder-monitor")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = USAGE)]
#[command(after_help = "Flags +r/-r (recursive on/off) and +v/-v (verbose on/off) \
apply to every path listed after them.")]
pub struct Cli {
    /// Emit NDJSON records on stdout
    #[arg(long)]
    pub json: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Semicolon-delimited property file suffixes
    #[arg(long, value_name = "LIST")]
    pub property_ext: Option<String>,

    /// Paths to watch, interleaved with +r/-r/+v/-v
    #[arg(
        value_name = "PATH",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

/// One root to watch with the flags in effect where it was listed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub recursive: bool,
    pub verbose: bool,
}

/// Split positional arguments into watch targets
///
/// Flags are order-sensitive: each one changes the setting for the paths
/// that follow it. At least one path is required.
pub fn parse_targets(args: &[String], recursive: bool, verbose: bool) -> WatchResult<Vec<WatchTarget>> {
    let mut recursive = recursive;
    let mut verbose = verbose;
    let mut targets = Vec::new();

    for arg in args {
        match arg.as_str() {
            "+r" => recursive = true,
            "-r" => recursive = false,
            "+v" => verbose = true,
            "-v" => verbose = false,
            path => targets.push(WatchTarget {
                path: PathBuf::from(path),
                recursive,
                verbose,
            }),
        }
    }

    if targets.is_empty() {
        return Err(WatchError::Usage(format!("Usage: {USAGE}")));
    }
    Ok(targets)
}
