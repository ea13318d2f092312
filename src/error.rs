//! Error types for folder-monitor
//!
//! Library code returns `WatchResult`; the binary wraps it in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for watcher operations
pub type WatchResult<T> = Result<T, WatchError>;

/// Main error type for watcher operations
#[derive(Error, Debug)]
pub enum WatchError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The notification backend refused to watch a directory
    #[error("unable to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// A property file could not be read or parsed
    #[error("can't read properties from {file}: {message}")]
    PropertyLoad { file: PathBuf, message: String },

    /// Malformed `\uXXXX` escape in a property file
    #[error("malformed \\uxxxx encoding in {file}:{line}")]
    MalformedEscape { file: PathBuf, line: usize },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Invalid command line
    #[error("{0}")]
    Usage(String),

    /// Watch root is missing or is not a directory
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The watch source was asked to stop
    #[error("watch cancelled")]
    Cancelled,

    /// The notification backend went away
    #[error("watch source disconnected")]
    Disconnected,
}

impl WatchError {
    /// Wrap a read/parse failure for `file` as a property load error
    pub fn property_load(file: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        WatchError::PropertyLoad {
            file: file.into(),
            message: err.to_string(),
        }
    }
}
