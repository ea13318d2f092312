//! folder-monitor - recursive folder watcher with property file tracking
//!
//! Watches one or more directory trees, reports every create, modify and
//! delete as a normalized event, and diffs key/value property files against
//! their last known contents.

pub mod config;
pub mod error;
pub mod properties;
pub mod tracking;
pub mod watcher;

// Re-exports for convenience
pub use config::Config;
pub use error::{WatchError, WatchResult};
pub use properties::{ExtensionSet, PropertyCache, PropertyDiff, PropertySnapshot};
pub use tracking::{EventRecord, TrackingHandler};
pub use watcher::{
    EventHandler, EventKind, FileVisitor, FolderWatcher, NormalizedEvent, StopReason, Stopper,
    WatchOptions,
};
