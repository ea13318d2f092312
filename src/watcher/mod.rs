//! Folder watcher
//!
//! Implements the per-root watch loop with:
//! - A registry of directory watch handles
//! - Explicit work-list tree scans, extended as directories appear
//! - Normalized create/modify/delete events for a pluggable handler
//! - Property diffs for recognized configuration files

mod dispatch;
mod event;
mod notify_source;
mod registry;
mod scanner;
mod source;

pub use dispatch::{FolderWatcher, LoopState, StopReason, WatchOptions};
pub use event::{EventHandler, EventKind, FileVisitor, NormalizedEvent};
pub use notify_source::{NotifySource, Stopper};
pub use registry::{Registration, WatchRegistry};
pub use scanner::TreeScanner;
pub use source::{EventBatch, RawEvent, WatchHandle, WatchSource};
