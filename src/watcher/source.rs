//! Seam between the dispatch loop and the OS notification backend

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::WatchResult;

use super::event::EventKind;

/// Opaque token for one directory subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(u64);

impl WatchHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry in a batch, relative to the batch's directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    Entry { kind: EventKind, name: PathBuf },
    /// Some notifications were dropped upstream
    Overflow,
}

impl RawEvent {
    pub fn entry(kind: EventKind, name: impl Into<PathBuf>) -> Self {
        RawEvent::Entry {
            kind,
            name: name.into(),
        }
    }
}

/// Events that arrived on a single handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    pub handle: WatchHandle,
    pub events: Vec<RawEvent>,
}

/// A source of directory change notifications
///
/// Mirrors a watch service: directories are registered one at a time and
/// events come back grouped by the handle they arrived on.
pub trait WatchSource {
    /// Subscribe to changes of the direct children of `dir`
    ///
    /// Watching a directory that is already watched returns its handle.
    fn watch(&mut self, dir: &Path) -> WatchResult<WatchHandle>;

    /// Block until the next batch is ready
    ///
    /// Returns `WatchError::Cancelled` once the source was asked to stop.
    fn next_batch(&mut self) -> WatchResult<EventBatch>;

    /// Re-arm `handle` after its batch was drained; `false` if it is gone
    fn reset(&mut self, handle: WatchHandle) -> bool;
}
