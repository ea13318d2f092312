//! Normalized watch events and handler capabilities

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::properties::PropertyDiff;

/// What happened to a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Modified,
    Deleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "ENTRY_CREATE",
            EventKind::Modified => "ENTRY_MODIFY",
            EventKind::Deleted => "ENTRY_DELETE",
        }
    }
}

/// A change resolved against the directory it was reported on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEvent {
    pub kind: EventKind,
    /// Absolute path of the entry that changed
    pub path: PathBuf,
    /// Watched directory the event arrived on
    pub root_folder: PathBuf,
}

impl NormalizedEvent {
    pub fn new(kind: EventKind, root_folder: &Path, name: &Path) -> Self {
        Self {
            kind,
            path: root_folder.join(name),
            root_folder: root_folder.to_path_buf(),
        }
    }
}

/// Receives every normalized event on the watcher's dispatch thread
///
/// `changes` carries the property diff when the event touched a tracked
/// property file whose contents changed since the last load. Implementations
/// must not block indefinitely.
pub trait EventHandler {
    fn handle_event(&mut self, event: &NormalizedEvent, changes: Option<&PropertyDiff>);
}

impl<F> EventHandler for F
where
    F: FnMut(&NormalizedEvent, Option<&PropertyDiff>),
{
    fn handle_event(&mut self, event: &NormalizedEvent, changes: Option<&PropertyDiff>) {
        self(event, changes)
    }
}

/// Sees every regular file found while scanning a directory tree
pub trait FileVisitor {
    fn visit_file(&mut self, path: &Path, metadata: &Metadata);
}

impl<F> FileVisitor for F
where
    F: FnMut(&Path, &Metadata),
{
    fn visit_file(&mut self, path: &Path, metadata: &Metadata) {
        self(path, metadata)
    }
}
