//! Bidirectional map between watch handles and directory paths

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::WatchResult;

use super::source::{WatchHandle, WatchSource};

/// Outcome of binding a handle to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First time this path is watched
    New,
    /// Same handle, same path
    Unchanged,
    /// The path was already watched under another handle, now replaced
    Replaced { stale: WatchHandle },
    /// The handle used to point at another path (the directory moved)
    Moved { previous: PathBuf },
}

/// Handles issued by one watch source and the directories they watch
///
/// Each handle maps to exactly one path and each path to at most one
/// handle.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    by_handle: HashMap<WatchHandle, PathBuf>,
    by_path: HashMap<PathBuf, WatchHandle>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `path` on `source` and record the binding
    pub fn register<S: WatchSource + ?Sized>(
        &mut self,
        source: &mut S,
        path: &Path,
    ) -> WatchResult<(WatchHandle, Registration)> {
        let handle = source.watch(path)?;
        Ok((handle, self.bind(handle, path)))
    }

    /// Record that `handle` now watches `path`
    pub fn bind(&mut self, handle: WatchHandle, path: &Path) -> Registration {
        let previous = self.by_handle.insert(handle, path.to_path_buf());
        let stale = self.by_path.insert(path.to_path_buf(), handle);

        if let Some(prev) = previous.as_deref() {
            if prev != path && self.by_path.get(prev) == Some(&handle) {
                self.by_path.remove(prev);
            }
        }
        if let Some(stale) = stale.filter(|h| *h != handle) {
            self.by_handle.remove(&stale);
            return Registration::Replaced { stale };
        }

        match previous {
            None => Registration::New,
            Some(prev) if prev == path => Registration::Unchanged,
            Some(prev) => Registration::Moved { previous: prev },
        }
    }

    pub fn resolve(&self, handle: WatchHandle) -> Option<&Path> {
        self.by_handle.get(&handle).map(PathBuf::as_path)
    }

    pub fn handle_for(&self, path: &Path) -> Option<WatchHandle> {
        self.by_path.get(path).copied()
    }

    /// Drop the binding for `handle`, returning the path it watched
    pub fn invalidate(&mut self, handle: WatchHandle) -> Option<PathBuf> {
        let path = self.by_handle.remove(&handle)?;
        if self.by_path.get(&path) == Some(&handle) {
            self.by_path.remove(&path);
        }
        Some(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.by_handle.values().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}
