//! Directory tree walk that registers watches and seeds the property cache

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::WatchResult;
use crate::properties::PropertyCache;

use super::event::FileVisitor;
use super::registry::{Registration, WatchRegistry};
use super::source::WatchSource;

/// Borrowed watcher state a scan works on
///
/// The same routine serves the initial scan of a root and the incremental
/// scan of a directory created while watching.
pub struct TreeScanner<'a, S: WatchSource + ?Sized> {
    pub source: &'a mut S,
    pub registry: &'a mut WatchRegistry,
    pub cache: &'a mut PropertyCache,
    pub visitor: Option<&'a mut dyn FileVisitor>,
    pub verbose: bool,
}

impl<S: WatchSource + ?Sized> TreeScanner<'_, S> {
    /// Register `start` and, when `recursive`, every directory below it
    ///
    /// Walks depth-first with an explicit stack, children in name order,
    /// without following symlinks. Regular files are handed to the visitor
    /// and recognized property files are loaded into the cache. Returns the
    /// number of directories registered.
    ///
    /// Failing to watch `start` is an error; failures below it are logged
    /// and the subtree is skipped.
    pub fn scan(&mut self, start: &Path, recursive: bool) -> WatchResult<usize> {
        let mut pending: Vec<PathBuf> = vec![start.to_path_buf()];
        let mut registered = 0;
        let mut first = true;

        while let Some(dir) = pending.pop() {
            match self.register(&dir) {
                Ok(()) => registered += 1,
                Err(e) if first => return Err(e),
                Err(e) => {
                    warn!("Unable to watch: {}: {e}", dir.display());
                    continue;
                }
            }
            first = false;

            let entries = match sorted_entries(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Unable to list: {}: {e}", dir.display());
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            for entry in entries {
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                let path = entry.path();
                if file_type.is_dir() {
                    if recursive {
                        subdirs.push(path);
                    }
                } else if file_type.is_file() {
                    if let Ok(metadata) = entry.metadata() {
                        self.visit_file(&path, &metadata);
                    }
                }
            }
            // Reversed so the stack pops children in name order.
            pending.extend(subdirs.into_iter().rev());
        }

        Ok(registered)
    }

    fn register(&mut self, dir: &Path) -> WatchResult<()> {
        let (handle, outcome) = self.registry.register(&mut *self.source, dir)?;
        match outcome {
            Registration::New if self.verbose => info!("watch path: {}", dir.display()),
            Registration::Moved { previous } if self.verbose => {
                info!("update path: {} -> {}", previous.display(), dir.display())
            }
            Registration::Replaced { stale } => {
                debug!("replaced stale handle {stale} with {handle} for {}", dir.display())
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_file(&mut self, path: &Path, metadata: &fs::Metadata) {
        if let Some(visitor) = self.visitor.as_deref_mut() {
            visitor.visit_file(path, metadata);
        }
        if !self.cache.is_recognized(path) {
            return;
        }
        match self.cache.load(path) {
            Ok(snapshot) => debug!(
                "Loaded properties: file={}, prop.count={}",
                path.display(),
                snapshot.len()
            ),
            Err(e) => warn!("Can't read: file={}: {e}", path.display()),
        }
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}
