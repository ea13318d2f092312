//! The per-root dispatch loop

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, trace, warn};

use crate::error::{WatchError, WatchResult};
use crate::properties::{ExtensionSet, PropertyCache, PropertyRefresh};

use super::event::{EventHandler, EventKind, FileVisitor, NormalizedEvent};
use super::notify_source::{NotifySource, Stopper};
use super::registry::WatchRegistry;
use super::scanner::TreeScanner;
use super::source::{EventBatch, RawEvent, WatchSource};

/// Per-root watch options
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Watch the whole subtree instead of the root only
    pub recursive: bool,
    /// Log every registration and every event
    pub verbose: bool,
    /// Suffixes of files whose key/value contents are tracked
    pub extensions: ExtensionSet,
}

/// Why a dispatch loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last watched directory went away
    RegistryEmpty,
    /// Stopped on request
    Cancelled,
    /// The watch source failed
    Failed(String),
}

/// Dispatch loop state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Source open, nothing pending
    Idle,
    /// Waiting for the next batch
    Blocked,
    /// Draining one batch
    Processing,
    Stopped(StopReason),
}

/// Watches one root directory and dispatches its events to a handler
///
/// Owns its registry, property cache and watch source; nothing is shared
/// with other watchers. Scans and property loads run on the loop thread, so
/// a large scan delays event delivery for that root.
pub struct FolderWatcher<S: WatchSource = NotifySource> {
    root: PathBuf,
    options: WatchOptions,
    source: S,
    registry: WatchRegistry,
    cache: PropertyCache,
    handler: Box<dyn EventHandler + Send>,
    visitor: Option<Box<dyn FileVisitor + Send>>,
    state: LoopState,
}

impl FolderWatcher<NotifySource> {
    /// Create a watcher for `root` on the platform notification backend
    pub fn new(
        root: impl Into<PathBuf>,
        options: WatchOptions,
        handler: impl EventHandler + Send + 'static,
    ) -> WatchResult<Self> {
        Ok(Self::with_source(root, options, NotifySource::new()?, handler))
    }

    /// Handle that makes a blocked [`FolderWatcher::run`] return
    pub fn stopper(&self) -> Stopper {
        self.source.stopper()
    }
}

impl<S: WatchSource> FolderWatcher<S> {
    pub fn with_source(
        root: impl Into<PathBuf>,
        options: WatchOptions,
        source: S,
        handler: impl EventHandler + Send + 'static,
    ) -> Self {
        let cache = PropertyCache::new(options.extensions.clone());
        Self {
            root: root.into(),
            options,
            source,
            registry: WatchRegistry::new(),
            cache,
            handler: Box::new(handler),
            visitor: None,
            state: LoopState::Idle,
        }
    }

    /// Also hand every regular file found while scanning to `visitor`
    pub fn with_visitor(mut self, visitor: impl FileVisitor + Send + 'static) -> Self {
        self.visitor = Some(Box::new(visitor));
        self
    }

    /// Register the root (and its subtree when recursive) and seed the cache
    ///
    /// Resolves the root to an absolute path first. Returns the number of
    /// registered directories.
    pub fn load(&mut self) -> WatchResult<usize> {
        let root = self
            .root
            .canonicalize()
            .map_err(|_| WatchError::NotADirectory {
                path: self.root.clone(),
            })?;
        if !root.is_dir() {
            return Err(WatchError::NotADirectory { path: root });
        }
        self.root = root;

        let begin = Instant::now();
        if self.options.recursive {
            info!("Scanning path {} ...", self.root.display());
        }
        let root = self.root.clone();
        let count = self.scan(&root)?;
        if self.options.recursive {
            info!(
                "Scanning done, path.count={}, elapsed.ms={}",
                self.registry.len(),
                begin.elapsed().as_millis()
            );
        }
        Ok(count)
    }

    /// Block and dispatch events until the watcher stops
    pub fn run(&mut self) -> StopReason {
        let reason = loop {
            self.state = LoopState::Blocked;
            let batch = match self.source.next_batch() {
                Ok(batch) => batch,
                Err(WatchError::Cancelled) => break StopReason::Cancelled,
                Err(e) => {
                    error!("Unable to watch: {}: {e}", self.root.display());
                    break StopReason::Failed(e.to_string());
                }
            };

            self.state = LoopState::Processing;
            if !self.process_batch(batch) {
                break StopReason::RegistryEmpty;
            }
        };

        info!("Watcher for {} stopped", self.root.display());
        self.state = LoopState::Stopped(reason.clone());
        reason
    }

    /// Dispatch one batch; `false` once nothing is left to watch
    pub fn process_batch(&mut self, batch: EventBatch) -> bool {
        let Some(folder) = self.registry.resolve(batch.handle).map(Path::to_path_buf) else {
            trace!("skipping batch for unknown handle {}", batch.handle);
            return !self.registry.is_empty();
        };

        for raw in batch.events {
            match raw {
                RawEvent::Overflow => {
                    warn!("Events may have been lost under {}", folder.display());
                }
                RawEvent::Entry { kind, name } => {
                    let event = NormalizedEvent::new(kind, &folder, &name);
                    self.dispatch(event);
                }
            }
        }

        if !self.source.reset(batch.handle) {
            if let Some(path) = self.registry.invalidate(batch.handle) {
                debug!("watch cancelled: {}", path.display());
            }
            if self.registry.is_empty() {
                return false;
            }
        }
        true
    }

    fn dispatch(&mut self, event: NormalizedEvent) {
        if self.options.verbose {
            info!("{}: {}", event.kind.as_str(), event.path.display());
        }

        if self.options.recursive && event.kind == EventKind::Created && is_directory(&event.path) {
            if let Err(e) = self.scan(&event.path) {
                warn!("Unable to watch: {}: {e}", event.path.display());
            }
        }

        let refresh = self.track_properties(&event);
        let changes = refresh
            .as_ref()
            .and_then(|r| r.diff.as_ref())
            .filter(|diff| !diff.is_empty());
        self.handler.handle_event(&event, changes);

        if let Some(refresh) = refresh {
            self.cache.put(&event.path, refresh.snapshot);
        }
    }

    fn track_properties(&mut self, event: &NormalizedEvent) -> Option<PropertyRefresh> {
        if !self.cache.is_recognized(&event.path) {
            return None;
        }
        if event.kind == EventKind::Deleted {
            self.cache.evict(&event.path);
            return None;
        }
        if !event.path.is_file() {
            return None;
        }
        match self.cache.refresh(&event.path) {
            Ok(refresh) => Some(refresh),
            Err(e) => {
                warn!("Can't read: file={}: {e}", event.path.display());
                None
            }
        }
    }

    fn scan(&mut self, start: &Path) -> WatchResult<usize> {
        TreeScanner {
            source: &mut self.source,
            registry: &mut self.registry,
            cache: &mut self.cache,
            visitor: self
                .visitor
                .as_deref_mut()
                .map(|v| v as &mut dyn FileVisitor),
            verbose: self.options.verbose,
        }
        .scan(start, self.options.recursive)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &PropertyCache {
        &self.cache
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn is_directory(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}
