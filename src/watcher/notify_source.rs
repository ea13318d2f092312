//! `WatchSource` backed by the platform watcher from `notify`
//!
//! Every directory gets its own non-recursive watch. notify reports absolute
//! paths, so each path is split back into (parent handle, entry name) and
//! consecutive events for the same parent are grouped into one batch.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{trace, warn};

use crate::error::{WatchError, WatchResult};

use super::event::EventKind;
use super::source::{EventBatch, RawEvent, WatchHandle, WatchSource};

enum Signal {
    Fs(notify::Result<Event>),
    Stop,
}

/// Cloneable stop switch for a blocked [`NotifySource`]
#[derive(Clone)]
pub struct Stopper {
    tx: Sender<Signal>,
}

impl Stopper {
    /// Wake the source and make its next `next_batch` return `Cancelled`
    pub fn stop(&self) {
        let _ = self.tx.send(Signal::Stop);
    }
}

/// Watch source over `notify::RecommendedWatcher`
pub struct NotifySource {
    watcher: RecommendedWatcher,
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
    handles: HashMap<PathBuf, WatchHandle>,
    paths: HashMap<WatchHandle, PathBuf>,
    // Removed directories whose deletion is still expected to be reported a
    // second time (once by the parent watch, once by their own).
    retired: HashSet<PathBuf>,
    pending: VecDeque<EventBatch>,
    stopped: bool,
    next_id: u64,
}

impl NotifySource {
    pub fn new() -> WatchResult<Self> {
        let (tx, rx) = channel();
        let events = tx.clone();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = events.send(Signal::Fs(res));
            },
            Config::default(),
        )
        .map_err(|e| WatchError::Io(std::io::Error::other(e.to_string())))?;

        Ok(Self {
            watcher,
            tx,
            rx,
            handles: HashMap::new(),
            paths: HashMap::new(),
            retired: HashSet::new(),
            pending: VecDeque::new(),
            stopped: false,
            next_id: 1,
        })
    }

    pub fn stopper(&self) -> Stopper {
        Stopper {
            tx: self.tx.clone(),
        }
    }

    fn translate(&mut self, event: Event) {
        if event.need_rescan() {
            // Not tied to a directory; report it on any live handle.
            if let Some(handle) = self.paths.keys().min().copied() {
                self.push(handle, RawEvent::Overflow);
            }
            return;
        }

        match event.kind {
            notify::EventKind::Create(_) => {
                for path in &event.paths {
                    self.entry(EventKind::Created, path);
                }
            }
            notify::EventKind::Remove(_) => {
                for path in &event.paths {
                    self.removed(path);
                }
            }
            notify::EventKind::Modify(ModifyKind::Name(mode)) => match (mode, event.paths.as_slice()) {
                (RenameMode::Both, [from, to]) => {
                    self.removed(from);
                    self.entry(EventKind::Created, to);
                }
                (RenameMode::From, paths) => {
                    for path in paths {
                        self.removed(path);
                    }
                }
                (RenameMode::To, paths) => {
                    for path in paths {
                        self.entry(EventKind::Created, path);
                    }
                }
                (_, paths) => {
                    for path in paths {
                        if path.exists() {
                            self.entry(EventKind::Created, path);
                        } else {
                            self.removed(path);
                        }
                    }
                }
            },
            notify::EventKind::Modify(_) => {
                for path in &event.paths {
                    self.entry(EventKind::Modified, path);
                }
            }
            notify::EventKind::Access(_) | notify::EventKind::Any | notify::EventKind::Other => {}
        }
    }

    fn removed(&mut self, path: &Path) {
        if let Some(handle) = self.handles.remove(path) {
            self.paths.remove(&handle);
            let _ = self.watcher.unwatch(path);
            // Empty batch so the loop notices the handle is gone.
            self.pending.push_back(EventBatch {
                handle,
                events: Vec::new(),
            });
            if self.parent_handle(path).is_some() {
                self.retired.insert(path.to_path_buf());
            }
        } else if self.retired.remove(path) {
            trace!("dropping duplicate removal of {}", path.display());
            return;
        }
        self.entry(EventKind::Deleted, path);
    }

    fn entry(&mut self, kind: EventKind, path: &Path) {
        let (Some(handle), Some(name)) = (self.parent_handle(path), path.file_name()) else {
            trace!("no watch covers {}", path.display());
            return;
        };
        self.push(handle, RawEvent::entry(kind, name));
    }

    fn parent_handle(&self, path: &Path) -> Option<WatchHandle> {
        path.parent().and_then(|parent| self.handles.get(parent)).copied()
    }

    fn push(&mut self, handle: WatchHandle, event: RawEvent) {
        match self.pending.back_mut() {
            Some(batch) if batch.handle == handle => batch.events.push(event),
            _ => self.pending.push_back(EventBatch {
                handle,
                events: vec![event],
            }),
        }
    }
}

impl WatchSource for NotifySource {
    fn watch(&mut self, dir: &Path) -> WatchResult<WatchHandle> {
        if let Some(handle) = self.handles.get(dir) {
            return Ok(*handle);
        }

        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: dir.to_path_buf(),
                source,
            })?;

        let handle = WatchHandle::new(self.next_id);
        self.next_id += 1;
        self.handles.insert(dir.to_path_buf(), handle);
        self.paths.insert(handle, dir.to_path_buf());
        self.retired.remove(dir);
        Ok(handle)
    }

    fn next_batch(&mut self) -> WatchResult<EventBatch> {
        loop {
            if self.stopped {
                return Err(WatchError::Cancelled);
            }
            if let Some(batch) = self.pending.pop_front() {
                return Ok(batch);
            }
            match self.rx.recv() {
                Ok(Signal::Fs(Ok(event))) => self.translate(event),
                Ok(Signal::Fs(Err(e))) => warn!("watch backend error: {e}"),
                Ok(Signal::Stop) => self.stopped = true,
                Err(_) => return Err(WatchError::Disconnected),
            }
        }
    }

    fn reset(&mut self, handle: WatchHandle) -> bool {
        self.paths.contains_key(&handle)
    }
}
