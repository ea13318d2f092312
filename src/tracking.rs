//! Tracking records built from watch events
//!
//! [`TrackingHandler`] turns every normalized event into an [`EventRecord`]
//! and hands it to a sink. Records carry the file's attributes at emit time,
//! the time since the previous event on the same resource and any property
//! diff attached by the watcher.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::properties::PropertyDiff;
use crate::watcher::{EventHandler, EventKind, NormalizedEvent};

/// Resources remembered by a [`HitTracker`] by default
pub const DEFAULT_HIT_CAPACITY: usize = 1000;

/// Age after which a remembered hit is forgotten
pub const DEFAULT_HIT_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    Add,
    Update,
    Remove,
}

/// Filesystem facts about the resource, sampled when the record is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAttributes {
    pub exists: bool,
    pub readable: bool,
    pub writable: bool,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileAttributes {
    /// `None` when the path no longer exists
    pub fn probe(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        let readable = if metadata.is_dir() {
            fs::read_dir(path).is_ok()
        } else {
            fs::File::open(path).is_ok()
        };
        Some(Self {
            exists: true,
            readable,
            writable: !metadata.permissions().readonly(),
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

/// One tracked filesystem event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub name: &'static str,
    pub severity: Severity,
    pub op: OpType,
    pub resource: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Microseconds since the previous event on this resource, 0 if none
    pub elapsed_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<FileAttributes>,
    /// Non-empty diff buckets keyed by `ContentsChanged` and friends
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub snapshots: BTreeMap<&'static str, BTreeMap<String, String>>,
}

impl EventRecord {
    pub fn new(
        event: &NormalizedEvent,
        changes: Option<&PropertyDiff>,
        elapsed: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (name, severity, op, verb) = match event.kind {
            EventKind::Created => ("PathCreated", Severity::Info, OpType::Add, "created"),
            EventKind::Modified => ("PathModified", Severity::Info, OpType::Update, "changed"),
            EventKind::Deleted => ("PathDeleted", Severity::Warning, OpType::Remove, "deleted"),
        };

        let snapshots = changes
            .into_iter()
            .flat_map(PropertyDiff::non_empty_buckets)
            .map(|bucket| (bucket.category().snapshot_name(), bucket.properties().clone()))
            .collect();

        Self {
            name,
            severity,
            op,
            resource: file_uri(&event.path),
            message: format!("Path {verb}: {}", event.path.display()),
            timestamp,
            elapsed_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            attributes: FileAttributes::probe(&event.path),
            snapshots,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// `file://` URI for an absolute path
pub fn file_uri(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}

/// Remembers when each resource was last seen
///
/// Holds at most `capacity` resources. When full, hits older than `max_age`
/// are dropped first, then the least recently hit resource.
#[derive(Debug)]
pub struct HitTracker {
    capacity: usize,
    max_age: Duration,
    hits: HashMap<String, Instant>,
}

impl Default for HitTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_CAPACITY, DEFAULT_HIT_MAX_AGE)
    }
}

impl HitTracker {
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            max_age,
            hits: HashMap::new(),
        }
    }

    /// Record a hit now; returns the time since the previous one
    pub fn hit(&mut self, key: &str) -> Duration {
        self.hit_at(key, Instant::now())
    }

    pub fn hit_at(&mut self, key: &str, now: Instant) -> Duration {
        if let Some(last) = self.hits.get_mut(key) {
            let elapsed = now.saturating_duration_since(*last);
            *last = now;
            return if elapsed > self.max_age {
                Duration::ZERO
            } else {
                elapsed
            };
        }

        if self.hits.len() >= self.capacity {
            self.evict(now);
        }
        self.hits.insert(key.to_string(), now);
        Duration::ZERO
    }

    fn evict(&mut self, now: Instant) {
        let max_age = self.max_age;
        self.hits
            .retain(|_, last| now.saturating_duration_since(*last) <= max_age);
        while self.hits.len() >= self.capacity {
            let oldest = self
                .hits
                .iter()
                .min_by_key(|(_, last)| **last)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => self.hits.remove(&key),
                None => break,
            };
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Event handler that emits an [`EventRecord`] per event into `sink`
pub struct TrackingHandler<F> {
    tracker: HitTracker,
    sink: F,
}

impl<F> TrackingHandler<F>
where
    F: FnMut(EventRecord),
{
    pub fn new(sink: F) -> Self {
        Self::with_tracker(HitTracker::default(), sink)
    }

    pub fn with_tracker(tracker: HitTracker, sink: F) -> Self {
        Self { tracker, sink }
    }
}

impl<F> EventHandler for TrackingHandler<F>
where
    F: FnMut(EventRecord),
{
    fn handle_event(&mut self, event: &NormalizedEvent, changes: Option<&PropertyDiff>) {
        let resource = file_uri(&event.path);
        let elapsed = self.tracker.hit(&resource);
        (self.sink)(EventRecord::new(event, changes, elapsed, Utc::now()));
    }
}
