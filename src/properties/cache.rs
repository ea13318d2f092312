//! Per-watcher cache of the last loaded snapshot of every property file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WatchResult;

use super::diff::PropertyDiff;
use super::snapshot::PropertySnapshot;

/// Default property file suffixes
pub const DEFAULT_PROPERTY_EXTENSIONS: &str = ".properties;.conf";

/// Set of file name suffixes that mark a property file
///
/// Parsed from a semicolon-delimited list such as `.properties;.conf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ExtensionSet(Vec<String>);

impl ExtensionSet {
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(';')
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// True iff the file name ends with one of the suffixes
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.0.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::parse(DEFAULT_PROPERTY_EXTENSIONS)
    }
}

impl From<String> for ExtensionSet {
    fn from(list: String) -> Self {
        Self::parse(&list)
    }
}

impl From<ExtensionSet> for String {
    fn from(set: ExtensionSet) -> Self {
        set.0.join(";")
    }
}

impl std::fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(";"))
    }
}

/// Fresh load of a tracked file, diffed against what the cache held
#[derive(Debug, Clone)]
pub struct PropertyRefresh {
    pub snapshot: PropertySnapshot,
    /// `None` on first observation of the file
    pub diff: Option<PropertyDiff>,
}

/// Cache of property snapshots keyed by absolute file path
///
/// Owned by one watcher and only touched from its dispatch thread.
#[derive(Debug, Default)]
pub struct PropertyCache {
    extensions: ExtensionSet,
    entries: HashMap<PathBuf, PropertySnapshot>,
}

impl PropertyCache {
    pub fn new(extensions: ExtensionSet) -> Self {
        Self {
            extensions,
            entries: HashMap::new(),
        }
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn is_recognized(&self, path: &Path) -> bool {
        self.extensions.matches(path)
    }

    pub fn get(&self, path: &Path) -> Option<&PropertySnapshot> {
        self.entries.get(path)
    }

    /// Store a snapshot, returning the one it replaced
    pub fn put(&mut self, path: &Path, snapshot: PropertySnapshot) -> Option<PropertySnapshot> {
        self.entries.insert(path.to_path_buf(), snapshot)
    }

    pub fn evict(&mut self, path: &Path) -> Option<PropertySnapshot> {
        self.entries.remove(path)
    }

    /// Load `path` and store it
    ///
    /// On error the previous entry, if any, is left untouched.
    pub fn load(&mut self, path: &Path) -> WatchResult<&PropertySnapshot> {
        let snapshot = PropertySnapshot::load(path)?;
        self.entries.insert(path.to_path_buf(), snapshot);
        Ok(&self.entries[path])
    }

    /// Load `path` and diff it against the cached snapshot without storing
    pub fn refresh(&self, path: &Path) -> WatchResult<PropertyRefresh> {
        let snapshot = PropertySnapshot::load(path)?;
        let diff = PropertyDiff::between(self.get(path), &snapshot);
        Ok(PropertyRefresh { snapshot, diff })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
