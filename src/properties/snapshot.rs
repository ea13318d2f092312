//! Immutable key/value snapshots

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{WatchError, WatchResult};

use super::parser::parse_properties;

/// What a snapshot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Full contents of a property file at load time
    Contents,
    /// Keys whose value differs (`old=>new`)
    Changed,
    /// Keys that only exist in the newer load
    Added,
    /// Keys that only exist in the older load
    Removed,
}

impl Category {
    /// Record-level name used when a snapshot is attached to an event
    pub fn snapshot_name(&self) -> &'static str {
        match self {
            Category::Contents => "Contents",
            Category::Changed => "ContentsChanged",
            Category::Added => "ContentsAdded",
            Category::Removed => "ContentsRemoved",
        }
    }
}

/// Ordered key/value table tagged with its origin file and category
///
/// Snapshots are never mutated after construction; every load produces a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySnapshot {
    category: Category,
    source: PathBuf,
    properties: BTreeMap<String, String>,
}

impl PropertySnapshot {
    pub fn new(
        category: Category,
        source: impl Into<PathBuf>,
        properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            category,
            source: source.into(),
            properties,
        }
    }

    /// Read and parse a property file
    pub fn load(path: &Path) -> WatchResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| WatchError::property_load(path, e))?;
        let properties = parse_properties(&content, path)?;
        Ok(Self::new(Category::Contents, path, properties))
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// File this snapshot was taken from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
