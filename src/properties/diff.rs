//! Key-level diff between two property snapshots

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::snapshot::{Category, PropertySnapshot};

/// Keys that changed, appeared or disappeared between two loads of a file
///
/// Every differing key lands in exactly one bucket; keys with equal values
/// land in none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDiff {
    pub changed: PropertySnapshot,
    pub added: PropertySnapshot,
    pub removed: PropertySnapshot,
}

impl PropertyDiff {
    /// Compare a cached snapshot against a fresh one
    ///
    /// Returns `None` when there is no earlier snapshot: the first load only
    /// warms the cache.
    pub fn between(before: Option<&PropertySnapshot>, after: &PropertySnapshot) -> Option<Self> {
        let before = before?;

        let mut changed = BTreeMap::new();
        let mut added = BTreeMap::new();
        let mut removed = BTreeMap::new();

        let all: BTreeSet<&str> = before.keys().chain(after.keys()).collect();
        for key in all {
            match (before.get(key), after.get(key)) {
                (Some(old), Some(new)) if old != new => {
                    changed.insert(key.to_string(), format!("{old}=>{new}"));
                }
                (None, Some(new)) => {
                    added.insert(key.to_string(), new.to_string());
                }
                (Some(old), None) => {
                    removed.insert(key.to_string(), old.to_string());
                }
                _ => {}
            }
        }

        let source = after.source();
        Some(Self {
            changed: PropertySnapshot::new(Category::Changed, source, changed),
            added: PropertySnapshot::new(Category::Added, source, added),
            removed: PropertySnapshot::new(Category::Removed, source, removed),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    /// Buckets that hold at least one key, in changed/added/removed order
    pub fn non_empty_buckets(&self) -> impl Iterator<Item = &PropertySnapshot> {
        [&self.changed, &self.added, &self.removed]
            .into_iter()
            .filter(|bucket| !bucket.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> PropertySnapshot {
        let properties = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PropertySnapshot::new(Category::Contents, "/etc/app.conf", properties)
    }

    #[test]
    fn test_diff_without_before_is_none() {
        let after = snapshot(&[("a", "1")]);
        assert!(PropertyDiff::between(None, &after).is_none());
    }

    #[test]
    fn test_diff_changed_added_removed() {
        let before = snapshot(&[("a", "1"), ("b", "2"), ("gone", "x")]);
        let after = snapshot(&[("a", "1"), ("b", "3"), ("c", "4")]);

        let diff = PropertyDiff::between(Some(&before), &after).unwrap();

        assert_eq!(diff.changed.get("b"), Some("2=>3"));
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.added.get("c"), Some("4"));
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed.get("gone"), Some("x"));
        assert_eq!(diff.removed.len(), 1);
        assert!(!diff.changed.contains_key("a"));
    }

    #[test]
    fn test_diff_equal_snapshots_is_empty() {
        let before = snapshot(&[("a", "1")]);
        let after = snapshot(&[("a", "1")]);
        let diff = PropertyDiff::between(Some(&before), &after).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.non_empty_buckets().count(), 0);
    }

    #[test]
    fn test_diff_is_exact_string_comparison() {
        let before = snapshot(&[("n", "1"), ("flag", "true")]);
        let after = snapshot(&[("n", "01"), ("flag", "TRUE")]);
        let diff = PropertyDiff::between(Some(&before), &after).unwrap();
        assert_eq!(diff.changed.get("n"), Some("1=>01"));
        assert_eq!(diff.changed.get("flag"), Some("true=>TRUE"));
    }

    #[test]
    fn test_diff_buckets_are_tagged() {
        let before = snapshot(&[("a", "1")]);
        let after = snapshot(&[("b", "2")]);
        let diff = PropertyDiff::between(Some(&before), &after).unwrap();

        assert_eq!(diff.changed.category(), Category::Changed);
        assert_eq!(diff.added.category(), Category::Added);
        assert_eq!(diff.removed.category(), Category::Removed);
        assert_eq!(diff.added.source(), std::path::Path::new("/etc/app.conf"));

        let names: Vec<_> = diff
            .non_empty_buckets()
            .map(|b| b.category().snapshot_name())
            .collect();
        assert_eq!(names, vec!["ContentsAdded", "ContentsRemoved"]);
    }
}
