//! Property tests for snapshot diffs.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use folder_monitor::properties::Category;
use folder_monitor::{PropertyDiff, PropertySnapshot};

fn table() -> impl Strategy<Value = BTreeMap<String, String>> {
    // Small key space so before/after overlap often.
    proptest::collection::btree_map("[a-f]", "[0-3]{1,2}", 0..=6)
}

fn snapshot(map: BTreeMap<String, String>) -> PropertySnapshot {
    PropertySnapshot::new(Category::Contents, "conf/app.conf", map)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every differing key lands in exactly one bucket, equal keys in none.
    #[test]
    fn property_buckets_partition_differing_keys(before in table(), after in table()) {
        let diff = PropertyDiff::between(Some(&snapshot(before.clone())), &snapshot(after.clone()))
            .expect("diff against an earlier snapshot");

        let changed: BTreeSet<&str> = diff.changed.keys().collect();
        let added: BTreeSet<&str> = diff.added.keys().collect();
        let removed: BTreeSet<&str> = diff.removed.keys().collect();

        prop_assert!(changed.is_disjoint(&added));
        prop_assert!(changed.is_disjoint(&removed));
        prop_assert!(added.is_disjoint(&removed));

        let keys: BTreeSet<&str> = before.keys().chain(after.keys()).map(String::as_str).collect();
        for key in keys {
            match (before.get(key), after.get(key)) {
                (Some(old), Some(new)) if old == new => {
                    prop_assert!(!changed.contains(key) && !added.contains(key) && !removed.contains(key));
                }
                (Some(old), Some(new)) => {
                    let expected = format!("{old}=>{new}");
                    prop_assert_eq!(diff.changed.get(key), Some(expected.as_str()));
                }
                (None, Some(new)) => {
                    prop_assert_eq!(diff.added.get(key), Some(new.as_str()));
                }
                (Some(old), None) => {
                    prop_assert_eq!(diff.removed.get(key), Some(old.as_str()));
                }
                (None, None) => unreachable!(),
            }
        }

        prop_assert_eq!(diff.is_empty(), before == after);
    }

    /// PROPERTY: without an earlier snapshot there is never a diff.
    #[test]
    fn property_first_observation_has_no_diff(after in table()) {
        prop_assert!(PropertyDiff::between(None, &snapshot(after)).is_none());
    }
}
