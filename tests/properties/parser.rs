//! Property tests for the property file parser.

use std::path::Path;

use proptest::prelude::*;

use folder_monitor::properties::parse_properties;

fn printable() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -~\t\n]{0,200}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: parsing arbitrary printable text never panics.
    #[test]
    fn property_parse_never_panics(content in printable()) {
        let _ = parse_properties(&content, Path::new("fuzz.properties"));
    }

    /// PROPERTY: simple `key=value` lines read back unchanged.
    #[test]
    fn property_plain_pairs_parse_verbatim(
        pairs in proptest::collection::btree_map("[a-z][a-z0-9_.]{0,8}", "[a-zA-Z0-9_./-]{0,12}", 0..=8),
    ) {
        let content: String = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect();

        let parsed = parse_properties(&content, Path::new("app.properties")).unwrap();
        prop_assert_eq!(parsed, pairs);
    }
}
