//! Property file tracking
//!
//! Loads `.properties`-style files into immutable snapshots, keeps the last
//! snapshot per file and computes key-level diffs between reloads.

mod cache;
mod diff;
mod parser;
mod snapshot;

pub use cache::{ExtensionSet, PropertyCache, PropertyRefresh, DEFAULT_PROPERTY_EXTENSIONS};
pub use diff::PropertyDiff;
pub use parser::parse_properties;
pub use snapshot::{Category, PropertySnapshot};
