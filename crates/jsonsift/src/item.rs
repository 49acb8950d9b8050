//! Items emitted by the extraction engine.

use alloc::string::String;

use serde_json::Value;

/// One extracted `{path, value}` pair, produced in document order.
///
/// `path` is the schema key the value belongs to. For
/// [`FieldRule::collect_each`](crate::FieldRule::collect_each) keys one
/// item is produced per array element, in array order, all sharing the key
/// as their path.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    /// The schema key owning the value.
    pub path: String,
    /// The decoded JSON value of the extracted span.
    pub value: Value,
}
