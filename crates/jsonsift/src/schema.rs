//! The extraction schema: which top-level keys to extract, and how.

use alloc::{collections::BTreeMap, string::String};

/// Collection policy and size ceiling for one top-level key.
///
/// # Examples
///
/// ```
/// use jsonsift::FieldRule;
///
/// let whole = FieldRule::collect(100_000);
/// assert!(!whole.extracts_array_items());
///
/// let per_element = FieldRule::collect_each(13_000_000);
/// assert!(per_element.extracts_array_items());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    max_size: usize,
    each: bool,
}

impl FieldRule {
    /// Collect the key's whole value as a single item, up to `max_chars`
    /// characters.
    #[must_use]
    pub fn collect(max_chars: usize) -> Self {
        Self {
            max_size: max_chars,
            each: false,
        }
    }

    /// Require the key's value to be a JSON array and emit each element as
    /// its own item, each up to `max_item_chars` characters.
    #[must_use]
    pub fn collect_each(max_item_chars: usize) -> Self {
        Self {
            max_size: max_item_chars,
            each: true,
        }
    }

    /// The character-count ceiling applied to the collected value, or to
    /// each array element for [`FieldRule::collect_each`].
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether array elements are emitted individually.
    #[must_use]
    pub fn extracts_array_items(&self) -> bool {
        self.each
    }
}

/// Mapping from top-level key to its [`FieldRule`].
///
/// Keys are compared against the raw text between the quotes of the
/// document's key string; escape sequences are not decoded first. A key
/// absent from the schema is a fatal error: skipping an unknown key's
/// value would require tracking its nested depth without buffering, which
/// the extractor deliberately does not offer.
///
/// # Examples
///
/// ```
/// use jsonsift::{FieldRule, Schema};
///
/// let schema = Schema::new()
///     .field("summary", FieldRule::collect(1_000))
///     .field("files", FieldRule::collect_each(13_000_000));
/// assert!(schema.rule("summary").is_some());
/// assert!(schema.rule("other").is_none());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, FieldRule>,
}

impl Schema {
    /// Creates an empty schema. An empty schema rejects every key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the rule for `key`.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(key.into(), rule);
        self
    }

    /// Looks up the rule for a top-level key.
    #[must_use]
    pub fn rule(&self, key: &str) -> Option<FieldRule> {
        self.fields.get(key).copied()
    }
}
