//! Incremental, schema-driven extraction of top-level fields from
//! streaming JSON.
//!
//! `jsonsift` consumes a JSON object delivered in arbitrarily sized chunks
//! (bytes arriving over time) and emits only the values of a configured
//! set of top-level keys, without buffering the full payload in one
//! contiguous region and without re-scanning input already examined. It is
//! built for payloads that may be very large, where some top-level values
//! are huge strings or arrays: scans suspend mid-token when held data runs
//! out and resume exactly where they stopped, per-key size ceilings reject
//! hostile values early, and the consumer pulls items one at a time.
//!
//! Nested content under tracked keys is passed through verbatim and
//! decoded as a whole; this is not a general-purpose JSON parser. A key's
//! rule can instead declare the value to be an array whose elements are
//! emitted individually.
//!
//! # Examples
//!
//! ```rust
//! use jsonsift::{ExtractorOptions, FieldRule, Schema, StreamingExtractor};
//!
//! let schema = Schema::new()
//!     .field("summary", FieldRule::collect(1_000))
//!     .field("files", FieldRule::collect_each(10_000));
//!
//! let mut extractor = StreamingExtractor::new(schema, ExtractorOptions::default());
//! extractor.feed(r#"{"summary":"two files","#).unwrap();
//! extractor.feed(r#""files":[{"a":1},{"a":2}]}"#).unwrap();
//!
//! let items: Vec<_> = extractor.finish().map(Result::unwrap).collect();
//! assert_eq!(items.len(), 3);
//! assert_eq!(items[0].path, "summary");
//! assert_eq!(items[1].value, serde_json::json!({"a": 1}));
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod decoder;
mod error;
mod extractor;
mod item;
mod options;
mod schema;
mod string_scanner;
mod value_scanner;

#[cfg(test)]
mod tests;

pub use error::ExtractError;
pub use extractor::{ClosedStreamingExtractor, Poll, StreamingExtractor};
pub use item::ExtractedItem;
pub use options::ExtractorOptions;
pub use schema::{FieldRule, Schema};
