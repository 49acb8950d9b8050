//! The fatal error type reported by the extraction engine.

use alloc::string::String;

use thiserror::Error;

/// A fatal extraction failure.
///
/// Every variant is unrecoverable for the extractor that reported it: the
/// error surfaces exactly once, buffered state is discarded, and the
/// instance must not be reused. [`ExtractError::status_code`] suggests a
/// protocol-level classification for callers that map failures onto a
/// response status.
///
/// Positions in messages are absolute character offsets from the start of
/// the decoded input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// A specific token was required and something else was found.
    #[error("expected {expected} at character {at}")]
    ExpectedCharacter {
        /// Description of the required token, e.g. `"':'"` or `"',' or '}'"`.
        expected: &'static str,
        /// Absolute character offset of the offending character.
        at: usize,
    },

    /// A character that cannot start or continue the current construct,
    /// including an array or object closer that does not match the open
    /// container.
    #[error("unexpected character '{found}' at character {at}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Absolute character offset of the offending character.
        at: usize,
    },

    /// A `null` / `true` / `false` region did not match the literal exactly.
    #[error("expected literal '{expected}' at character {at}")]
    LiteralMismatch {
        /// The literal that was expected in full.
        expected: &'static str,
        /// Absolute character offset of the literal's first character.
        at: usize,
    },

    /// A top-level key that is absent from the extraction schema.
    #[error("unknown top-level key: {key}")]
    UnknownKey {
        /// The rejected key.
        key: String,
    },

    /// A top-level key longer than the configured ceiling.
    #[error("top-level object keys can be of maximum length {limit}")]
    KeyTooLong {
        /// The configured key-length ceiling.
        limit: usize,
    },

    /// A numeric literal run longer than the configured ceiling.
    #[error("number at character {at} exceeds {limit} characters")]
    NumberTooLong {
        /// The configured number-length ceiling.
        limit: usize,
        /// Absolute character offset of the number's first character.
        at: usize,
    },

    /// Array/object nesting deeper than the configured ceiling.
    #[error("JSON nesting supports a maximum of {limit} levels")]
    DepthLimitExceeded {
        /// The configured nesting ceiling.
        limit: usize,
    },

    /// A value (or array element) exceeding its key's size ceiling.
    #[error("value for key {key} is longer than {limit} characters")]
    ValueTooLarge {
        /// The key whose ceiling was exceeded.
        key: String,
        /// The configured per-value ceiling.
        limit: usize,
    },

    /// Total input above the configured byte ceiling, across all chunks
    /// ever received.
    #[error("total size of payload above maximum size of {limit} bytes")]
    PayloadTooLarge {
        /// The configured total-byte ceiling.
        limit: usize,
    },

    /// The input ended while the document was still incomplete.
    #[error("input ended before the JSON document was complete")]
    UnexpectedEndOfInput,

    /// A byte chunk contained a sequence that is not valid UTF-8.
    #[error("invalid UTF-8 sequence at byte {at}")]
    InvalidUtf8 {
        /// Absolute byte offset of the offending sequence.
        at: usize,
    },

    /// An extracted span was structurally delimited but failed full JSON
    /// decoding.
    #[error("invalid JSON value for key {key}: {message}")]
    InvalidValue {
        /// The key whose value failed to decode.
        key: String,
        /// The decoder's diagnostic.
        message: String,
    },
}

impl ExtractError {
    /// Suggested protocol-level status classification: `413` for size
    /// ceiling violations, `400` for everything else.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::KeyTooLong { .. } | Self::ValueTooLarge { .. } | Self::PayloadTooLarge { .. } => {
                413
            }
            _ => 400,
        }
    }
}
