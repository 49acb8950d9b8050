//! Low-level scanner that locates the unescaped closing quote of a JSON
//! string, suspending and resuming across chunk boundaries.

use crate::buffer::{BufferedPosition, ChunkedBuffer};

/// Outcome of a [`scan_string`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StringScan {
    /// The closing quote was found; `end` is its position.
    Complete { end: BufferedPosition },
    /// Held data ran out before the closing quote. Pass `resume` back to the
    /// next call so scanning continues where it stopped instead of
    /// restarting at the opening quote.
    Incomplete { resume: BufferedPosition },
}

/// Finds the unescaped `"` terminating the string opened at `opening`.
///
/// Callers only invoke this after confirming the opening quote, so a
/// non-quote character at `opening` is caller misuse, not a data error.
///
/// Escapes are skipped one unit at a time: a `\` consumes itself and the
/// following character. A `\` that is the last held character stops the
/// scan, since the escaped pair might span a chunk boundary not yet
/// received, and the backslash itself becomes the resume point.
pub(crate) fn scan_string(
    buffer: &ChunkedBuffer,
    opening: BufferedPosition,
    resume: Option<BufferedPosition>,
) -> StringScan {
    assert_eq!(
        buffer.char_at(opening),
        Some('"'),
        "string scan must start at an opening quote"
    );

    let mut next = resume.unwrap_or_else(|| buffer.position_at(opening, 1));
    loop {
        let Some(hit) = buffer.find_char(|c| c == '"' || c == '\\', next) else {
            return StringScan::Incomplete {
                resume: buffer.end(),
            };
        };
        if buffer.char_at(hit) == Some('"') {
            return StringScan::Complete { end: hit };
        }
        if buffer.last() == Some(hit) {
            return StringScan::Incomplete { resume: hit };
        }
        next = buffer.position_at(hit, 2);
    }
}
