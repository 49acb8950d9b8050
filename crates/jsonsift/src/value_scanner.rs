//! Scanner that locates the end of a complete JSON value, skipping nested
//! strings, arrays and objects, and suspending mid-value when held data
//! runs out.
//!
//! Nesting is tracked with an explicit stack rather than recursion: depth is
//! attacker-influenced input and is bounded by a configured ceiling, not by
//! the call stack.

use alloc::vec::Vec;

use crate::{
    buffer::{BufferedPosition, ChunkedBuffer},
    error::ExtractError,
    string_scanner::{StringScan, scan_string},
};

/// Matches the characters JSON treats as insignificant between tokens,
/// inverted: anything that is not whitespace.
pub(crate) fn non_space(c: char) -> bool {
    !c.is_whitespace()
}

fn is_number_char(c: char) -> bool {
    matches!(c, '0'..='9' | '.' | 'e' | 'E' | '+')
}

/// Kind of container currently open on the nesting stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Object,
    Array,
}

/// Resumable snapshot of a value scan that ran out of held data.
///
/// `stack` holds one entry per open container not yet matched by its
/// closer; its length never exceeds the configured depth ceiling. The
/// optional `string_resume` carries an in-progress string's resume hint so
/// the string is not re-scanned when more data arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IntermediateState {
    position: BufferedPosition,
    string_resume: Option<BufferedPosition>,
    expect_comma_or_end: bool,
    stack: Vec<Container>,
}

/// Outcome of a [`scan_value`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueScan {
    /// `end` addresses the last character of the value (not one past it).
    Complete { end: BufferedPosition },
    /// Held data ran out mid-value; pass `state` back to resume.
    Incomplete { state: IntermediateState },
}

/// Ceilings enforced while scanning.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanLimits {
    pub(crate) max_depth: usize,
    pub(crate) max_number_length: usize,
}

/// Outcome of consuming an object member's `"key":` prefix.
enum KeyScan {
    /// Key and colon consumed; the member's value begins at `value_start`.
    Done { value_start: BufferedPosition },
    /// The key string or its colon is not fully held yet.
    NeedMore {
        string_resume: Option<BufferedPosition>,
    },
}

/// Consumes `"key"` and the following `:`, starting at the first non-space
/// character at or after `from`.
fn scan_member_key(
    buffer: &ChunkedBuffer,
    base_offset: usize,
    from: BufferedPosition,
    string_resume: Option<BufferedPosition>,
) -> Result<KeyScan, ExtractError> {
    let Some(quote) = buffer.find_char(non_space, from) else {
        return Ok(KeyScan::NeedMore {
            string_resume: None,
        });
    };
    if buffer.char_at(quote) != Some('"') {
        return Err(ExtractError::ExpectedCharacter {
            expected: "'\"'",
            at: base_offset + buffer.offset_at(quote),
        });
    }
    match scan_string(buffer, quote, string_resume) {
        StringScan::Incomplete { resume } => Ok(KeyScan::NeedMore {
            string_resume: Some(resume),
        }),
        StringScan::Complete { end } => {
            let after = buffer.position_at(end, 1);
            let Some(colon) = buffer.find_char(non_space, after) else {
                return Ok(KeyScan::NeedMore {
                    string_resume: None,
                });
            };
            if buffer.char_at(colon) != Some(':') {
                return Err(ExtractError::ExpectedCharacter {
                    expected: "':'",
                    at: base_offset + buffer.offset_at(colon),
                });
            }
            Ok(KeyScan::Done {
                value_start: buffer.position_at(colon, 1),
            })
        }
    }
}

/// Finds the end of the JSON value starting at the buffer's cursor, or
/// resumes a prior incomplete attempt via `resume`.
///
/// A single forward scan: whitespace is skipped before each token; literal
/// regions must match `null` / `true` / `false` exactly; `"` delegates to
/// the string scanner; `[` and `{` push onto the stack, with `{` (and `,`
/// inside an object) additionally consuming a key-string-then-colon,
/// including across resumptions: the saved position is the opener itself,
/// so re-dispatching it continues the key via the saved string resume
/// hint. Numbers dispatch on a leading ASCII digit and run through
/// the character class `[0-9.Ee+]`; deeper numeric validation is deferred
/// to the value's eventual decoding.
///
/// The scan reports done only once the initial value's matching closer has
/// been consumed at depth zero. Depth and number-length ceiling violations
/// are fatal, never "need more data". `base_offset` is added to held
/// offsets when reporting error positions.
pub(crate) fn scan_value(
    buffer: &ChunkedBuffer,
    base_offset: usize,
    limits: ScanLimits,
    resume: Option<IntermediateState>,
) -> Result<ValueScan, ExtractError> {
    let (mut current, mut string_resume, mut expect_comma_or_end, mut stack) = match resume {
        Some(state) => (
            state.position,
            state.string_resume,
            state.expect_comma_or_end,
            state.stack,
        ),
        None => (buffer.position(), None, false, Vec::new()),
    };
    let mut saved_string_resume = None;

    loop {
        let Some(found) = buffer.find_char(non_space, current) else {
            break;
        };
        current = found;
        let Some(c) = buffer.char_at(current) else {
            break;
        };

        if expect_comma_or_end {
            match c {
                ']' => {
                    if stack.pop() != Some(Container::Array) {
                        return Err(unexpected(buffer, base_offset, current, c));
                    }
                    current = buffer.position_at(current, 1);
                }
                '}' => {
                    if stack.pop() != Some(Container::Object) {
                        return Err(unexpected(buffer, base_offset, current, c));
                    }
                    current = buffer.position_at(current, 1);
                }
                ',' => {
                    let after = buffer.position_at(current, 1);
                    if stack.last() == Some(&Container::Object) {
                        match scan_member_key(buffer, base_offset, after, string_resume.take())? {
                            KeyScan::Done { value_start } => {
                                current = value_start;
                                expect_comma_or_end = false;
                            }
                            KeyScan::NeedMore { string_resume: sr } => {
                                // `current` stays at the comma so re-dispatching
                                // it continues the member key.
                                saved_string_resume = sr;
                                break;
                            }
                        }
                    } else {
                        current = after;
                        expect_comma_or_end = false;
                    }
                }
                _ => return Err(unexpected(buffer, base_offset, current, c)),
            }
        } else {
            match c {
                'n' | 't' | 'f' => {
                    let literal = match c {
                        'n' => "null",
                        't' => "true",
                        _ => "false",
                    };
                    if buffer.offset_at(current) + literal.len() > buffer.len() {
                        break; // not enough data to confirm the literal
                    }
                    let after = buffer.position_at(current, literal.len() as isize);
                    if buffer.slice(current, after) != literal {
                        return Err(ExtractError::LiteralMismatch {
                            expected: literal,
                            at: base_offset + buffer.offset_at(current),
                        });
                    }
                    match buffer.char_at(after) {
                        // the word must stop here: `truee` is a mismatch,
                        // not a prefix match
                        Some(next) if next.is_ascii_alphanumeric() => {
                            return Err(ExtractError::LiteralMismatch {
                                expected: literal,
                                at: base_offset + buffer.offset_at(current),
                            });
                        }
                        Some(_) => {}
                        None => break, // the delimiter is not held yet
                    }
                    current = after;
                    expect_comma_or_end = true;
                }
                '"' => match scan_string(buffer, current, string_resume.take()) {
                    StringScan::Incomplete { resume } => {
                        saved_string_resume = Some(resume);
                        break;
                    }
                    StringScan::Complete { end } => {
                        current = buffer.position_at(end, 1);
                        expect_comma_or_end = true;
                    }
                },
                '[' => {
                    stack.push(Container::Array);
                    if stack.len() > limits.max_depth {
                        return Err(ExtractError::DepthLimitExceeded {
                            limit: limits.max_depth,
                        });
                    }
                    current = buffer.position_at(current, 1);
                }
                '{' => {
                    stack.push(Container::Object);
                    if stack.len() > limits.max_depth {
                        return Err(ExtractError::DepthLimitExceeded {
                            limit: limits.max_depth,
                        });
                    }
                    let after = buffer.position_at(current, 1);
                    match scan_member_key(buffer, base_offset, after, string_resume.take())? {
                        KeyScan::Done { value_start } => current = value_start,
                        KeyScan::NeedMore { string_resume: sr } => {
                            // Leave `current` at the brace and unwind the push:
                            // the resumed call re-dispatches the brace and
                            // continues the key from the string resume hint.
                            stack.pop();
                            saved_string_resume = sr;
                            break;
                        }
                    }
                }
                c if c.is_ascii_digit() => {
                    match buffer.find_char(|ch| !is_number_char(ch), current) {
                        Some(end) => {
                            if buffer.num_of_chars(current, end) > limits.max_number_length {
                                return Err(ExtractError::NumberTooLong {
                                    limit: limits.max_number_length,
                                    at: base_offset + buffer.offset_at(current),
                                });
                            }
                            current = end;
                            expect_comma_or_end = true;
                        }
                        None => {
                            if buffer.len() - buffer.offset_at(current) > limits.max_number_length {
                                return Err(ExtractError::NumberTooLong {
                                    limit: limits.max_number_length,
                                    at: base_offset + buffer.offset_at(current),
                                });
                            }
                            break; // the run may continue in the next chunk
                        }
                    }
                }
                other => return Err(unexpected(buffer, base_offset, current, other)),
            }
        }

        if expect_comma_or_end && stack.is_empty() {
            return Ok(ValueScan::Complete {
                end: buffer.position_at(current, -1),
            });
        }
    }

    Ok(ValueScan::Incomplete {
        state: IntermediateState {
            position: current,
            string_resume: saved_string_resume,
            expect_comma_or_end,
            stack,
        },
    })
}

fn unexpected(
    buffer: &ChunkedBuffer,
    base_offset: usize,
    at: BufferedPosition,
    found: char,
) -> ExtractError {
    ExtractError::UnexpectedCharacter {
        found,
        at: base_offset + buffer.offset_at(at),
    }
}
