//! The schema-driven extraction engine.
//!
//! [`StreamingExtractor`] consumes a JSON object delivered in arbitrarily
//! sized chunks and emits the values of the configured top-level keys. The
//! full payload is never held in one contiguous region, and input already
//! examined is never re-scanned when new chunks arrive: the scanners
//! suspend with explicit resume state whenever held data runs out.
//!
//! The engine is single-threaded and cooperative. It advances only in
//! response to [`StreamingExtractor::feed`] / [`StreamingExtractor::poll`],
//! never blocks, and emits at most one item per poll, so consumer
//! backpressure is simply the caller not polling; the parse position is
//! retained between polls.
//!
//! # Examples
//!
//! ```rust
//! use jsonsift::{ExtractorOptions, FieldRule, Poll, Schema, StreamingExtractor};
//!
//! let schema = Schema::new().field("description", FieldRule::collect(1_000));
//! let mut extractor = StreamingExtractor::new(schema, ExtractorOptions::default());
//!
//! extractor.feed(r#"{"description":"ab"#).unwrap();
//! assert_eq!(extractor.poll().unwrap(), Poll::Pending);
//!
//! extractor.feed(r#"c"}"#).unwrap();
//! let Poll::Item(item) = extractor.poll().unwrap() else {
//!     panic!("expected an item");
//! };
//! assert_eq!(item.path, "description");
//! assert_eq!(item.value, serde_json::json!("abc"));
//! ```

use alloc::string::{String, ToString};

use log::{debug, trace};

use crate::{
    buffer::ChunkedBuffer,
    decoder::Utf8ChunkDecoder,
    error::ExtractError,
    item::ExtractedItem,
    options::ExtractorOptions,
    schema::{FieldRule, Schema},
    string_scanner::{StringScan, scan_string},
    value_scanner::{IntermediateState, ScanLimits, ValueScan, non_space, scan_value},
};

/// Top-level parsing state. Exactly one state is active at a time and
/// transitions are deterministic given the next non-space character and the
/// active key's schema rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsingState {
    ExpectStartBrace,
    ExpectKey,
    ExpectColon,
    ExpectArrayOpen,
    ExpectValue,
    ExpectArrayCommaOrEnd,
    ExpectTopCommaOrEnd,
    Ended,
}

/// One step of extraction progress, returned by
/// [`StreamingExtractor::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum Poll {
    /// An extracted item, in document order.
    Item(ExtractedItem),
    /// More input is required before further progress is possible.
    Pending,
    /// The top-level object has been fully consumed, or the engine halted
    /// after reporting a fatal error.
    Done,
}

/// The key currently being extracted, with its schema rule.
#[derive(Debug, Clone)]
struct ActiveField {
    key: String,
    rule: FieldRule,
}

/// Outcome of one state-machine step.
enum Step {
    Continue,
    Item(ExtractedItem),
    Pending,
    Done,
}

/// The streaming, schema-driven top-level field extractor.
///
/// Feed chunks with [`feed`](StreamingExtractor::feed) (decoded text) or
/// [`feed_bytes`](StreamingExtractor::feed_bytes) (raw bytes, decoded
/// incrementally), then drive extraction with
/// [`poll`](StreamingExtractor::poll) or by iterating. Iteration yields
/// items until more input is needed; call
/// [`finish`](StreamingExtractor::finish) once no more input will arrive
/// and drain the returned [`ClosedStreamingExtractor`].
///
/// A fatal error (malformed input or any exceeded ceiling) is reported
/// exactly once; afterwards the extractor is inert and must not be reused.
///
/// # Examples
///
/// ```rust
/// use jsonsift::{ExtractorOptions, FieldRule, Schema, StreamingExtractor};
///
/// let schema = Schema::new()
///     .field("summary", FieldRule::collect(1_000))
///     .field("files", FieldRule::collect_each(10_000));
/// let mut extractor = StreamingExtractor::new(schema, ExtractorOptions::default());
///
/// extractor.feed(r#"{"summary":"two files","files":[{"a":1},"#).unwrap();
/// extractor.feed(r#"{"a":2}]}"#).unwrap();
///
/// let items: Vec<_> = extractor.finish().map(Result::unwrap).collect();
/// assert_eq!(items.len(), 3);
/// assert_eq!(items[0].path, "summary");
/// assert_eq!(items[2].value, serde_json::json!({"a": 2}));
/// ```
#[derive(Debug)]
pub struct StreamingExtractor {
    data: ChunkedBuffer,
    decoder: Utf8ChunkDecoder,
    schema: Schema,
    options: ExtractorOptions,

    state: ParsingState,
    active: Option<ActiveField>,
    value_state: Option<IntermediateState>,

    bytes_read: usize,
    failed: bool,
}

impl StreamingExtractor {
    /// Creates an extractor for `schema` with the given limits.
    #[must_use]
    pub fn new(schema: Schema, options: ExtractorOptions) -> Self {
        Self {
            data: ChunkedBuffer::new(),
            decoder: Utf8ChunkDecoder::new(),
            schema,
            options,
            state: ParsingState::ExpectStartBrace,
            active: None,
            value_state: None,
            bytes_read: 0,
            failed: false,
        }
    }

    /// Feeds a chunk of decoded text.
    ///
    /// Chunks may be of any size, down to a single character; chunk
    /// boundaries never affect the emitted items. Input fed after the
    /// document ended, or after a fatal error, is ignored.
    ///
    /// # Errors
    ///
    /// [`ExtractError::PayloadTooLarge`] once the total input exceeds
    /// [`ExtractorOptions::max_bytes`]. The error is fatal.
    pub fn feed(&mut self, chunk: &str) -> Result<(), ExtractError> {
        if self.failed || self.state == ParsingState::Ended {
            return Ok(());
        }
        self.count_bytes(chunk.len())?;
        trace!("feed {} bytes", chunk.len());
        self.data.push(chunk);
        Ok(())
    }

    /// Feeds a chunk of raw bytes, decoding UTF-8 incrementally.
    ///
    /// A multi-byte sequence split across chunk boundaries is completed
    /// when its remaining bytes arrive. Input fed after the document ended,
    /// or after a fatal error, is ignored.
    ///
    /// # Errors
    ///
    /// [`ExtractError::PayloadTooLarge`] once the total input exceeds
    /// [`ExtractorOptions::max_bytes`], and [`ExtractError::InvalidUtf8`]
    /// for a sequence that can never become valid. Both are fatal.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Result<(), ExtractError> {
        if self.failed || self.state == ParsingState::Ended {
            return Ok(());
        }
        self.count_bytes(chunk.len())?;
        let decoded = match self.decoder.decode(chunk) {
            Ok(decoded) => decoded,
            Err(err) => return Err(self.fail(err)),
        };
        trace!("feed {} bytes, {} decoded chars", chunk.len(), decoded.len());
        self.data.push(&decoded);
        Ok(())
    }

    /// Marks the end of input and returns a closed extractor that drains
    /// the remaining items and then ends.
    ///
    /// End of input while the document is incomplete surfaces as
    /// [`ExtractError::UnexpectedEndOfInput`] from the closed extractor.
    #[must_use]
    pub fn finish(self) -> ClosedStreamingExtractor {
        ClosedStreamingExtractor { inner: self }
    }

    /// Advances the machine until it extracts one item, needs more input,
    /// or completes.
    ///
    /// At most one item is returned per call; the parse position is
    /// retained between calls, so a consumer that stops polling pauses
    /// emission without losing progress.
    ///
    /// # Errors
    ///
    /// Any [`ExtractError`]; all of them are fatal, reported once. After an
    /// error this returns [`Poll::Done`].
    pub fn poll(&mut self) -> Result<Poll, ExtractError> {
        if self.failed {
            return Ok(Poll::Done);
        }
        loop {
            if self.state == ParsingState::Ended {
                return Ok(Poll::Done);
            }
            let Some(start) = self.data.find_char(non_space, self.data.position()) else {
                // Nothing but whitespace is held; it can all be dropped.
                self.data.clear();
                return Ok(Poll::Pending);
            };
            self.data.seek(start);
            match self.step()? {
                Step::Continue => {}
                Step::Item(item) => return Ok(Poll::Item(item)),
                Step::Pending => return Ok(Poll::Pending),
                Step::Done => return Ok(Poll::Done),
            }
        }
    }

    /// One transition of the state machine, with the cursor on a non-space
    /// character.
    fn step(&mut self) -> Result<Step, ExtractError> {
        let Some(c) = self.data.first_char() else {
            return Ok(Step::Pending);
        };
        match self.state {
            ParsingState::ExpectStartBrace => {
                if c != '{' {
                    return Err(self.expected("'{'"));
                }
                self.data.advance(1);
                self.set_state(ParsingState::ExpectKey);
                Ok(Step::Continue)
            }
            ParsingState::ExpectKey => self.step_key(c),
            ParsingState::ExpectColon => {
                if c != ':' {
                    return Err(self.expected("':'"));
                }
                self.data.advance(1);
                let each = self
                    .active
                    .as_ref()
                    .is_some_and(|field| field.rule.extracts_array_items());
                self.set_state(if each {
                    ParsingState::ExpectArrayOpen
                } else {
                    ParsingState::ExpectValue
                });
                Ok(Step::Continue)
            }
            ParsingState::ExpectArrayOpen => {
                if c != '[' {
                    return Err(self.expected("'['"));
                }
                self.data.advance(1);
                self.set_state(ParsingState::ExpectValue);
                Ok(Step::Continue)
            }
            ParsingState::ExpectValue => self.step_value(),
            ParsingState::ExpectArrayCommaOrEnd => {
                if c != ',' && c != ']' {
                    return Err(self.expected("',' or ']'"));
                }
                self.data.advance(1);
                if c == ']' {
                    self.active = None;
                    self.set_state(ParsingState::ExpectTopCommaOrEnd);
                } else {
                    self.set_state(ParsingState::ExpectValue);
                }
                Ok(Step::Continue)
            }
            ParsingState::ExpectTopCommaOrEnd => {
                if c == '}' {
                    self.set_state(ParsingState::Ended);
                    self.data.clear();
                    return Ok(Step::Done);
                }
                if c != ',' {
                    return Err(self.expected("',' or '}'"));
                }
                self.data.advance(1);
                self.set_state(ParsingState::ExpectKey);
                Ok(Step::Continue)
            }
            ParsingState::Ended => Ok(Step::Done),
        }
    }

    fn step_key(&mut self, c: char) -> Result<Step, ExtractError> {
        if c != '"' {
            return Err(self.expected("'\"'"));
        }
        match scan_string(&self.data, self.data.position(), None) {
            StringScan::Incomplete { .. } => {
                let held = self.data.len() - self.data.offset();
                if held >= self.options.max_key_length.saturating_add(2) {
                    return Err(self.fail(ExtractError::KeyTooLong {
                        limit: self.options.max_key_length,
                    }));
                }
                Ok(Step::Pending)
            }
            StringScan::Complete { end } => {
                let first = self.data.position_at(self.data.position(), 1);
                let key = self.data.slice(first, end);
                self.data.seek(end);
                self.data.advance(1);
                self.set_state(ParsingState::ExpectColon);
                let Some(rule) = self.schema.rule(&key) else {
                    return Err(self.fail(ExtractError::UnknownKey { key }));
                };
                trace!("key {key:?}");
                self.active = Some(ActiveField { key, rule });
                Ok(Step::Continue)
            }
        }
    }

    fn step_value(&mut self) -> Result<Step, ExtractError> {
        let Some(field) = self.active.clone() else {
            // `ExpectValue` is reachable only after a key was accepted.
            unreachable!("value state entered without an active field");
        };
        let limits = ScanLimits {
            max_depth: self.options.max_depth,
            max_number_length: self.options.max_number_length,
        };
        let base = self.consumed_chars();
        let resume = self.value_state.take();
        let scan = match scan_value(&self.data, base, limits, resume) {
            Ok(scan) => scan,
            Err(err) => return Err(self.fail(err)),
        };
        match scan {
            ValueScan::Incomplete { state } => {
                self.value_state = Some(state);
                if self.data.len() - self.data.offset() >= field.rule.max_size() {
                    return Err(self.fail(ExtractError::ValueTooLarge {
                        key: field.key,
                        limit: field.rule.max_size(),
                    }));
                }
                Ok(Step::Pending)
            }
            ValueScan::Complete { end } => {
                let start = self.data.position();
                if self.data.num_of_chars(start, end) >= field.rule.max_size() {
                    return Err(self.fail(ExtractError::ValueTooLarge {
                        key: field.key,
                        limit: field.rule.max_size(),
                    }));
                }
                let span = self.data.slice(start, self.data.position_at(end, 1));
                let value = match serde_json::from_str(&span) {
                    Ok(value) => value,
                    Err(err) => {
                        return Err(self.fail(ExtractError::InvalidValue {
                            key: field.key,
                            message: err.to_string(),
                        }));
                    }
                };
                self.data.seek(end);
                self.data.advance(1);
                if field.rule.extracts_array_items() {
                    self.set_state(ParsingState::ExpectArrayCommaOrEnd);
                } else {
                    self.active = None;
                    self.set_state(ParsingState::ExpectTopCommaOrEnd);
                }
                debug!("item for key {:?}", field.key);
                Ok(Step::Item(ExtractedItem {
                    path: field.key,
                    value,
                }))
            }
        }
    }

    fn set_state(&mut self, state: ParsingState) {
        trace!("state {:?} -> {state:?}", self.state);
        self.state = state;
    }

    /// Characters already discarded from the front of the buffer; added to
    /// held offsets to report absolute positions.
    fn consumed_chars(&self) -> usize {
        self.data.total_pushed() - self.data.len()
    }

    fn absolute_offset(&self) -> usize {
        self.consumed_chars() + self.data.offset()
    }

    fn expected(&mut self, expected: &'static str) -> ExtractError {
        let at = self.absolute_offset();
        self.fail(ExtractError::ExpectedCharacter { expected, at })
    }

    fn count_bytes(&mut self, n: usize) -> Result<(), ExtractError> {
        self.bytes_read = self.bytes_read.saturating_add(n);
        if self.bytes_read > self.options.max_bytes {
            return Err(self.fail(ExtractError::PayloadTooLarge {
                limit: self.options.max_bytes,
            }));
        }
        Ok(())
    }

    /// Records the fatal error, discards buffered state and leaves the
    /// engine inert.
    fn fail(&mut self, err: ExtractError) -> ExtractError {
        debug!("fatal: {err}");
        self.failed = true;
        self.active = None;
        self.value_state = None;
        self.data.clear();
        err
    }
}

impl Iterator for StreamingExtractor {
    type Item = Result<ExtractedItem, ExtractError>;

    /// Yields extracted items until more input is needed (feed another
    /// chunk and iterate again) or the document completes.
    fn next(&mut self) -> Option<Self::Item> {
        match self.poll() {
            Ok(Poll::Item(item)) => Some(Ok(item)),
            Ok(Poll::Pending | Poll::Done) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// A [`StreamingExtractor`] that has been closed to further input.
///
/// Returned by [`StreamingExtractor::finish`]. Draining it yields the
/// remaining items; end of input while the state machine has not reached
/// the document's closing brace is fatal.
#[derive(Debug)]
pub struct ClosedStreamingExtractor {
    inner: StreamingExtractor,
}

impl ClosedStreamingExtractor {
    /// Advances the machine until it extracts one item or completes.
    ///
    /// # Errors
    ///
    /// Any [`ExtractError`] pending in the machine, plus
    /// [`ExtractError::UnexpectedEndOfInput`] if the document is
    /// incomplete. All errors are fatal and reported once.
    pub fn poll(&mut self) -> Result<Poll, ExtractError> {
        match self.inner.poll()? {
            Poll::Pending => Err(self.inner.fail(ExtractError::UnexpectedEndOfInput)),
            step => Ok(step),
        }
    }
}

impl Iterator for ClosedStreamingExtractor {
    type Item = Result<ExtractedItem, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.poll() {
            Ok(Poll::Item(item)) => Some(Ok(item)),
            Ok(Poll::Pending | Poll::Done) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
