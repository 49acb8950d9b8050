/// Configuration limits for a
/// [`StreamingExtractor`](crate::StreamingExtractor).
///
/// All ceilings are fatal when exceeded; none of them is a "wait for more
/// data" condition. Ceilings on sizes distinguish the extractor from a
/// buffering parser: a hostile payload can be rejected long before it is
/// fully received.
#[derive(Debug, Clone, Copy)]
pub struct ExtractorOptions {
    /// Ceiling on the total number of input bytes across all chunks ever
    /// fed, independent of the per-key ceilings. Exceeding it is classified
    /// as an oversized payload.
    ///
    /// # Default
    ///
    /// `usize::MAX`
    pub max_bytes: usize,

    /// Ceiling on the length, in characters, of a top-level object key.
    ///
    /// # Default
    ///
    /// `1000`
    pub max_key_length: usize,

    /// Ceiling on the length, in characters, of a numeric literal inside a
    /// tracked value.
    ///
    /// # Default
    ///
    /// `1000`
    pub max_number_length: usize,

    /// Ceiling on array/object nesting depth inside a tracked value.
    ///
    /// # Default
    ///
    /// `100`
    pub max_depth: usize,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            max_bytes: usize::MAX,
            max_key_length: 1000,
            max_number_length: 1000,
            max_depth: 100,
        }
    }
}
