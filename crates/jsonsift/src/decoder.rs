//! Incremental UTF-8 decoding for byte-oriented input.
//!
//! A multi-byte sequence may arrive split across chunk boundaries; up to
//! three trailing bytes are carried until the sequence completes in a later
//! chunk. An invalid sequence is fatal, never carried.

use alloc::{string::String, vec::Vec};

use crate::error::ExtractError;

#[derive(Debug, Default)]
pub(crate) struct Utf8ChunkDecoder {
    carry: Vec<u8>,
    consumed: usize,
}

impl Utf8ChunkDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decodes `input` prefixed with any bytes carried from the previous
    /// call. An incomplete trailing sequence is carried into the next call;
    /// a sequence that can never become valid is an error.
    pub(crate) fn decode(&mut self, input: &[u8]) -> Result<String, ExtractError> {
        let mut bytes = core::mem::take(&mut self.carry);
        bytes.extend_from_slice(input);
        match String::from_utf8(bytes) {
            Ok(text) => {
                self.consumed += text.len();
                Ok(text)
            }
            Err(err) => {
                let utf8_error = err.utf8_error();
                let valid_up_to = utf8_error.valid_up_to();
                if utf8_error.error_len().is_some() {
                    return Err(ExtractError::InvalidUtf8 {
                        at: self.consumed + valid_up_to,
                    });
                }
                // The tail is the prefix of a sequence whose remaining bytes
                // have not arrived yet.
                let mut bytes = err.into_bytes();
                self.carry = bytes.split_off(valid_up_to);
                self.consumed += valid_up_to;
                Ok(String::from_utf8(bytes).unwrap_or_default())
            }
        }
    }
}
