//! Error types for bamlens

use thiserror::Error;

/// Result type alias for bamlens operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while decoding headers and records.
///
/// Only unrecoverable conditions surface here. A truncated trailing
/// record ends a scan silently (end-of-stream semantics), and
/// malformed-but-tolerable data such as reserved CIGAR operator codes or
/// garbled tag spans is logged and skipped rather than raised.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Buffer does not begin with the expected magic signature
    #[error("invalid magic signature: expected {expected:?}, got {actual:?}")]
    BadMagic {
        /// Signature required by the dialect being decoded
        expected: [u8; 4],
        /// Bytes actually found at the start of the buffer
        actual: [u8; 4],
    },

    /// Alternate-dialect header carries flags with no defined semantics
    #[error("unsupported header flags {flags:#010x} (must be zero)")]
    UnsupportedHeaderFlags {
        /// The nonzero flags word
        flags: u32,
    },

    /// A checked read would run past the end of the buffer
    #[error("read of {len} bytes at offset {offset} exceeds buffer length {buffer_len}")]
    OutOfBounds {
        /// Offset the read started at
        offset: usize,
        /// Number of bytes requested
        len: usize,
        /// Total length of the buffer
        buffer_len: usize,
    },

    /// A fixed-length text field was not valid UTF-8
    #[error("invalid UTF-8 in text field at offset {offset}")]
    InvalidText {
        /// Offset of the field in the buffer
        offset: usize,
    },
}
