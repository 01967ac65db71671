//! Error types for the record container and its payload codec.

use thiserror::Error;

/// Errors raised while writing or reading container records.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a record's framing or payload.
    #[error("truncated record: {0}")]
    Truncated(&'static str),

    /// A stored checksum does not match the value recomputed from the bytes read.
    #[error("{section} checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Framing section that failed: `"length"` or `"payload"`.
        section: &'static str,
        /// Checksum stored in the file.
        stored: u32,
        /// Checksum recomputed from the bytes read.
        computed: u32,
    },

    /// A length prefix larger than any record this crate writes or accepts.
    #[error("record length {0} exceeds the supported maximum")]
    Oversized(u64),

    /// The payload bytes are not a well-formed feature mapping.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}
