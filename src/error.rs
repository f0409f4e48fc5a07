//! Error types for ctlwire.

use thiserror::Error;

/// Main error type for all control-plane operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The channel has no established connection.
    #[error("channel is not connected")]
    NotConnected,

    /// Unknown operation code, or an operation with no schema for the
    /// requested direction.
    #[error("no such operation: {0}")]
    InvalidOperation(i64),

    /// Supplied value list does not match the schema positionally.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A field value the wire format cannot represent (e.g. a string
    /// with an embedded NUL, or non-UTF-8 string bytes on decode).
    #[error("invalid field value: {0}")]
    InvalidValue(String),

    /// Destination buffer cannot hold the measured encoding.
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    /// Decode ran out of bytes before the schema was satisfied.
    #[error("message truncated")]
    Truncated,

    /// Channel read failed or returned a malformed frame.
    #[error("network read failed: {0}")]
    NetRead(String),

    /// Channel write failed.
    #[error("network write failed: {0}")]
    NetWrite(String),

    /// Announce handshake named a catalog version other than ours.
    #[error("catalog version mismatch: ours {ours}, peer {theirs}")]
    CatalogVersion { ours: u32, theirs: u32 },

    /// I/O error during socket setup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (announce handshake only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ControlError.
pub type Result<T> = std::result::Result<T, ControlError>;
