//! Wire protocol error types.

use thiserror::Error;

/// Wire-level decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Buffer ended in the middle of a tag or value
    #[error("truncated message")]
    Truncated,

    /// Varint longer than 10 bytes or wider than 64 bits
    #[error("malformed varint")]
    MalformedVarint,

    /// Wire type outside {0, 1, 2, 5}
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),

    /// Field number of zero or above the 29-bit limit
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),
}
