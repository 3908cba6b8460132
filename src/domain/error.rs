//! Decoding errors for on-chain payloads.
//!
//! Log payloads and call returns arrive as hex-encoded words; these errors
//! cover the ways that encoding can be malformed. Callers must not assume
//! input is always well-formed.

use thiserror::Error;

/// Errors that occur while decoding on-chain data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not valid hex.
    #[error("invalid hex payload: {value}")]
    InvalidHex { value: String },

    /// The payload holds fewer 32-byte words than the event requires.
    #[error("truncated payload: expected {expected} words, got {got}")]
    TruncatedData { expected: usize, got: usize },

    /// A numeric string is neither a hex quantity nor a decimal integer.
    #[error("invalid numeric value: {value}")]
    InvalidNumeric { value: String },

    /// The decoded value does not fit the target representation.
    #[error("value out of range: {value}")]
    ValueOutOfRange { value: String },

    /// A label does not name a known price-event topic.
    #[error("unknown price topic: {label}")]
    UnknownTopic { label: String },
}
