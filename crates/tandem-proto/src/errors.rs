//! Decode and codec errors.
//!
//! A failed decode is an ordinary value, not an exceptional path: callers
//! multiplexing inbound traffic try one decoder after another and treat the
//! final error as "unhandled".

use thiserror::Error;

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while converting between typed messages and maps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Required key absent from the map
    #[error("missing key: {key}")]
    MissingKey {
        /// Key that was expected
        key: &'static str,
    },

    /// Key present but holding the wrong kind of value
    #[error("unexpected type for key {key}: expected {expected}")]
    UnexpectedType {
        /// Offending key
        key: &'static str,
        /// Kind of value that was expected
        expected: &'static str,
    },

    /// Key holds a string outside the closed set of known values
    #[error("unknown value for key {key}: {value:?}")]
    UnknownValue {
        /// Offending key
        key: &'static str,
        /// Value that could not be interpreted
        value: String,
    },

    /// Discriminator names a different command than the decoder handles
    #[error("command mismatch: expected {expected}, got {actual}")]
    CommandMismatch {
        /// Command the decoder handles
        expected: &'static str,
        /// Command found in the map
        actual: String,
    },

    /// Map matched none of the known message shapes
    #[error("unrecognized message with keys {keys:?}")]
    Unrecognized {
        /// Keys present in the map
        keys: Vec<String>,
    },

    /// CBOR serialization failed
    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed
    #[error("CBOR decode failed: {0}")]
    CborDecode(String),

    /// Encoded message exceeds the link's size limit
    #[error("message too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Actual size in bytes
        size: usize,
        /// Maximum permitted size
        max: usize,
    },
}
