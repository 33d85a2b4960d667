//! Error types for the connectivity layer.
//!
//! Three families, kept separate because callers handle them differently:
//! construction errors disable peer messaging entirely, transport errors are
//! forwarded to a sender's error handler, and store errors surface from the
//! settings backend.

use thiserror::Error;

/// Errors raised when building a [`crate::ConnectivityManager`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    /// The host has no paired-device capability at all.
    ///
    /// Callers proceed without peer messaging.
    #[error("session transport is not supported on this device")]
    TransportUnsupported,
}

/// Errors reported by a transport for an attempted send.
///
/// Forwarded verbatim to the caller's error handler, if one was supplied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Peer went away between the reachability check and delivery
    #[error("peer is not reachable")]
    NotReachable,

    /// Peer side of the link no longer accepts messages
    #[error("session closed")]
    Closed,

    /// Transport refused the payload
    #[error("send rejected: {0}")]
    Rejected(String),
}

/// Errors from a settings backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend I/O failed
    #[error("store I/O error: {0}")]
    Io(String),

    /// Stored bytes could not be interpreted
    #[error("corrupt setting {key}: {reason}")]
    Corrupt {
        /// Setting key
        key: String,
        /// What was wrong with the stored value
        reason: String,
    },
}
