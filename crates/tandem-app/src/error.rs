//! App-layer errors.
//!
//! None of these reach the user. Callers log them and degrade: a rejected
//! notification is simply not scheduled, a failed fetch hides the image.

use thiserror::Error;

/// Errors from the platform notification center.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CenterError {
    /// The center refused a request.
    #[error("notification request {identifier} rejected: {reason}")]
    Rejected {
        /// Request identifier
        identifier: String,
        /// Reason given by the center
        reason: String,
    },
}

/// Errors while fetching a notification attachment image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Identifier cannot form a valid asset path
    #[error("invalid attachment identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Request failed or returned a non-success status
    #[error("asset request failed: {0}")]
    Http(String),

    /// Body is not a decodable image
    #[error("asset is not a JPEG image")]
    NotAnImage,
}
