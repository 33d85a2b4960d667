//! Device errors.

use tandem_core::StoreError;
use thiserror::Error;

/// Errors that stop a demo run before it starts.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Settings database could not be opened
    #[error("settings store: {0}")]
    Store(#[from] StoreError),
}
