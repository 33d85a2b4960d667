//! HTTP attachment fetcher.

use std::{future::Future, time::Duration};

use bytes::Bytes;
use tandem_app::{AssetFetcher, FetchError};

/// Default per-request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches attachment images over HTTPS with reqwest.
///
/// Non-success statuses are errors; the body is returned unchecked and the
/// caller decides whether it is an image.
#[derive(Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    /// Fetcher with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl AssetFetcher for HttpAssetFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
        let request = self.client.get(url);
        async move {
            let response = request.send().await.map_err(|e| FetchError::Http(e.to_string()))?;
            let response =
                response.error_for_status().map_err(|e| FetchError::Http(e.to_string()))?;
            response.bytes().await.map_err(|e| FetchError::Http(e.to_string()))
        }
    }
}
