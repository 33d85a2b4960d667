//! Asset fetcher serving canned bodies.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, PoisonError},
};

use bytes::Bytes;
use tandem_app::{AssetFetcher, FetchError};

/// Smallest body that passes the JPEG check.
pub const TINY_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

/// Serves registered URLs; every other URL fails with a 404.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Bytes>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Fetcher with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    #[must_use]
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AssetFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).push(url.to_string());
        let body =
            self.bodies.get(url).cloned().ok_or_else(|| FetchError::Http(format!("404 for {url}")));
        std::future::ready(body)
    }
}
