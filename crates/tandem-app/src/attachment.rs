//! Primary notification view and its attachment image.
//!
//! A primary-mode notification may name an attachment in its user info. The
//! view fetches `https://{host}/{identifier}-Watch.jpg` and shows the image
//! only if the body decodes as a JPEG. The platform waits on a completion
//! signal before presenting the view; [`CompletionGuard`] fires it exactly
//! once on every path, including cancellation of the load future.

use std::future::Future;

use bytes::Bytes;

use crate::{
    error::FetchError,
    notification::{Notification, format_timestamp},
};

/// Default host serving attachment images.
pub const DEFAULT_ASSET_HOST: &str = "room45.co";

/// Asset URL for an attachment identifier.
///
/// # Errors
///
/// - `FetchError::InvalidIdentifier` if the identifier is empty or contains
///   characters that would escape the path segment.
pub fn attachment_url(host: &str, identifier: &str) -> Result<String, FetchError> {
    let valid = !identifier.is_empty()
        && identifier.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(FetchError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(format!("https://{host}/{identifier}-Watch.jpg"))
}

/// Whether `data` starts with a JPEG start-of-image marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8, 0xFF])
}

/// Fetches attachment bytes.
pub trait AssetFetcher: Send + Sync {
    /// Fetch the body at `url`.
    ///
    /// # Errors
    ///
    /// - `FetchError::Http` on transport failure or a non-success status.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// Fires a completion callback exactly once, at the latest on drop.
pub struct CompletionGuard<F: FnOnce()> {
    completion: Option<F>,
}

impl<F: FnOnce()> CompletionGuard<F> {
    /// Guard `completion`.
    pub fn new(completion: F) -> Self {
        Self { completion: Some(completion) }
    }

    /// Fire now instead of on drop.
    pub fn complete(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion();
        }
    }
}

impl<F: FnOnce()> Drop for CompletionGuard<F> {
    fn drop(&mut self) {
        self.fire();
    }
}

/// Image slot of the primary notification view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    /// Decoded image bytes
    Shown(Bytes),
    /// No attachment, failed fetch, or undecodable body
    Hidden,
}

/// Content of the primary-mode notification view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryNotificationView {
    /// Notification body
    pub body: String,
    /// Delivery date label
    pub date: String,
    /// Attachment image
    pub image: ImageState,
}

/// Build the primary notification view, fetching its attachment if any.
///
/// `completion` fires exactly once, after the image state is decided or when
/// the future is dropped part-way through the fetch.
pub async fn load_primary_notification<A, F>(
    fetcher: &A,
    asset_host: &str,
    notification: &Notification,
    completion: F,
) -> PrimaryNotificationView
where
    A: AssetFetcher,
    F: FnOnce() + Send,
{
    let guard = CompletionGuard::new(completion);
    let content = &notification.request.content;
    let mut view = PrimaryNotificationView {
        body: content.body.clone(),
        date: format_timestamp(notification.delivered_at),
        image: ImageState::Hidden,
    };

    let Some(identifier) = content.attachment_identifier() else {
        return view;
    };

    match fetch_image(fetcher, asset_host, identifier).await {
        Ok(image) => view.image = ImageState::Shown(image),
        Err(error) => tracing::warn!(%error, identifier, "attachment image unavailable"),
    }

    guard.complete();
    view
}

async fn fetch_image<A: AssetFetcher>(
    fetcher: &A,
    host: &str,
    identifier: &str,
) -> Result<Bytes, FetchError> {
    let url = attachment_url(host, identifier)?;
    let data = fetcher.fetch(&url).await?;
    if is_jpeg(&data) { Ok(data) } else { Err(FetchError::NotAnImage) }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_types, reason = "Test fetcher records calls with std locks")]

    use std::{
        collections::BTreeMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;
    use crate::notification::{
        ATTACHMENT_IDENTIFIER_KEY, NotificationContent, NotificationRequest, Trigger,
    };

    struct FixedFetcher {
        body: Result<Bytes, FetchError>,
        requested: Mutex<Vec<String>>,
    }

    impl FixedFetcher {
        fn new(body: Result<Bytes, FetchError>) -> Self {
            Self { body, requested: Mutex::new(Vec::new()) }
        }
    }

    impl AssetFetcher for FixedFetcher {
        fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
            self.requested.lock().unwrap().push(url.to_string());
            let body = self.body.clone();
            async move { body }
        }
    }

    fn notification(attachment: Option<&str>) -> Notification {
        let user_info: BTreeMap<_, _> = attachment
            .map(|id| (ATTACHMENT_IDENTIFIER_KEY.to_string(), id.to_string()))
            .into_iter()
            .collect();
        Notification {
            request: NotificationRequest {
                identifier: "n-1".to_string(),
                content: NotificationContent {
                    title: "Local Notification".to_string(),
                    body: "Notification Body".to_string(),
                    category_identifier: "primaryMode".to_string(),
                    user_info,
                },
                trigger: Trigger::once(Duration::from_secs(10)),
            },
            delivered_at: 1_484_000_000,
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    #[test]
    fn url_uses_watch_suffix() {
        assert_eq!(
            attachment_url(DEFAULT_ASSET_HOST, "GeneralOrgana").unwrap(),
            "https://room45.co/GeneralOrgana-Watch.jpg"
        );
    }

    #[test]
    fn url_rejects_path_escapes() {
        for bad in ["", "a/b", "a b", "x?y", "#"] {
            let expected = Err(FetchError::InvalidIdentifier(bad.to_string()));
            assert_eq!(attachment_url("h", bad), expected);
        }
    }

    #[test]
    fn guard_fires_once_on_drop() {
        let (count, completion) = counter();
        drop(CompletionGuard::new(completion));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_fires_once_when_completed_early() {
        let (count, completion) = counter();
        CompletionGuard::new(completion).complete();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn jpeg_attachment_is_shown() {
        let fetcher = FixedFetcher::new(Ok(Bytes::from_static(JPEG)));
        let (count, completion) = counter();

        let delivered = notification(Some("GeneralOrgana"));
        let view = load_primary_notification(&fetcher, "assets.test", &delivered, completion).await;

        assert_eq!(view.image, ImageState::Shown(Bytes::from_static(JPEG)));
        assert_eq!(view.body, "Notification Body");
        assert_eq!(view.date, "2017-01-09 22:13");
        let requested = fetcher.requested.lock().unwrap().clone();
        assert_eq!(requested, vec!["https://assets.test/GeneralOrgana-Watch.jpg"]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecodable_body_hides_image() {
        let fetcher = FixedFetcher::new(Ok(Bytes::from_static(b"<html>")));
        let (count, completion) = counter();

        let view =
            load_primary_notification(&fetcher, "h", &notification(Some("x")), completion).await;

        assert_eq!(view.image, ImageState::Hidden);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_hides_image() {
        let fetcher = FixedFetcher::new(Err(FetchError::Http("status 404".to_string())));
        let (count, completion) = counter();

        let view =
            load_primary_notification(&fetcher, "h", &notification(Some("x")), completion).await;

        assert_eq!(view.image, ImageState::Hidden);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_attachment_skips_fetch() {
        let fetcher = FixedFetcher::new(Ok(Bytes::from_static(JPEG)));
        let (count, completion) = counter();

        let view = load_primary_notification(&fetcher, "h", &notification(None), completion).await;

        assert_eq!(view.image, ImageState::Hidden);
        assert!(fetcher.requested.lock().unwrap().is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    struct StalledFetcher;

    impl AssetFetcher for StalledFetcher {
        fn fetch(&self, _url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn cancelled_load_still_completes() {
        let (count, completion) = counter();
        let note = notification(Some("x"));

        let load = load_primary_notification(&StalledFetcher, "h", &note, completion);
        let timed_out = tokio::time::timeout(Duration::from_millis(10), load).await;

        assert!(timed_out.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
