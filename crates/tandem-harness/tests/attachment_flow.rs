//! Host-scheduled notifications rendered through the primary view.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tandem_app::{
    DEFAULT_ASSET_HOST, DEFAULT_ATTACHMENT_IDENTIFIER, HostEvent, ImageState, Notification,
    attachment_url, load_primary_notification,
};
use tandem_harness::{SimPair, StaticFetcher, TINY_JPEG};

fn delivered_host_notification(seed: u64) -> Notification {
    let mut pair = SimPair::new(seed).unwrap();
    pair.host.launch().unwrap();
    pair.host.dispatch(HostEvent::SendKnownNotification).unwrap();
    pair.env.advance(Duration::from_secs(10));

    let mut delivered = pair.host_center.deliver_due();
    assert_eq!(delivered.len(), 1);
    delivered.remove(0)
}

#[tokio::test]
async fn known_notification_shows_attachment() {
    let notification = delivered_host_notification(1);
    let url = attachment_url(DEFAULT_ASSET_HOST, DEFAULT_ATTACHMENT_IDENTIFIER).unwrap();
    let fetcher = StaticFetcher::new().with_body(url.clone(), TINY_JPEG);
    let completions = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&completions);
    let view = load_primary_notification(&fetcher, DEFAULT_ASSET_HOST, &notification, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .await;

    assert_eq!(view.body, "Notification Body");
    assert_eq!(view.image, ImageState::Shown(TINY_JPEG.into()));
    assert_eq!(fetcher.requested(), vec![url]);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_asset_hides_image() {
    let notification = delivered_host_notification(2);
    let fetcher = StaticFetcher::new();

    let view = load_primary_notification(&fetcher, DEFAULT_ASSET_HOST, &notification, || {}).await;

    assert_eq!(view.image, ImageState::Hidden);
    assert_eq!(fetcher.requested().len(), 1);
}

#[tokio::test]
async fn non_jpeg_body_hides_image() {
    let notification = delivered_host_notification(3);
    let url = attachment_url(DEFAULT_ASSET_HOST, DEFAULT_ATTACHMENT_IDENTIFIER).unwrap();
    let fetcher = StaticFetcher::new().with_body(url, &b"<html>not found</html>"[..]);

    let view = load_primary_notification(&fetcher, DEFAULT_ASSET_HOST, &notification, || {}).await;

    assert_eq!(view.image, ImageState::Hidden);
}
