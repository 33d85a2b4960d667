//! Hand-off to the UI-owning context.
//!
//! Screen state is only mutated by the runtime that owns it. Anything running
//! elsewhere (transport callbacks, reply handlers, fetch completions) posts an
//! event through a [`UiHandle`] instead of touching state directly.

use tokio::sync::mpsc;

/// Sender half of a UI event queue. Cheap to clone.
#[derive(Debug)]
pub struct UiHandle<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E> Clone for UiHandle<E> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<E: Send + 'static> UiHandle<E> {
    /// Post an event. Returns `false` if the UI has shut down.
    pub fn post(&self, event: E) -> bool {
        let delivered = self.tx.send(event).is_ok();
        if !delivered {
            tracing::debug!("UI context closed, dropping event");
        }
        delivered
    }
}

/// Create a UI event queue.
pub fn ui_channel<E>() -> (UiHandle<E>, mpsc::UnboundedReceiver<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, rx)
}
