//! Connectivity manager.
//!
//! The single authority for outbound sends to the paired device, and the only
//! place that decides between immediate delivery, deferral, and drop.
//!
//! # Ordering
//!
//! Sends are decided under one lock and appended to an outbox. A single
//! flusher drains the outbox into the transport with the lock released, so
//! handlers that send again from inside a transport callback cannot deadlock
//! and cannot overtake earlier sends. Appending to the pending queue and
//! draining it on activation happen under the same lock.
//!
//! # Invariants
//!
//! - Pending messages replay exactly once, in enqueue order, when the session
//!   reports `Activated`. The queue is empty afterwards.
//! - A send made without `queue_if_necessary` never enters the queue.
//! - Unreachable or gated sends are dropped with a log. Error handlers are
//!   only ever invoked by the transport.

#![allow(clippy::disallowed_types, reason = "Synchronous locking only, never held across await")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bytes::Bytes;
use tandem_proto::MessageMap;
use tokio::sync::mpsc;

use crate::{
    behavior::{ConnectivityBehavior, dispatch_data, dispatch_message},
    error::{ConnectivityError, TransportError},
    session::{ActivationState, ErrorHandler, SessionEvent, SessionTransport},
};

/// Options for a single send.
///
/// `T` is the reply payload type: [`MessageMap`] for structured sends,
/// [`Bytes`] for raw sends.
pub struct SendOptions<T> {
    queue_if_necessary: bool,
    reply: Option<Box<dyn FnOnce(T) + Send>>,
    error: Option<ErrorHandler>,
}

impl<T> Default for SendOptions<T> {
    fn default() -> Self {
        Self { queue_if_necessary: false, reply: None, error: None }
    }
}

impl<T> SendOptions<T> {
    /// Queue the send if the session is not activated yet.
    #[must_use]
    pub fn queue_if_necessary(mut self) -> Self {
        self.queue_if_necessary = true;
        self
    }

    /// Handler for the peer's reply.
    #[must_use]
    pub fn on_reply(mut self, handler: impl FnOnce(T) + Send + 'static) -> Self {
        self.reply = Some(Box::new(handler));
        self
    }

    /// Handler for a transport-reported failure.
    #[must_use]
    pub fn on_error(mut self, handler: impl FnOnce(TransportError) + Send + 'static) -> Self {
        self.error = Some(Box::new(handler));
        self
    }
}

/// Result of a send attempt, as decided by the manager.
///
/// `Sent` means the transport was handed the payload. Delivery itself is
/// reported only through the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the transport.
    Sent,
    /// Held until the session activates.
    Queued,
    /// Dropped without invoking any handler.
    Dropped(DropReason),
}

/// Why a send was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Session not activated and the caller did not ask for queueing.
    NotActivated,
    /// Peer not reachable.
    Unreachable,
    /// Installed behavior's send gate refused.
    Gated,
}

enum Payload {
    Message { message: MessageMap, reply: Option<Box<dyn FnOnce(MessageMap) + Send>> },
    Data { data: Bytes, reply: Option<Box<dyn FnOnce(Bytes) + Send>> },
}

/// A send deferred until activation, or waiting in the outbox.
///
/// Owns its payload and handlers. Map and bytes payloads are mutually
/// exclusive.
struct PendingMessage {
    payload: Payload,
    error: Option<ErrorHandler>,
}

impl PendingMessage {
    fn kind(&self) -> &'static str {
        match self.payload {
            Payload::Message { .. } => "message",
            Payload::Data { .. } => "data",
        }
    }
}

#[derive(Default)]
struct ManagerState {
    pending: VecDeque<PendingMessage>,
    outbox: VecDeque<PendingMessage>,
    flushing: bool,
    activated: bool,
}

/// Owns the session transport and mediates all traffic over it.
pub struct ConnectivityManager<T: SessionTransport> {
    transport: T,
    state: Mutex<ManagerState>,
    behavior: Mutex<Option<Arc<dyn ConnectivityBehavior>>>,
}

impl<T: SessionTransport> ConnectivityManager<T> {
    /// Take ownership of `transport` and start activation.
    ///
    /// # Errors
    ///
    /// - `ConnectivityError::TransportUnsupported` if the host has no
    ///   paired-device capability. Callers continue without peer messaging.
    pub fn new(transport: T) -> Result<Self, ConnectivityError> {
        if !transport.is_supported() {
            return Err(ConnectivityError::TransportUnsupported);
        }

        let manager = Self {
            transport,
            state: Mutex::new(ManagerState::default()),
            behavior: Mutex::new(None),
        };
        manager.transport.activate();
        Ok(manager)
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Install `behavior`, replacing any previous one.
    pub fn set_behavior(
        &self,
        behavior: Arc<dyn ConnectivityBehavior>,
    ) -> Option<Arc<dyn ConnectivityBehavior>> {
        self.lock_behavior().replace(behavior)
    }

    /// Remove the installed behavior. Inbound traffic is then dropped.
    pub fn clear_behavior(&self) -> Option<Arc<dyn ConnectivityBehavior>> {
        self.lock_behavior().take()
    }

    /// Number of sends waiting for activation.
    pub fn pending_len(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Send a structured message to the peer.
    pub fn send(&self, message: MessageMap, options: SendOptions<MessageMap>) -> SendOutcome {
        let SendOptions { queue_if_necessary, reply, error } = options;
        let item = PendingMessage { payload: Payload::Message { message, reply }, error };
        self.submit(item, queue_if_necessary)
    }

    /// Send raw bytes to the peer. Queues and replays like [`Self::send`].
    pub fn send_data(&self, data: Bytes, options: SendOptions<Bytes>) -> SendOutcome {
        let SendOptions { queue_if_necessary, reply, error } = options;
        let item = PendingMessage { payload: Payload::Data { data, reply }, error };
        self.submit(item, queue_if_necessary)
    }

    /// Apply one inbound session event.
    pub fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::ActivationCompleted { state, error } => {
                self.activation_completed(state, error);
            },
            SessionEvent::BecameInactive => {
                self.lock_state().activated = false;
                tracing::debug!("session became inactive");
            },
            SessionEvent::Deactivated => {
                self.lock_state().activated = false;
                tracing::info!("session deactivated, reactivating");
                self.transport.activate();
            },
            SessionEvent::Message { message, reply } => match self.current_behavior() {
                Some(behavior) => dispatch_message(behavior.as_ref(), message, reply),
                None => tracing::debug!("no behavior installed, dropping inbound message"),
            },
            SessionEvent::Data { data, reply } => match self.current_behavior() {
                Some(behavior) => dispatch_data(behavior.as_ref(), data, reply),
                None => tracing::debug!("no behavior installed, dropping inbound data"),
            },
        }
    }

    /// Consume the transport's event stream until it closes.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }

        tracing::debug!("session event stream closed");
    }

    fn submit(&self, item: PendingMessage, queue_if_necessary: bool) -> SendOutcome {
        let outcome = {
            let mut state = self.lock_state();
            if !(state.activated && self.transport.activation_state().is_activated()) {
                if queue_if_necessary {
                    tracing::debug!(
                        kind = item.kind(),
                        queued = state.pending.len() + 1,
                        "session inactive, queueing send"
                    );
                    state.pending.push_back(item);
                    SendOutcome::Queued
                } else {
                    tracing::debug!(kind = item.kind(), "session inactive, dropping send");
                    SendOutcome::Dropped(DropReason::NotActivated)
                }
            } else if let Some(reason) = self.gate() {
                tracing::warn!(kind = item.kind(), ?reason, "session not sendable, dropping send");
                SendOutcome::Dropped(reason)
            } else {
                state.outbox.push_back(item);
                SendOutcome::Sent
            }
        };

        if outcome == SendOutcome::Sent {
            self.flush();
        }
        outcome
    }

    fn activation_completed(&self, state: ActivationState, error: Option<TransportError>) {
        if let Some(error) = &error {
            tracing::warn!(%error, ?state, "activation reported an error");
        }

        if !state.is_activated() {
            tracing::debug!(?state, "activation completed without activating");
            return;
        }

        {
            let mut guard = self.lock_state();
            guard.activated = true;

            let pending = std::mem::take(&mut guard.pending);
            if !pending.is_empty() {
                tracing::info!(count = pending.len(), "replaying pending sends");
            }

            for item in pending {
                match self.gate() {
                    Some(reason) => {
                        tracing::warn!(
                            kind = item.kind(),
                            ?reason,
                            "dropping pending send on replay"
                        );
                    },
                    None => guard.outbox.push_back(item),
                }
            }
        }

        self.flush();
    }

    /// Reason to drop an otherwise sendable message, if any.
    ///
    /// Called with the state lock held; behaviors must not send from their
    /// gate.
    fn gate(&self) -> Option<DropReason> {
        if !self.transport.is_reachable() {
            return Some(DropReason::Unreachable);
        }

        match self.current_behavior() {
            Some(behavior) if !behavior.should_send(&self.transport) => Some(DropReason::Gated),
            _ => None,
        }
    }

    /// Hand outbox entries to the transport, oldest first.
    ///
    /// Only one caller flushes at a time. Entries appended while a flush is in
    /// progress, including from transport callbacks, are picked up by the
    /// active flusher.
    fn flush(&self) {
        {
            let mut state = self.lock_state();
            if state.flushing {
                return;
            }
            state.flushing = true;
        }

        loop {
            let next = {
                let mut state = self.lock_state();
                match state.outbox.pop_front() {
                    Some(item) => item,
                    None => {
                        state.flushing = false;
                        return;
                    },
                }
            };

            let PendingMessage { payload, error } = next;
            match payload {
                Payload::Message { message, reply } => {
                    self.transport.send_message(message, reply, error);
                },
                Payload::Data { data, reply } => self.transport.send_data(data, reply, error),
            }
        }
    }

    fn current_behavior(&self) -> Option<Arc<dyn ConnectivityBehavior>> {
        self.lock_behavior().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_behavior(&self) -> MutexGuard<'_, Option<Arc<dyn ConnectivityBehavior>>> {
        self.behavior.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
