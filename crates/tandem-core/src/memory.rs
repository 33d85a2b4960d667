//! In-memory linked session pair.
//!
//! Two [`MemorySession`] endpoints share one link. Messages sent from one
//! side arrive as [`SessionEvent`]s on the other side's channel, with the
//! sender's reply handler attached. Link flags (reachability, pairing, app
//! installation, support) are controlled from either end so tests and the
//! demo binary can script connectivity changes.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tandem_proto::MessageMap;
use tokio::sync::mpsc;

use crate::{
    error::TransportError,
    session::{
        ActivationState, DataReplyHandler, ErrorHandler, MessageReplyHandler, SessionEvent,
        SessionStatus, SessionTransport,
    },
};

/// A payload handed to a [`MemorySession`] for sending.
#[derive(Debug, Clone, PartialEq)]
pub enum SentRecord {
    /// Structured message
    Message(MessageMap),
    /// Raw bytes
    Data(Bytes),
}

/// One end of a linked pair: the transport and the events it produces.
pub struct LinkEndpoint {
    /// Transport for this device
    pub session: MemorySession,
    /// Inbound events for this device, to be fed to its manager
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

/// Factory for linked session pairs.
pub struct MemoryLink;

impl MemoryLink {
    /// Create a connected pair. The first endpoint is conventionally the
    /// host.
    ///
    /// Both sides start `NotActivated`, with the link reachable, paired,
    /// installed and supported. Activation completes only when driven via
    /// [`MemorySession::complete_activation`] unless auto-activation is on.
    pub fn pair() -> (LinkEndpoint, LinkEndpoint) {
        let (first_tx, first_rx) = mpsc::unbounded_channel();
        let (second_tx, second_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Mutex::new(LinkState {
            sides: [SideState::new(first_tx), SideState::new(second_tx)],
            reachable: true,
            paired: true,
            installed: true,
            supported: true,
            auto_activate: false,
        }));

        (
            LinkEndpoint {
                session: MemorySession { shared: Arc::clone(&shared), side: 0 },
                events: first_rx,
            },
            LinkEndpoint { session: MemorySession { shared, side: 1 }, events: second_rx },
        )
    }
}

struct SideState {
    activation: ActivationState,
    events: mpsc::UnboundedSender<SessionEvent>,
    sent: Vec<SentRecord>,
}

impl SideState {
    fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { activation: ActivationState::NotActivated, events, sent: Vec::new() }
    }
}

struct LinkState {
    sides: [SideState; 2],
    reachable: bool,
    paired: bool,
    installed: bool,
    supported: bool,
    auto_activate: bool,
}

/// One side of an in-memory link.
#[derive(Clone)]
pub struct MemorySession {
    shared: Arc<Mutex<LinkState>>,
    side: usize,
}

impl MemorySession {
    /// Set peer reachability for both directions.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Set the paired flag.
    pub fn set_paired(&self, paired: bool) {
        self.lock().paired = paired;
    }

    /// Set the companion-app-installed flag.
    pub fn set_companion_app_installed(&self, installed: bool) {
        self.lock().installed = installed;
    }

    /// Set whether the link reports itself supported.
    pub fn set_supported(&self, supported: bool) {
        self.lock().supported = supported;
    }

    /// Complete activation immediately whenever [`SessionTransport::activate`]
    /// is called, on either side.
    pub fn set_auto_activate(&self, auto: bool) {
        self.lock().auto_activate = auto;
    }

    /// Finish an activation on this side and emit the completion event.
    pub fn complete_activation(&self, state: ActivationState) {
        let events = {
            let mut link = self.lock();
            link.sides[self.side].activation = state;
            link.sides[self.side].events.clone()
        };

        // Nobody listening is fine: the manager may already be gone
        let _ = events.send(SessionEvent::ActivationCompleted { state, error: None });
    }

    /// Deactivate this side and emit [`SessionEvent::Deactivated`].
    pub fn deactivate(&self) {
        let events = {
            let mut link = self.lock();
            link.sides[self.side].activation = ActivationState::NotActivated;
            link.sides[self.side].events.clone()
        };

        let _ = events.send(SessionEvent::Deactivated);
    }

    /// Every payload this side was asked to send, in order.
    pub fn sent_log(&self) -> Vec<SentRecord> {
        self.lock().sides[self.side].sent.clone()
    }

    fn peer(&self) -> usize {
        1 - self.side
    }

    /// Record an outbound payload and resolve where it goes.
    fn route(
        &self,
        record: SentRecord,
    ) -> Result<mpsc::UnboundedSender<SessionEvent>, TransportError> {
        let mut link = self.lock();
        link.sides[self.side].sent.push(record);

        if !link.sides[self.side].activation.is_activated() {
            return Err(TransportError::Rejected("session not activated".to_string()));
        }
        if !link.reachable {
            return Err(TransportError::NotReachable);
        }
        Ok(link.sides[self.peer()].events.clone())
    }

    fn lock(&self) -> MutexGuard<'_, LinkState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn fail(error: Option<ErrorHandler>, reason: TransportError) {
    tracing::debug!(%reason, "memory link send failed");
    if let Some(handler) = error {
        handler(reason);
    }
}

impl SessionStatus for MemorySession {
    fn activation_state(&self) -> ActivationState {
        self.lock().sides[self.side].activation
    }

    fn is_reachable(&self) -> bool {
        self.lock().reachable
    }

    fn is_paired(&self) -> bool {
        self.lock().paired
    }

    fn is_companion_app_installed(&self) -> bool {
        self.lock().installed
    }
}

impl SessionTransport for MemorySession {
    fn is_supported(&self) -> bool {
        self.lock().supported
    }

    fn activate(&self) {
        let auto = {
            let mut link = self.lock();
            // A completion for this side is already on its way
            if link.sides[self.side].activation.is_activated() {
                return;
            }
            link.sides[self.side].activation = ActivationState::Activating;
            link.auto_activate
        };

        if auto {
            self.complete_activation(ActivationState::Activated);
        }
    }

    fn send_message(
        &self,
        message: MessageMap,
        reply: Option<MessageReplyHandler>,
        error: Option<ErrorHandler>,
    ) {
        let peer = match self.route(SentRecord::Message(message.clone())) {
            Ok(peer) => peer,
            Err(reason) => return fail(error, reason),
        };

        if peer.send(SessionEvent::Message { message, reply }).is_err() {
            fail(error, TransportError::Closed);
        }
    }

    fn send_data(&self, data: Bytes, reply: Option<DataReplyHandler>, error: Option<ErrorHandler>) {
        let peer = match self.route(SentRecord::Data(data.clone())) {
            Ok(peer) => peer,
            Err(reason) => return fail(error, reason),
        };

        if peer.send(SessionEvent::Data { data, reply }).is_err() {
            fail(error, TransportError::Closed);
        }
    }
}
