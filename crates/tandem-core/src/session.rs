//! Session transport abstraction.
//!
//! A [`SessionTransport`] wraps the point-to-point link to the paired device.
//! Outbound sends are commands issued to the transport; inbound traffic and
//! lifecycle changes arrive as a single ordered stream of [`SessionEvent`]s
//! consumed by the [`crate::ConnectivityManager`].
//!
//! # Invariants
//!
//! - Delivery is at most once. Transports never retry.
//! - A reply or error handler is invoked at most once per send.
//! - Transports never hold internal locks while invoking handlers.

use std::fmt;

use bytes::Bytes;
use tandem_proto::MessageMap;

use crate::error::TransportError;

/// Completion handler for a map reply.
pub type MessageReplyHandler = Box<dyn FnOnce(MessageMap) + Send>;

/// Completion handler for a bytes reply.
pub type DataReplyHandler = Box<dyn FnOnce(Bytes) + Send>;

/// Handler for a transport-reported send failure.
pub type ErrorHandler = Box<dyn FnOnce(TransportError) + Send>;

/// Transport activation lifecycle.
///
/// Activation is a readiness gate. It is independent of whether the peer is
/// currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivationState {
    /// Not activated yet, or deactivated.
    #[default]
    NotActivated,
    /// Activation requested, completion pending.
    Activating,
    /// Ready for sends.
    Activated,
}

impl ActivationState {
    /// Returns `true` for [`ActivationState::Activated`].
    #[must_use]
    pub const fn is_activated(self) -> bool {
        matches!(self, Self::Activated)
    }
}

/// Read-only view of a session's status.
///
/// Send gates receive this rather than the full transport so they cannot
/// issue sends themselves.
pub trait SessionStatus {
    /// Current activation state.
    fn activation_state(&self) -> ActivationState;

    /// Whether the peer is connected right now. Polled per send.
    fn is_reachable(&self) -> bool;

    /// Whether a companion device is paired. Only meaningful on the host.
    fn is_paired(&self) -> bool;

    /// Whether the companion app is installed. Only meaningful on the host.
    fn is_companion_app_installed(&self) -> bool;
}

/// Point-to-point session to the paired device.
pub trait SessionTransport: SessionStatus + Send + Sync {
    /// Whether this host has paired-device capability at all.
    fn is_supported(&self) -> bool;

    /// Begin activation.
    ///
    /// Completion is reported later as [`SessionEvent::ActivationCompleted`].
    fn activate(&self);

    /// Send a structured message.
    ///
    /// `reply` fires if the peer answers; `error` fires if the transport
    /// reports a failure. Neither fires for a fire-and-forget send the peer
    /// ignores.
    fn send_message(
        &self,
        message: MessageMap,
        reply: Option<MessageReplyHandler>,
        error: Option<ErrorHandler>,
    );

    /// Send raw bytes. Same delivery semantics as
    /// [`SessionTransport::send_message`].
    fn send_data(&self, data: Bytes, reply: Option<DataReplyHandler>, error: Option<ErrorHandler>);
}

/// Inbound events from the transport, consumed in order.
pub enum SessionEvent {
    /// Activation finished, successfully or not.
    ActivationCompleted {
        /// Resulting state
        state: ActivationState,
        /// Failure reported alongside the completion
        error: Option<TransportError>,
    },

    /// Session is about to go inactive (for example, switching paired
    /// devices).
    BecameInactive,

    /// Session deactivated. The manager reactivates immediately.
    Deactivated,

    /// Structured message from the peer. `reply` is present when the sender
    /// expects an answer.
    Message {
        /// Message payload
        message: MessageMap,
        /// Reply channel back to the sender
        reply: Option<MessageReplyHandler>,
    },

    /// Raw bytes from the peer.
    Data {
        /// Payload
        data: Bytes,
        /// Reply channel back to the sender
        reply: Option<DataReplyHandler>,
    },
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActivationCompleted { state, error } => f
                .debug_struct("ActivationCompleted")
                .field("state", state)
                .field("error", error)
                .finish(),
            Self::BecameInactive => f.write_str("BecameInactive"),
            Self::Deactivated => f.write_str("Deactivated"),
            Self::Message { message, reply } => f
                .debug_struct("Message")
                .field("message", message)
                .field("wants_reply", &reply.is_some())
                .finish(),
            Self::Data { data, reply } => f
                .debug_struct("Data")
                .field("len", &data.len())
                .field("wants_reply", &reply.is_some())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_activated_counts_as_activated() {
        assert!(ActivationState::Activated.is_activated());
        assert!(!ActivationState::Activating.is_activated());
        assert!(!ActivationState::NotActivated.is_activated());
    }

    #[test]
    fn debug_hides_handlers() {
        let event = SessionEvent::Data { data: Bytes::from_static(b"abc"), reply: None };
        assert_eq!(format!("{event:?}"), "Data { len: 3, wants_reply: false }");
    }
}
