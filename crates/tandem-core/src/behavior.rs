//! Pluggable per-role reactions to inbound traffic.
//!
//! A [`ConnectivityBehavior`] is installed on the manager (exactly one at a
//! time). Every method is required; a behavior that does not recognize a
//! payload returns [`Disposition::Unhandled`] and the dispatcher applies the
//! base case in [`dispatch_message`] / [`dispatch_data`].

use bytes::Bytes;
use tandem_proto::MessageMap;

use crate::session::{DataReplyHandler, MessageReplyHandler, SessionStatus};

/// Whether a behavior consumed an inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Payload was recognized and handled.
    Handled,
    /// Payload is outside this behavior's contract.
    Unhandled,
}

/// Role-specific connectivity policy.
pub trait ConnectivityBehavior: Send + Sync {
    /// Send gate, consulted for every live send and every replayed send.
    fn should_send(&self, session: &dyn SessionStatus) -> bool;

    /// Handle a structured message.
    fn on_message(&self, message: MessageMap, reply: Option<MessageReplyHandler>) -> Disposition;

    /// Handle raw bytes.
    fn on_data(&self, data: Bytes, reply: Option<DataReplyHandler>) -> Disposition;
}

/// Deliver a message and apply the base case for unhandled payloads.
pub fn dispatch_message(
    behavior: &dyn ConnectivityBehavior,
    message: MessageMap,
    reply: Option<MessageReplyHandler>,
) {
    let keys: Vec<String> = message.keys().cloned().collect();
    if behavior.on_message(message, reply) == Disposition::Unhandled {
        contract_violation("message", &keys);
    }
}

/// Deliver bytes and apply the base case for unhandled payloads.
pub fn dispatch_data(
    behavior: &dyn ConnectivityBehavior,
    data: Bytes,
    reply: Option<DataReplyHandler>,
) {
    let len = data.len();
    if behavior.on_data(data, reply) == Disposition::Unhandled {
        contract_violation("data", &[format!("{len} bytes")]);
    }
}

/// An inbound payload reached a behavior that declares no handling for it.
///
/// This is a programming error, not a network fault: panics in debug builds,
/// logs and continues in release.
#[allow(clippy::panic, reason = "Debug-only contract assertion")]
fn contract_violation(kind: &'static str, detail: &[String]) {
    tracing::error!(kind, ?detail, "unhandled inbound payload");
    if cfg!(debug_assertions) {
        panic!("unhandled inbound {kind}: {detail:?}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Fixed {
        disposition: Disposition,
        calls: AtomicUsize,
    }

    impl ConnectivityBehavior for Fixed {
        fn should_send(&self, _session: &dyn SessionStatus) -> bool {
            true
        }

        fn on_message(
            &self,
            _message: MessageMap,
            _reply: Option<MessageReplyHandler>,
        ) -> Disposition {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.disposition
        }

        fn on_data(&self, _data: Bytes, _reply: Option<DataReplyHandler>) -> Disposition {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.disposition
        }
    }

    #[test]
    fn handled_payloads_pass_quietly() {
        let behavior = Fixed { disposition: Disposition::Handled, calls: AtomicUsize::new(0) };

        dispatch_message(&behavior, MessageMap::new(), None);
        dispatch_data(&behavior, Bytes::from_static(b"x"), None);

        assert_eq!(behavior.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "unhandled inbound message"))]
    fn unhandled_message_asserts_in_debug() {
        let behavior = Fixed { disposition: Disposition::Unhandled, calls: AtomicUsize::new(0) };
        dispatch_message(&behavior, MessageMap::new(), None);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "unhandled inbound data"))]
    fn unhandled_data_asserts_in_debug() {
        let behavior = Fixed { disposition: Disposition::Unhandled, calls: AtomicUsize::new(0) };
        dispatch_data(&behavior, Bytes::new(), None);
    }
}
