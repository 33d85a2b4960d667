//! Per-role connectivity behaviors.

use std::sync::Arc;

use bytes::Bytes;
use tandem_core::{
    ConnectivityBehavior, DataReplyHandler, Disposition, MessageReplyHandler, ModeStore,
    SessionStatus,
};
use tandem_proto::{ClearNotificationCommand, CommandKey, MessageMap, Messageable, Mode};

use crate::{center::NotificationCenter, companion::CompanionEvent, ui::UiHandle};

/// Host-role behavior.
///
/// Sends only while a companion is paired and has the app installed. Answers
/// mode requests from the stored mode and clears delivered notifications on
/// request.
pub struct HostBehavior {
    modes: ModeStore,
    center: Arc<dyn NotificationCenter>,
}

impl HostBehavior {
    /// Create the host behavior.
    pub fn new(modes: ModeStore, center: Arc<dyn NotificationCenter>) -> Self {
        Self { modes, center }
    }
}

impl ConnectivityBehavior for HostBehavior {
    fn should_send(&self, session: &dyn SessionStatus) -> bool {
        session.is_paired() && session.is_companion_app_installed()
    }

    fn on_message(&self, message: MessageMap, reply: Option<MessageReplyHandler>) -> Disposition {
        let command = match CommandKey::from_message(&message) {
            Ok(command) => command,
            Err(error) => {
                tracing::warn!(%error, "non-command payload received");
                return Disposition::Unhandled;
            },
        };

        match command {
            CommandKey::RequestMode => {
                let mode = self.modes.current();
                match reply {
                    Some(reply) => {
                        tracing::debug!(%mode, "replying to mode request");
                        reply(mode.to_message());
                    },
                    None => tracing::debug!("mode request without reply handler"),
                }
                Disposition::Handled
            },
            CommandKey::ClearNotification => {
                match ClearNotificationCommand::from_message(&message) {
                    Ok(clear) => {
                        tracing::debug!(
                            identifier = %clear.identifier,
                            "clearing delivered notification"
                        );
                        self.center.remove_delivered(&[clear.identifier]);
                        Disposition::Handled
                    },
                    // Consumed so a bad identifier never reaches the fallback
                    Err(error) => {
                        tracing::warn!(%error, "malformed clear-notification command");
                        Disposition::Handled
                    },
                }
            },
        }
    }

    fn on_data(&self, _data: Bytes, _reply: Option<DataReplyHandler>) -> Disposition {
        Disposition::Unhandled
    }
}

/// Companion-role behavior.
///
/// Mode broadcasts are handed to the UI context, which persists and applies
/// them. Other messages are ignored.
pub struct CompanionBehavior {
    ui: UiHandle<CompanionEvent>,
}

impl CompanionBehavior {
    /// Create the companion behavior posting to `ui`.
    pub fn new(ui: UiHandle<CompanionEvent>) -> Self {
        Self { ui }
    }
}

impl ConnectivityBehavior for CompanionBehavior {
    fn should_send(&self, _session: &dyn SessionStatus) -> bool {
        true
    }

    fn on_message(&self, message: MessageMap, _reply: Option<MessageReplyHandler>) -> Disposition {
        match Mode::from_message(&message) {
            Ok(mode) => {
                self.ui.post(CompanionEvent::ModeReceived(mode));
            },
            Err(error) => tracing::debug!(%error, "ignoring non-mode message"),
        }
        Disposition::Handled
    }

    fn on_data(&self, _data: Bytes, _reply: Option<DataReplyHandler>) -> Disposition {
        Disposition::Unhandled
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_types, reason = "Test fake uses std locks")]

    use std::sync::Mutex;

    use tandem_core::ActivationState;

    use super::*;
    use crate::{
        center::{AuthorizationHandler, AuthorizationOptions, CategoryRegistration},
        error::CenterError,
        notification::NotificationRequest,
        ui::ui_channel,
    };

    #[derive(Default)]
    struct DeliveredCenter {
        removed: Mutex<Vec<String>>,
    }

    impl NotificationCenter for DeliveredCenter {
        fn set_categories(&self, _categories: Vec<CategoryRegistration>) {}

        fn request_authorization(
            &self,
            _options: AuthorizationOptions,
            completion: AuthorizationHandler,
        ) {
            completion(true);
        }

        fn register_for_remote_notifications(&self) {}

        fn add(&self, _request: NotificationRequest) -> Result<(), CenterError> {
            Ok(())
        }

        fn remove_pending(&self, _identifiers: &[String]) {}

        fn remove_delivered(&self, identifiers: &[String]) {
            self.removed.lock().unwrap().extend_from_slice(identifiers);
        }
    }

    struct Status {
        paired: bool,
        installed: bool,
    }

    impl SessionStatus for Status {
        fn activation_state(&self) -> ActivationState {
            ActivationState::Activated
        }

        fn is_reachable(&self) -> bool {
            true
        }

        fn is_paired(&self) -> bool {
            self.paired
        }

        fn is_companion_app_installed(&self) -> bool {
            self.installed
        }
    }

    fn host() -> (HostBehavior, ModeStore, Arc<DeliveredCenter>) {
        let modes = ModeStore::in_memory();
        let center = Arc::new(DeliveredCenter::default());
        (HostBehavior::new(modes.clone(), center.clone()), modes, center)
    }

    #[test]
    fn host_gate_needs_pairing_and_install() {
        let (behavior, _, _) = host();

        assert!(behavior.should_send(&Status { paired: true, installed: true }));
        assert!(!behavior.should_send(&Status { paired: true, installed: false }));
        assert!(!behavior.should_send(&Status { paired: false, installed: true }));
    }

    #[test]
    fn mode_request_replies_with_stored_mode() {
        let (behavior, modes, _) = host();
        modes.set(Mode::Secondary).unwrap();
        let replied = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&replied);

        let disposition = behavior.on_message(
            tandem_proto::CommandMessage::new(CommandKey::RequestMode).to_message(),
            Some(Box::new(move |reply| *slot.lock().unwrap() = Some(reply))),
        );

        assert_eq!(disposition, Disposition::Handled);
        assert_eq!(*replied.lock().unwrap(), Some(Mode::Secondary.to_message()));
    }

    #[test]
    fn mode_request_with_nothing_stored_replies_undefined() {
        let (behavior, _, _) = host();
        let replied = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&replied);

        behavior.on_message(
            tandem_proto::CommandMessage::new(CommandKey::RequestMode).to_message(),
            Some(Box::new(move |reply| *slot.lock().unwrap() = Some(reply))),
        );

        assert_eq!(*replied.lock().unwrap(), Some(Mode::Undefined.to_message()));
    }

    #[test]
    fn clear_command_removes_delivered() {
        let (behavior, _, center) = host();

        let clear = ClearNotificationCommand::new("n-3").to_message();
        let disposition = behavior.on_message(clear, None);

        assert_eq!(disposition, Disposition::Handled);
        assert_eq!(*center.removed.lock().unwrap(), vec!["n-3".to_string()]);
    }

    #[test]
    fn host_rejects_non_commands() {
        let (behavior, _, _) = host();

        assert_eq!(behavior.on_message(Mode::Primary.to_message(), None), Disposition::Unhandled);
        assert_eq!(behavior.on_data(Bytes::new(), None), Disposition::Unhandled);
    }

    #[test]
    fn host_consumes_malformed_clear() {
        let (behavior, _, center) = host();

        let bare = tandem_proto::CommandMessage::new(CommandKey::ClearNotification).to_message();
        assert_eq!(behavior.on_message(bare, None), Disposition::Handled);

        let mut wrong_type = ClearNotificationCommand::new("n-4").to_message();
        wrong_type.insert(
            ClearNotificationCommand::IDENTIFIER_KEY.to_string(),
            tandem_proto::Value::Integer(4.into()),
        );
        assert_eq!(behavior.on_message(wrong_type, None), Disposition::Handled);

        assert!(center.removed.lock().unwrap().is_empty());
    }

    #[test]
    fn companion_posts_mode_to_ui() {
        let (ui, mut rx) = ui_channel();
        let behavior = CompanionBehavior::new(ui);

        assert_eq!(behavior.on_message(Mode::Primary.to_message(), None), Disposition::Handled);
        assert_eq!(rx.try_recv().unwrap(), CompanionEvent::ModeReceived(Mode::Primary));
    }

    #[test]
    fn companion_ignores_other_messages() {
        let (ui, mut rx) = ui_channel();
        let behavior = CompanionBehavior::new(ui);

        let clear = ClearNotificationCommand::new("n-1").to_message();
        assert_eq!(behavior.on_message(clear, None), Disposition::Handled);
        assert!(rx.try_recv().is_err());
    }
}
