//! Host mode selection screen.
//!
//! The host is the authority on the device mode. Selecting a mode persists it
//! and broadcasts it to the companion; control visibility is recomputed by
//! `configure` after every change.

use tandem_proto::Mode;

use crate::{notification::Category, processor::UNHANDLED_CATEGORY_IDENTIFIER};

/// Attachment bundled with host-scheduled notifications.
pub const DEFAULT_ATTACHMENT_IDENTIFIER: &str = "GeneralOrgana";

/// Visibility of the host screen's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools, reason = "One flag per on-screen control")]
pub struct HostControls {
    /// Return to the unconfigured mode
    pub reset: bool,
    /// Select primary
    pub select_primary: bool,
    /// Select secondary
    pub select_secondary: bool,
    /// Schedule a primary-mode notification
    pub known_notification: bool,
    /// Schedule a notification with an unhandled category
    pub unknown_notification: bool,
    /// Schedule the repeating reminder
    pub repeating_notification: bool,
}

/// Inputs to the host screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Screen loaded with the stored mode
    Started {
        /// Mode loaded from settings
        stored_mode: Mode,
    },
    /// User selected a mode
    SelectMode(Mode),
    /// User asked for a primary-mode notification
    SendKnownNotification,
    /// User asked for a notification no device handles
    SendUnknownNotification,
    /// User asked for the repeating reminder
    SendRepeatingNotification,
    /// App is terminating
    Terminate,
}

/// Side effects requested by the host screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Redraw
    Render,
    /// Persist the mode setting
    PersistMode(Mode),
    /// Send the mode to the companion, queueing until the session activates
    BroadcastMode(Mode),
    /// Schedule a one-shot local notification
    ScheduleLocalNotification {
        /// Category identifier, possibly outside the known set
        category_identifier: String,
        /// Attachment identifier for the companion's image fetch
        attachment_identifier: Option<String>,
    },
    /// Schedule the repeating reminder
    ScheduleRepeatingNotification,
    /// Stop the runtime
    Quit,
}

/// Display title for a mode.
pub const fn mode_title(mode: Mode) -> &'static str {
    match mode {
        Mode::Undefined => "Not Configured",
        Mode::Primary => "Primary Device",
        Mode::Secondary => "Secondary Device",
    }
}

/// Host screen.
#[derive(Debug, Clone)]
pub struct HostApp {
    mode: Mode,
    controls: HostControls,
}

impl Default for HostApp {
    fn default() -> Self {
        Self::new()
    }
}

impl HostApp {
    /// Create an unconfigured screen.
    pub fn new() -> Self {
        let mut app = Self { mode: Mode::Undefined, controls: HostControls::default() };
        app.configure();
        app
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: HostEvent) -> Vec<HostAction> {
        match event {
            HostEvent::Started { stored_mode } => {
                self.mode = stored_mode;
                self.configure();
                vec![HostAction::BroadcastMode(stored_mode), HostAction::Render]
            },
            HostEvent::SelectMode(mode) => {
                tracing::info!(%mode, previous = %self.mode, "mode selected");
                self.mode = mode;
                self.configure();
                vec![
                    HostAction::PersistMode(mode),
                    HostAction::BroadcastMode(mode),
                    HostAction::Render,
                ]
            },
            HostEvent::SendKnownNotification => vec![HostAction::ScheduleLocalNotification {
                category_identifier: Category::PrimaryMode.identifier().to_string(),
                attachment_identifier: Some(DEFAULT_ATTACHMENT_IDENTIFIER.to_string()),
            }],
            HostEvent::SendUnknownNotification => vec![HostAction::ScheduleLocalNotification {
                category_identifier: UNHANDLED_CATEGORY_IDENTIFIER.to_string(),
                attachment_identifier: Some(DEFAULT_ATTACHMENT_IDENTIFIER.to_string()),
            }],
            HostEvent::SendRepeatingNotification => vec![HostAction::ScheduleRepeatingNotification],
            HostEvent::Terminate => vec![HostAction::Quit],
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Status line.
    pub fn title(&self) -> &'static str {
        mode_title(self.mode)
    }

    /// Control visibility.
    pub fn controls(&self) -> HostControls {
        self.controls
    }

    fn configure(&mut self) {
        let configured = self.mode.is_defined();
        let primary = self.mode == Mode::Primary;

        self.controls = HostControls {
            reset: configured,
            select_primary: !configured,
            select_secondary: !configured,
            known_notification: primary,
            unknown_notification: primary,
            repeating_notification: true,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_shows_selectors_only() {
        let app = HostApp::new();

        assert_eq!(app.title(), "Not Configured");
        assert_eq!(app.controls(), HostControls {
            reset: false,
            select_primary: true,
            select_secondary: true,
            known_notification: false,
            unknown_notification: false,
            repeating_notification: true,
        });
    }

    #[test]
    fn primary_shows_notification_buttons() {
        let mut app = HostApp::new();
        app.handle(HostEvent::SelectMode(Mode::Primary));

        let controls = app.controls();
        assert!(controls.reset && controls.known_notification && controls.unknown_notification);
        assert!(!controls.select_primary && !controls.select_secondary);
        assert_eq!(app.title(), "Primary Device");
    }

    #[test]
    fn secondary_shows_reset_only() {
        let mut app = HostApp::new();
        app.handle(HostEvent::SelectMode(Mode::Secondary));

        let controls = app.controls();
        assert!(controls.reset);
        assert!(!controls.known_notification && !controls.unknown_notification);
        assert!(!controls.select_primary && !controls.select_secondary);
    }

    #[test]
    fn selection_persists_then_broadcasts() {
        let mut app = HostApp::new();

        let actions = app.handle(HostEvent::SelectMode(Mode::Secondary));

        assert_eq!(actions, vec![
            HostAction::PersistMode(Mode::Secondary),
            HostAction::BroadcastMode(Mode::Secondary),
            HostAction::Render,
        ]);
    }

    #[test]
    fn start_broadcasts_stored_mode_without_persisting() {
        let mut app = HostApp::new();

        let actions = app.handle(HostEvent::Started { stored_mode: Mode::Primary });

        assert_eq!(actions, vec![HostAction::BroadcastMode(Mode::Primary), HostAction::Render]);
        assert_eq!(app.mode(), Mode::Primary);
    }

    #[test]
    fn unknown_notification_uses_unhandled_category() {
        let mut app = HostApp::new();

        let actions = app.handle(HostEvent::SendUnknownNotification);

        assert!(matches!(
            &actions[..],
            [HostAction::ScheduleLocalNotification { category_identifier, .. }]
                if category_identifier == "UnhandledNotificationCategory"
        ));
    }
}
