//! Companion root screen state machine.
//!
//! Holds the device mode, the single pending-notification slot and the
//! screen's visible state. Consumes [`CompanionEvent`]s and produces
//! [`CompanionAction`]s for the runtime to execute. Every state mutation is
//! followed by an explicit call to `configure_interface`.
//!
//! # Invariants
//!
//! - At most one pending notification; a newer one overwrites the older.
//! - A pending notification is evaluated at most once per defined mode. The
//!   slot is emptied before any transition is emitted.
//! - While a notification is pending no mode group is visible. Otherwise
//!   exactly the group for the current mode is visible.

use tandem_proto::Mode;

use crate::{
    notification::{NotificationEnvelope, format_timestamp},
    routing::{Route, can_handle, route},
};

/// Content of a notification detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    /// Headline
    pub description: String,
    /// User text, or the delivery time when there is none
    pub detail: Option<String>,
}

impl DetailView {
    /// Detail for a processed notification.
    pub fn from_envelope(envelope: &NotificationEnvelope) -> Self {
        let detail = envelope
            .user_text()
            .map_or_else(|| format_timestamp(envelope.notification.delivered_at), str::to_string);
        Self { description: "Notification Processed".to_string(), detail: Some(detail) }
    }

    /// Detail with nothing to show.
    pub fn empty() -> Self {
        Self { description: "No Notification".to_string(), detail: None }
    }
}

/// The standing display shown in secondary mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecondaryDisplay {
    /// Body of the last notification
    pub body: Option<String>,
    /// Delivery time of the last notification, seconds since the Unix epoch
    pub received_at: Option<u64>,
}

/// Navigation and presentation changes for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Present a detail modally
    PresentModal(DetailView),
    /// Dismiss the current modal
    DismissModal,
    /// Push a detail onto the navigation stack
    PushDetail(DetailView),
}

/// Inputs to the companion screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanionEvent {
    /// Screen created. `context` is the notification that launched the app,
    /// if any.
    Awake {
        /// Mode loaded from settings
        stored_mode: Mode,
        /// Launching notification
        context: Option<NotificationEnvelope>,
    },
    /// Screen about to become visible
    WillActivate,
    /// Screen finished appearing
    DidAppear,
    /// Mode received from the host, by broadcast or as a reply
    ModeReceived(Mode),
    /// Notification response delivered while the app runs
    NotificationReceived(NotificationEnvelope),
    /// User closed the modal
    ModalDismissed,
    /// User navigated back from a pushed detail
    NavigatedBack,
    /// User asked for a one-shot primary notification
    RequestLocalNotification,
    /// User asked for the repeating reminder
    RequestRepeatingNotification,
    /// App is terminating
    Terminate,
}

/// Side effects requested by the companion screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanionAction {
    /// Redraw
    Render,
    /// Persist the mode setting
    PersistMode(Mode),
    /// Apply a navigation change
    Transition(Transition),
    /// Schedule a one-shot primary-mode notification
    ScheduleLocalNotification,
    /// Schedule the repeating reminder
    ScheduleRepeatingNotification,
    /// Stop the runtime
    Quit,
}

/// Companion root screen.
#[derive(Debug, Clone, Default)]
pub struct CompanionApp {
    mode: Mode,
    pending: Option<NotificationEnvelope>,
    modal: Option<DetailView>,
    navigation: Vec<DetailView>,
    secondary: SecondaryDisplay,
    visible_group: Option<Mode>,
    appeared: bool,
}

impl CompanionApp {
    /// Create an unconfigured screen.
    pub fn new() -> Self {
        let mut app = Self::default();
        app.configure_interface();
        app
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: CompanionEvent) -> Vec<CompanionAction> {
        match event {
            CompanionEvent::Awake { stored_mode, context } => {
                self.mode = stored_mode;
                if context.is_some() {
                    self.pending = context;
                }
                self.configure_interface();
                vec![CompanionAction::Render]
            },
            CompanionEvent::WillActivate => {
                self.configure_interface();
                vec![CompanionAction::Render]
            },
            CompanionEvent::DidAppear => {
                self.appeared = true;
                let mut actions = self.process_pending();
                actions.push(CompanionAction::Render);
                actions
            },
            CompanionEvent::ModeReceived(mode) => {
                tracing::info!(%mode, previous = %self.mode, "mode received from host");
                self.mode = mode;
                self.configure_interface();

                let mut actions = vec![CompanionAction::PersistMode(mode)];
                actions.extend(self.process_pending());
                actions.push(CompanionAction::Render);
                actions
            },
            CompanionEvent::NotificationReceived(envelope) => {
                let mut actions = self.receive(envelope);
                actions.push(CompanionAction::Render);
                actions
            },
            CompanionEvent::ModalDismissed => {
                self.modal = None;
                self.configure_interface();
                vec![CompanionAction::Render]
            },
            CompanionEvent::NavigatedBack => {
                self.navigation.pop();
                self.configure_interface();
                vec![CompanionAction::Render]
            },
            CompanionEvent::RequestLocalNotification => {
                vec![CompanionAction::ScheduleLocalNotification]
            },
            CompanionEvent::RequestRepeatingNotification => {
                vec![CompanionAction::ScheduleRepeatingNotification]
            },
            CompanionEvent::Terminate => vec![CompanionAction::Quit],
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Held notification, if any.
    pub fn pending(&self) -> Option<&NotificationEnvelope> {
        self.pending.as_ref()
    }

    /// Current modal, if any.
    pub fn modal(&self) -> Option<&DetailView> {
        self.modal.as_ref()
    }

    /// Pushed details, oldest first.
    pub fn navigation(&self) -> &[DetailView] {
        &self.navigation
    }

    /// Secondary-mode display.
    pub fn secondary(&self) -> &SecondaryDisplay {
        &self.secondary
    }

    /// Mode group currently visible. `None` while a notification is pending.
    pub fn visible_group(&self) -> Option<Mode> {
        self.visible_group
    }

    /// Screen title.
    pub fn title(&self) -> &'static str {
        self.mode.as_str()
    }

    /// A notification delivered while running. Held if the screen is not
    /// ready for it, otherwise handled directly when possible.
    fn receive(&mut self, envelope: NotificationEnvelope) -> Vec<CompanionAction> {
        if !self.appeared || !self.mode.is_defined() {
            if self.pending.is_some() {
                tracing::debug!("replacing pending notification");
            }
            self.pending = Some(envelope);
            self.configure_interface();
            return vec![];
        }

        let (category, action) = (envelope.category(), envelope.action());
        if !can_handle(self.mode, category, action) {
            tracing::debug!(
                mode = %self.mode,
                category = %envelope.notification.request.content.category_identifier,
                action = ?action,
                "no handleable notification for combination"
            );
            return vec![];
        }

        let actions = self.apply(route(self.mode, category, action), &envelope);
        self.configure_interface();
        actions
    }

    /// Evaluate the held notification once, if the mode allows.
    fn process_pending(&mut self) -> Vec<CompanionAction> {
        // Empty the slot before any transition can re-enter
        let Some(envelope) = self.pending.take() else {
            return vec![];
        };

        let routed = route(self.mode, envelope.category(), envelope.action());
        let actions = if routed == Route::Defer {
            tracing::debug!("mode undefined, keeping notification pending");
            self.pending = Some(envelope);
            vec![]
        } else {
            self.apply(routed, &envelope)
        };

        self.configure_interface();
        actions
    }

    fn apply(&mut self, routed: Route, envelope: &NotificationEnvelope) -> Vec<CompanionAction> {
        match routed {
            Route::PresentModal => {
                let mut actions = Vec::with_capacity(2);
                if self.modal.take().is_some() {
                    actions.push(CompanionAction::Transition(Transition::DismissModal));
                }
                let detail = DetailView::from_envelope(envelope);
                self.modal = Some(detail.clone());
                actions.push(CompanionAction::Transition(Transition::PresentModal(detail)));
                actions
            },
            Route::PushDetail => {
                let detail = DetailView::from_envelope(envelope);
                self.navigation.push(detail.clone());
                vec![CompanionAction::Transition(Transition::PushDetail(detail))]
            },
            Route::UpdateSecondary => {
                let content = &envelope.notification.request.content;
                self.secondary = SecondaryDisplay {
                    body: Some(content.body.clone()),
                    received_at: Some(envelope.notification.delivered_at),
                };
                vec![]
            },
            Route::Ignore | Route::Unhandled | Route::Defer => {
                tracing::debug!(route = ?routed, "notification not handled by screen");
                vec![]
            },
        }
    }

    /// Recompute visibility from the current state.
    fn configure_interface(&mut self) {
        self.visible_group = if self.pending.is_some() { None } else { Some(self.mode) };
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::notification::{
        Action, Category, Notification, NotificationContent, NotificationRequest,
        NotificationResponse, Trigger,
    };

    fn envelope(
        category: Category,
        response: Option<NotificationResponse>,
    ) -> NotificationEnvelope {
        NotificationEnvelope {
            notification: Notification {
                request: NotificationRequest {
                    identifier: "n-1".to_string(),
                    content: NotificationContent {
                        title: "Local Notification".to_string(),
                        body: "Notification Body".to_string(),
                        category_identifier: category.identifier().to_string(),
                        ..NotificationContent::default()
                    },
                    trigger: Trigger::once(Duration::from_secs(10)),
                },
                delivered_at: 1_484_000_000,
            },
            response,
        }
    }

    fn appeared(mode: Mode) -> CompanionApp {
        let mut app = CompanionApp::new();
        app.handle(CompanionEvent::Awake { stored_mode: mode, context: None });
        app.handle(CompanionEvent::DidAppear);
        app
    }

    fn transitions(actions: &[CompanionAction]) -> Vec<&Transition> {
        actions
            .iter()
            .filter_map(|a| match a {
                CompanionAction::Transition(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn launch_with_call_action_is_ignored() {
        let mut app = CompanionApp::new();
        app.handle(CompanionEvent::Awake {
            stored_mode: Mode::Primary,
            context: Some(envelope(
                Category::PrimaryMode,
                Some(NotificationResponse::action(Action::Call)),
            )),
        });

        let actions = app.handle(CompanionEvent::DidAppear);

        assert!(transitions(&actions).is_empty());
        assert!(app.modal().is_none());
        assert!(app.navigation().is_empty());
        assert!(app.pending().is_none());
    }

    #[test]
    fn modal_replaces_previous_modal() {
        let mut app = appeared(Mode::Primary);
        let modal =
            || envelope(Category::PrimaryMode, Some(NotificationResponse::action(Action::Modal)));

        let first = app.handle(CompanionEvent::NotificationReceived(modal()));
        assert_eq!(transitions(&first).len(), 1);

        let second = app.handle(CompanionEvent::NotificationReceived(modal()));
        let second = transitions(&second);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0], &Transition::DismissModal);
        assert!(matches!(second[1], Transition::PresentModal(_)));
    }

    #[test]
    fn text_input_detail_shows_text() {
        let mut app = appeared(Mode::Primary);

        app.handle(CompanionEvent::NotificationReceived(envelope(
            Category::PrimaryMode,
            Some(NotificationResponse::text("be right there")),
        )));

        let modal = app.modal().unwrap();
        assert_eq!(modal.description, "Notification Processed");
        assert_eq!(modal.detail.as_deref(), Some("be right there"));
    }

    #[test]
    fn pending_plain_notification_pushes_detail_with_timestamp() {
        let mut app = CompanionApp::new();
        app.handle(CompanionEvent::Awake {
            stored_mode: Mode::Primary,
            context: Some(envelope(Category::PrimaryMode, None)),
        });

        let actions = app.handle(CompanionEvent::DidAppear);

        assert_eq!(transitions(&actions).len(), 1);
        assert_eq!(app.navigation()[0].detail.as_deref(), Some("2017-01-09 22:13"));
    }

    #[test]
    fn secondary_update_leaves_modal_alone() {
        let mut app = appeared(Mode::Secondary);

        let secondary = envelope(Category::SecondaryMode, None);
        let actions = app.handle(CompanionEvent::NotificationReceived(secondary));

        assert!(transitions(&actions).is_empty());
        assert!(app.modal().is_none());
        assert_eq!(app.secondary().body.as_deref(), Some("Notification Body"));
        assert_eq!(app.secondary().received_at, Some(1_484_000_000));
    }

    #[test]
    fn undefined_mode_defers_until_mode_arrives() {
        let mut app = appeared(Mode::Undefined);

        app.handle(CompanionEvent::NotificationReceived(envelope(
            Category::PrimaryMode,
            Some(NotificationResponse::action(Action::Modal)),
        )));
        assert!(app.pending().is_some());
        assert_eq!(app.visible_group(), None);

        let actions = app.handle(CompanionEvent::ModeReceived(Mode::Primary));
        assert_eq!(actions[0], CompanionAction::PersistMode(Mode::Primary));
        assert_eq!(transitions(&actions).len(), 1);
        assert!(app.pending().is_none());
        assert_eq!(app.visible_group(), Some(Mode::Primary));

        // Nothing left to re-evaluate
        let again = app.handle(CompanionEvent::ModeReceived(Mode::Primary));
        assert!(transitions(&again).is_empty());
    }

    #[test]
    fn newer_pending_overwrites_older() {
        let mut app = CompanionApp::new();
        app.handle(CompanionEvent::NotificationReceived(envelope(Category::SecondaryMode, None)));
        app.handle(CompanionEvent::NotificationReceived(envelope(Category::PrimaryMode, None)));

        let held = app.pending().and_then(NotificationEnvelope::category);
        assert_eq!(held, Some(Category::PrimaryMode));
    }

    #[test]
    fn mismatched_pending_is_cleared_without_action() {
        let mut app = CompanionApp::new();
        app.handle(CompanionEvent::Awake {
            stored_mode: Mode::Secondary,
            context: Some(envelope(Category::PrimaryMode, None)),
        });

        let actions = app.handle(CompanionEvent::DidAppear);

        assert!(transitions(&actions).is_empty());
        assert!(app.pending().is_none());
        assert_eq!(app.visible_group(), Some(Mode::Secondary));
    }

    #[test]
    fn direct_background_response_is_not_handled() {
        let mut app = appeared(Mode::Primary);

        let actions = app.handle(CompanionEvent::NotificationReceived(envelope(
            Category::PrimaryMode,
            Some(NotificationResponse::action(Action::Background)),
        )));

        assert!(transitions(&actions).is_empty());
        assert!(app.navigation().is_empty());
    }

    #[test]
    fn dismissing_and_navigating_back_restore_root() {
        let mut app = appeared(Mode::Primary);
        app.handle(CompanionEvent::NotificationReceived(envelope(
            Category::PrimaryMode,
            Some(NotificationResponse::action(Action::Modal)),
        )));

        app.handle(CompanionEvent::ModalDismissed);
        app.handle(CompanionEvent::NavigatedBack);

        assert!(app.modal().is_none());
        assert!(app.navigation().is_empty());
    }

    #[test]
    fn empty_detail_has_no_timestamp() {
        assert_eq!(DetailView::empty().detail, None);
    }
}
