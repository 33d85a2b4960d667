//! Notification processor.
//!
//! Registers categories, answers the foreground-presentation and response
//! hooks, and owns the lifecycle of the single repeating reminder.
//!
//! # Invariants
//!
//! - At most one repeating schedule exists. It always uses
//!   [`REPEATING_IDENTIFIER`], so re-adding replaces rather than duplicates.
//! - Clearing the repeating schedule is idempotent.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use tandem_core::Environment;

use crate::{
    center::{ActionRegistration, AuthorizationOptions, CategoryRegistration, NotificationCenter},
    error::CenterError,
    notification::{
        ATTACHMENT_IDENTIFIER_KEY, Action, Category, Notification, NotificationContent,
        NotificationEnvelope, NotificationRequest, PresentationOptions, Trigger,
    },
};

/// Fixed identifier of the repeating reminder.
pub const REPEATING_IDENTIFIER: &str = "notificationDemo-repeating-identifier";

/// Repeating reminder period.
pub const REPEATING_INTERVAL: Duration = Duration::from_secs(60);

/// Delay before a one-shot local notification fires.
pub const LOCAL_NOTIFICATION_DELAY: Duration = Duration::from_secs(10);

/// Category identifier no device handles, used to exercise the unhandled
/// path.
pub const UNHANDLED_CATEGORY_IDENTIFIER: &str = "UnhandledNotificationCategory";

/// Outcome of the response hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The repeating reminder was dismissed and its schedule cancelled.
    RepeatingCancelled,
    /// Nothing to do here; per-screen routing handles the rest.
    Completed,
}

/// Registers notification categories and handles center callbacks.
pub struct NotificationProcessor<E: Environment> {
    center: Arc<dyn NotificationCenter>,
    env: E,
}

impl<E: Environment> NotificationProcessor<E> {
    /// Create a processor over `center`.
    pub fn new(center: Arc<dyn NotificationCenter>, env: E) -> Self {
        Self { center, env }
    }

    /// Categories and actions the app declares.
    pub fn categories() -> Vec<CategoryRegistration> {
        vec![
            CategoryRegistration {
                category: Category::PrimaryMode,
                actions: vec![
                    ActionRegistration { action: Action::Call, title: "Call", foreground: true },
                    ActionRegistration { action: Action::Modal, title: "Modal", foreground: true },
                    ActionRegistration {
                        action: Action::Background,
                        title: "Background",
                        foreground: false,
                    },
                ],
                custom_dismiss: false,
            },
            CategoryRegistration {
                category: Category::SecondaryMode,
                actions: vec![],
                custom_dismiss: false,
            },
            CategoryRegistration {
                category: Category::Repeating,
                actions: vec![],
                custom_dismiss: true,
            },
        ]
    }

    /// Register categories and request alert and sound authorization.
    ///
    /// A grant registers for remote notifications. A denial is logged and
    /// otherwise ignored.
    pub fn register(&self) {
        self.center.set_categories(Self::categories());

        let center = Arc::clone(&self.center);
        self.center.request_authorization(
            AuthorizationOptions { alert: true, sound: true },
            Box::new(move |granted| {
                if granted {
                    tracing::debug!("notification authorization granted");
                    center.register_for_remote_notifications();
                } else {
                    tracing::warn!("notification authorization denied");
                }
            }),
        );
    }

    /// Foreground presentation for `notification`.
    ///
    /// Only the repeating reminder is shown by the system while the app is
    /// active; everything else is handled in-app.
    pub fn will_present(&self, notification: &Notification) -> PresentationOptions {
        match notification.request.content.category() {
            Some(Category::Repeating) => PresentationOptions::SOUND_AND_ALERT,
            _ => PresentationOptions::NONE,
        }
    }

    /// Response hook. Dismissing the repeating reminder cancels it.
    pub fn did_receive(&self, envelope: &NotificationEnvelope) -> ResponseOutcome {
        if envelope.category() == Some(Category::Repeating) && envelope.is_dismissal() {
            self.clear_repeating_notifications();
            tracing::info!("repeating notification cancelled");
            return ResponseOutcome::RepeatingCancelled;
        }

        ResponseOutcome::Completed
    }

    /// The repeating reminder request.
    pub fn repeating_request() -> NotificationRequest {
        NotificationRequest {
            identifier: REPEATING_IDENTIFIER.to_string(),
            content: NotificationContent {
                title: "Repeating Notification".to_string(),
                body: "This is the notification that never ends".to_string(),
                category_identifier: Category::Repeating.identifier().to_string(),
                user_info: BTreeMap::new(),
            },
            trigger: Trigger::repeating(REPEATING_INTERVAL),
        }
    }

    /// Schedule, or reschedule, the repeating reminder.
    pub fn add_repeating_notification_triggers(&self) {
        if let Err(error) = self.center.add(Self::repeating_request()) {
            tracing::warn!(%error, "failed to add repeating notification");
        }
    }

    /// Cancel the repeating reminder. No-op if none is scheduled.
    pub fn clear_repeating_notifications(&self) {
        self.center.remove_pending(&[REPEATING_IDENTIFIER.to_string()]);
    }

    /// Schedule a one-shot local notification and return its identifier.
    pub fn schedule_local(
        &self,
        category_identifier: &str,
        attachment_identifier: Option<&str>,
    ) -> Result<String, CenterError> {
        let mut user_info = BTreeMap::new();
        if let Some(attachment) = attachment_identifier {
            user_info.insert(ATTACHMENT_IDENTIFIER_KEY.to_string(), attachment.to_string());
        }

        let identifier = self.env.unique_id();
        self.center.add(NotificationRequest {
            identifier: identifier.clone(),
            content: NotificationContent {
                title: "Local Notification".to_string(),
                body: "Notification Body".to_string(),
                category_identifier: category_identifier.to_string(),
                user_info,
            },
            trigger: Trigger::once(LOCAL_NOTIFICATION_DELAY),
        })?;

        tracing::debug!(
            %identifier,
            category = category_identifier,
            "local notification scheduled"
        );
        Ok(identifier)
    }
}
