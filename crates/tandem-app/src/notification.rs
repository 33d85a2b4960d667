//! Notification model.
//!
//! Categories and actions are closed sets keyed by stable identifier strings.
//! Anything outside them (an unknown category, the default tap, a dismissal)
//! is carried as a raw identifier and maps to `None`.

use std::{collections::BTreeMap, fmt, time::Duration};

use chrono::DateTime;

/// Identifier reported when the user dismisses a notification.
pub const DISMISS_ACTION_IDENTIFIER: &str = "dismiss";

/// Identifier reported when the user opens a notification without choosing
/// an action.
pub const DEFAULT_ACTION_IDENTIFIER: &str = "default";

/// User-info key holding an attachment identifier.
pub const ATTACHMENT_IDENTIFIER_KEY: &str = "notificationAttachmentIdentifier";

/// Classification of a notification's intended handling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Handled by devices configured as primary
    PrimaryMode,
    /// Handled by devices configured as secondary
    SecondaryMode,
    /// Standing reminder with a custom dismiss action
    Repeating,
}

impl Category {
    /// Every category, in registration order.
    pub const ALL: [Self; 3] = [Self::PrimaryMode, Self::SecondaryMode, Self::Repeating];

    /// Stable identifier.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::PrimaryMode => "primaryMode",
            Self::SecondaryMode => "secondaryMode",
            Self::Repeating => "repeating",
        }
    }

    /// Look up a category by identifier.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.identifier() == identifier)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// User-selected response to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Place a call
    Call,
    /// Show details in a modal
    Modal,
    /// Reply with text
    TextInput,
    /// Handle without opening the app
    Background,
}

impl Action {
    /// Every action.
    pub const ALL: [Self; 4] = [Self::Call, Self::Modal, Self::TextInput, Self::Background];

    /// Stable identifier.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Modal => "modal",
            Self::TextInput => "textInput",
            Self::Background => "background",
        }
    }

    /// Look up an action by identifier.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.identifier() == identifier)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Content of a local notification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationContent {
    /// Title line
    pub title: String,
    /// Body text
    pub body: String,
    /// Raw category identifier. May name a category outside [`Category`].
    pub category_identifier: String,
    /// Extra string entries
    pub user_info: BTreeMap<String, String>,
}

impl NotificationContent {
    /// Known category, if the identifier names one.
    pub fn category(&self) -> Option<Category> {
        Category::from_identifier(&self.category_identifier)
    }

    /// Attachment identifier from user info.
    pub fn attachment_identifier(&self) -> Option<&str> {
        self.user_info.get(ATTACHMENT_IDENTIFIER_KEY).map(String::as_str)
    }
}

/// When a notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Delay before firing
    pub interval: Duration,
    /// Fire again every `interval`
    pub repeats: bool,
}

impl Trigger {
    /// Fire once after `interval`.
    pub const fn once(interval: Duration) -> Self {
        Self { interval, repeats: false }
    }

    /// Fire every `interval`.
    pub const fn repeating(interval: Duration) -> Self {
        Self { interval, repeats: true }
    }
}

/// A scheduled notification. Re-adding an identifier replaces the earlier
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Unique or well-known identifier
    pub identifier: String,
    /// What to show
    pub content: NotificationContent,
    /// When to show it
    pub trigger: Trigger,
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Request that produced it
    pub request: NotificationRequest,
    /// Delivery time, seconds since the Unix epoch
    pub delivered_at: u64,
}

/// The user's response to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResponse {
    /// Chosen action, dismissal or default identifier
    pub action_identifier: String,
    /// Text entered for a text-input action
    pub user_text: Option<String>,
}

impl NotificationResponse {
    /// Response for a registered action.
    pub fn action(action: Action) -> Self {
        Self { action_identifier: action.identifier().to_string(), user_text: None }
    }

    /// Text-input response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            action_identifier: Action::TextInput.identifier().to_string(),
            user_text: Some(text.into()),
        }
    }

    /// Dismissal.
    pub fn dismiss() -> Self {
        Self { action_identifier: DISMISS_ACTION_IDENTIFIER.to_string(), user_text: None }
    }
}

/// A notification paired with the user's response, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEnvelope {
    /// Delivered notification
    pub notification: Notification,
    /// Response, absent when the notification arrived without interaction
    pub response: Option<NotificationResponse>,
}

impl NotificationEnvelope {
    /// Known category of the notification.
    pub fn category(&self) -> Option<Category> {
        self.notification.request.content.category()
    }

    /// Registered action chosen by the user, if any.
    pub fn action(&self) -> Option<Action> {
        self.response.as_ref().and_then(|r| Action::from_identifier(&r.action_identifier))
    }

    /// Whether the response is a dismissal.
    pub fn is_dismissal(&self) -> bool {
        self.response.as_ref().is_some_and(|r| r.action_identifier == DISMISS_ACTION_IDENTIFIER)
    }

    /// Text entered by the user.
    pub fn user_text(&self) -> Option<&str> {
        self.response.as_ref().and_then(|r| r.user_text.as_deref())
    }
}

/// How a notification is presented while the app is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentationOptions {
    /// Play a sound
    pub sound: bool,
    /// Show a banner
    pub alert: bool,
}

impl PresentationOptions {
    /// Suppress system presentation.
    pub const NONE: Self = Self { sound: false, alert: false };

    /// Sound and banner.
    pub const SOUND_AND_ALERT: Self = Self { sound: true, alert: true };

    /// Whether nothing is presented.
    pub const fn is_empty(self) -> bool {
        !self.sound && !self.alert
    }
}

/// Short UTC date-time label for a delivery timestamp.
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(|| secs.to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}
