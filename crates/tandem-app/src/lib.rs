//! Application layer for tandem
//!
//! Notification handling and per-role screen state machines for a host device
//! and its paired companion, plus the runtimes that wire them to the
//! connectivity manager.
//!
//! # Components
//!
//! - [`NotificationProcessor`]: category registration, presentation and
//!   response hooks, repeating reminder lifecycle
//! - [`route`]: pure routing table over (mode, category, action)
//! - [`CompanionApp`]: companion root screen with the pending-notification
//!   slot
//! - [`HostApp`]: host mode selection screen
//! - [`HostBehavior`] / [`CompanionBehavior`]: role-specific connectivity
//!   behaviors
//! - [`load_primary_notification`]: primary notification view with its
//!   attachment image
//! - [`Driver`]: presentation abstraction
//! - [`CompanionRuntime`] / [`HostRuntime`]: the single UI-owning context per
//!   role

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod attachment;
mod behavior;
mod center;
mod companion;
mod driver;
mod error;
mod host;
mod notification;
mod processor;
mod routing;
mod runtime;
mod ui;

pub use attachment::{
    AssetFetcher, CompletionGuard, DEFAULT_ASSET_HOST, ImageState, PrimaryNotificationView,
    attachment_url, is_jpeg, load_primary_notification,
};
pub use behavior::{CompanionBehavior, HostBehavior};
pub use center::{
    ActionRegistration, AuthorizationHandler, AuthorizationOptions, CategoryRegistration,
    NotificationCenter,
};
pub use companion::{
    CompanionAction, CompanionApp, CompanionEvent, DetailView, SecondaryDisplay, Transition,
};
pub use driver::Driver;
pub use error::{CenterError, FetchError};
pub use host::{
    DEFAULT_ATTACHMENT_IDENTIFIER, HostAction, HostApp, HostControls, HostEvent, mode_title,
};
pub use notification::{
    ATTACHMENT_IDENTIFIER_KEY, Action, Category, DEFAULT_ACTION_IDENTIFIER,
    DISMISS_ACTION_IDENTIFIER, Notification, NotificationContent, NotificationEnvelope,
    NotificationRequest, NotificationResponse, PresentationOptions, Trigger, format_timestamp,
};
pub use processor::{
    LOCAL_NOTIFICATION_DELAY, NotificationProcessor, REPEATING_IDENTIFIER, REPEATING_INTERVAL,
    ResponseOutcome, UNHANDLED_CATEGORY_IDENTIFIER,
};
pub use routing::{Route, can_handle, route};
pub use runtime::{CompanionRuntime, HostRuntime};
pub use ui::{UiHandle, ui_channel};
