//! Notification center seam.
//!
//! The platform's notification scheduler is an external collaborator. The
//! [`NotificationCenter`] trait captures the handful of calls the processor
//! and host behavior make; the harness supplies an in-memory implementation.

use crate::{
    error::CenterError,
    notification::{Action, Category, NotificationRequest},
};

/// Completion for an authorization request. Receives `true` when granted.
pub type AuthorizationHandler = Box<dyn FnOnce(bool) + Send>;

/// A registered action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRegistration {
    /// Action reported when chosen
    pub action: Action,
    /// Button title
    pub title: &'static str,
    /// Bring the app to the foreground when chosen
    pub foreground: bool,
}

/// A registered category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistration {
    /// Category
    pub category: Category,
    /// Action buttons, in display order
    pub actions: Vec<ActionRegistration>,
    /// Report dismissals as a response
    pub custom_dismiss: bool,
}

/// Presentation kinds requested at authorization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    /// Banners
    pub alert: bool,
    /// Sounds
    pub sound: bool,
}

/// Platform notification scheduler.
pub trait NotificationCenter: Send + Sync {
    /// Replace the registered categories.
    fn set_categories(&self, categories: Vec<CategoryRegistration>);

    /// Ask the user for permission. `completion` may run on any context.
    fn request_authorization(
        &self,
        options: AuthorizationOptions,
        completion: AuthorizationHandler,
    );

    /// Register for remote notifications after authorization was granted.
    fn register_for_remote_notifications(&self);

    /// Schedule a request, replacing any pending request with the same
    /// identifier.
    fn add(&self, request: NotificationRequest) -> Result<(), CenterError>;

    /// Cancel pending requests. Unknown identifiers are ignored.
    fn remove_pending(&self, identifiers: &[String]);

    /// Remove delivered notifications. Unknown identifiers are ignored.
    fn remove_delivered(&self, identifiers: &[String]);
}
