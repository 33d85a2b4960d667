//! In-memory notification center driven by the virtual clock.
//!
//! Scheduled requests become due when [`SimEnv`] time passes their trigger.
//! [`SimNotificationCenter::deliver_due`] moves due requests to the delivered
//! list, rescheduling repeating ones.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tandem_app::{
    AuthorizationHandler, AuthorizationOptions, CategoryRegistration, CenterError, Notification,
    NotificationCenter, NotificationRequest,
};
use tandem_core::Environment as _;

use crate::sim_env::SimEnv;

struct Scheduled {
    request: NotificationRequest,
    due: Duration,
}

#[derive(Default)]
struct CenterState {
    categories: Vec<CategoryRegistration>,
    pending: Vec<Scheduled>,
    delivered: Vec<Notification>,
    authorization: Option<AuthorizationOptions>,
    remote_registered: bool,
    reject_adds: bool,
}

/// Notification center for simulation.
pub struct SimNotificationCenter {
    env: SimEnv,
    grant: bool,
    state: Mutex<CenterState>,
}

impl SimNotificationCenter {
    /// Center that grants authorization.
    pub fn new(env: SimEnv) -> Self {
        Self { env, grant: true, state: Mutex::new(CenterState::default()) }
    }

    /// Center that denies authorization.
    pub fn denying(env: SimEnv) -> Self {
        Self { grant: false, ..Self::new(env) }
    }

    /// Make subsequent `add` calls fail.
    pub fn reject_adds(&self, reject: bool) {
        self.lock().reject_adds = reject;
    }

    /// Deliver every request whose trigger has passed.
    ///
    /// One-shot requests leave the pending list; repeating ones are
    /// rescheduled one interval later.
    pub fn deliver_due(&self) -> Vec<Notification> {
        let now = self.env.elapsed();
        let delivered_at = self.env.wall_clock_secs();
        let mut state = self.lock();

        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(state.pending.len());
        for mut scheduled in std::mem::take(&mut state.pending) {
            if scheduled.due > now {
                remaining.push(scheduled);
                continue;
            }

            due.push(Notification { request: scheduled.request.clone(), delivered_at });
            if scheduled.request.trigger.repeats {
                scheduled.due = now + scheduled.request.trigger.interval;
                remaining.push(scheduled);
            }
        }

        state.pending = remaining;
        let fired: Vec<&str> = due.iter().map(|n| n.request.identifier.as_str()).collect();
        state.delivered.retain(|n| !fired.contains(&n.request.identifier.as_str()));
        state.delivered.extend(due.iter().cloned());
        due
    }

    /// Identifiers of scheduled requests, in scheduling order.
    pub fn pending_identifiers(&self) -> Vec<String> {
        self.lock().pending.iter().map(|s| s.request.identifier.clone()).collect()
    }

    /// Scheduled requests, in scheduling order.
    pub fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.lock().pending.iter().map(|s| s.request.clone()).collect()
    }

    /// Identifiers still in the delivered list.
    pub fn delivered_identifiers(&self) -> Vec<String> {
        self.lock().delivered.iter().map(|n| n.request.identifier.clone()).collect()
    }

    /// Registered categories.
    pub fn categories(&self) -> Vec<CategoryRegistration> {
        self.lock().categories.clone()
    }

    /// Options of the last authorization request.
    pub fn authorization_requested(&self) -> Option<AuthorizationOptions> {
        self.lock().authorization
    }

    /// Whether remote registration happened.
    pub fn remote_registered(&self) -> bool {
        self.lock().remote_registered
    }

    fn lock(&self) -> MutexGuard<'_, CenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationCenter for SimNotificationCenter {
    fn set_categories(&self, categories: Vec<CategoryRegistration>) {
        self.lock().categories = categories;
    }

    fn request_authorization(
        &self,
        options: AuthorizationOptions,
        completion: AuthorizationHandler,
    ) {
        self.lock().authorization = Some(options);
        completion(self.grant);
    }

    fn register_for_remote_notifications(&self) {
        self.lock().remote_registered = true;
    }

    fn add(&self, request: NotificationRequest) -> Result<(), CenterError> {
        let due = self.env.elapsed() + request.trigger.interval;
        let mut state = self.lock();
        if state.reject_adds {
            return Err(CenterError::Rejected {
                identifier: request.identifier,
                reason: "rejected".to_string(),
            });
        }

        state.pending.retain(|s| s.request.identifier != request.identifier);
        tracing::trace!(identifier = %request.identifier, ?due, "notification scheduled");
        state.pending.push(Scheduled { request, due });
        Ok(())
    }

    fn remove_pending(&self, identifiers: &[String]) {
        self.lock().pending.retain(|s| !identifiers.contains(&s.request.identifier));
    }

    fn remove_delivered(&self, identifiers: &[String]) {
        self.lock().delivered.retain(|n| !identifiers.contains(&n.request.identifier));
    }
}
