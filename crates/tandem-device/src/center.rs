//! Notification center backed by tokio timers.
//!
//! Each scheduled request is a task that sleeps for the trigger interval and
//! then publishes the delivered notification on the center's delivery
//! channel. Re-adding an identifier aborts the earlier task.

#![allow(clippy::disallowed_types, reason = "Synchronous locking only, never held across await")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tandem_app::{
    AuthorizationHandler, AuthorizationOptions, CategoryRegistration, CenterError, Notification,
    NotificationCenter, NotificationRequest,
};
use tandem_core::Environment;
use tokio::{sync::mpsc, task::AbortHandle};

struct Scheduled {
    generation: u64,
    task: AbortHandle,
}

#[derive(Default)]
struct TimerState {
    categories: Vec<CategoryRegistration>,
    pending: HashMap<String, Scheduled>,
    delivered: Vec<Notification>,
    next_generation: u64,
}

/// Timer-driven notification center for the demo device.
///
/// Authorization is always granted. Requests can only be added from inside a
/// tokio runtime.
pub struct TimerNotificationCenter<E: Environment> {
    env: E,
    state: Arc<Mutex<TimerState>>,
    deliveries: mpsc::UnboundedSender<Notification>,
}

impl<E: Environment> TimerNotificationCenter<E> {
    /// Create a center and the receiver its deliveries are published on.
    pub fn new(env: E) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (deliveries, rx) = mpsc::unbounded_channel();
        (Self { env, state: Arc::new(Mutex::new(TimerState::default())), deliveries }, rx)
    }

    /// Identifiers of requests still waiting to fire.
    pub fn pending_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = lock(&self.state).pending.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Notifications delivered and not yet removed.
    pub fn delivered(&self) -> Vec<Notification> {
        lock(&self.state).delivered.clone()
    }

    /// Number of registered categories.
    pub fn category_count(&self) -> usize {
        lock(&self.state).categories.len()
    }
}

impl<E: Environment> NotificationCenter for TimerNotificationCenter<E> {
    fn set_categories(&self, categories: Vec<CategoryRegistration>) {
        tracing::debug!(count = categories.len(), "categories registered");
        lock(&self.state).categories = categories;
    }

    fn request_authorization(
        &self,
        options: AuthorizationOptions,
        completion: AuthorizationHandler,
    ) {
        tracing::debug!(alert = options.alert, sound = options.sound, "authorization granted");
        completion(true);
    }

    fn register_for_remote_notifications(&self) {
        tracing::info!("remote notifications are not delivered on this device");
    }

    fn add(&self, request: NotificationRequest) -> Result<(), CenterError> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return Err(CenterError::Rejected {
                identifier: request.identifier,
                reason: "no timer runtime".to_string(),
            });
        };

        let mut state = lock(&self.state);
        let generation = state.next_generation;
        state.next_generation += 1;

        let identifier = request.identifier.clone();
        let task = runtime.spawn(fire(
            self.env.clone(),
            Arc::clone(&self.state),
            self.deliveries.clone(),
            request,
            generation,
        ));

        let scheduled = Scheduled { generation, task: task.abort_handle() };
        if let Some(replaced) = state.pending.insert(identifier, scheduled) {
            replaced.task.abort();
        }
        Ok(())
    }

    fn remove_pending(&self, identifiers: &[String]) {
        let mut state = lock(&self.state);
        for identifier in identifiers {
            if let Some(scheduled) = state.pending.remove(identifier) {
                scheduled.task.abort();
            }
        }
    }

    fn remove_delivered(&self, identifiers: &[String]) {
        lock(&self.state).delivered.retain(|n| !identifiers.contains(&n.request.identifier));
    }
}

impl<E: Environment> Drop for TimerNotificationCenter<E> {
    fn drop(&mut self) {
        for (_, scheduled) in lock(&self.state).pending.drain() {
            scheduled.task.abort();
        }
    }
}

async fn fire<E: Environment>(
    env: E,
    state: Arc<Mutex<TimerState>>,
    deliveries: mpsc::UnboundedSender<Notification>,
    request: NotificationRequest,
    generation: u64,
) {
    loop {
        env.sleep(request.trigger.interval).await;

        let notification =
            Notification { request: request.clone(), delivered_at: env.wall_clock_secs() };
        {
            let mut state = lock(&state);
            // Replaced after the timer fired but before this task was aborted
            if state.pending.get(&request.identifier).is_none_or(|s| s.generation != generation) {
                return;
            }
            if !request.trigger.repeats {
                state.pending.remove(&request.identifier);
            }
            // One delivered entry per identifier, the latest firing
            state.delivered.retain(|n| n.request.identifier != request.identifier);
            state.delivered.push(notification.clone());
        }

        tracing::info!(identifier = %request.identifier, "notification delivered");
        if deliveries.send(notification).is_err() || !request.trigger.repeats {
            return;
        }
    }
}

fn lock(state: &Mutex<TimerState>) -> MutexGuard<'_, TimerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
