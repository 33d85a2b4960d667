//! A host and a companion wired together over the in-memory link.
//!
//! Nothing runs on its own. [`SimPair::pump`] delivers queued session events
//! to both managers and drains both UI queues, repeating until the link is
//! quiet, so a test controls exactly when traffic flows.

use std::sync::Arc;

use tandem_app::{
    CompanionEvent, CompanionRuntime, HostRuntime, NotificationEnvelope, NotificationResponse,
};
use tandem_core::{
    ActivationState, ConnectivityError, ConnectivityManager, ModeStore, SessionEvent,
    memory::{MemoryLink, MemorySession},
};
use tokio::sync::mpsc;

use crate::{
    sim_center::SimNotificationCenter,
    sim_driver::{SimDriver, SimDriverError},
    sim_env::SimEnv,
};

/// Host runtime over simulation parts.
pub type SimHost = HostRuntime<SimDriver, MemorySession, SimEnv>;

/// Companion runtime over simulation parts.
pub type SimCompanion = CompanionRuntime<SimDriver, MemorySession, SimEnv>;

/// Rounds of delivery before the link is declared stuck.
const MAX_ROUNDS: usize = 64;

/// Host and companion over one link, sharing a virtual clock.
pub struct SimPair {
    /// Shared environment
    pub env: SimEnv,
    /// Host runtime
    pub host: SimHost,
    /// Companion runtime
    pub companion: SimCompanion,
    /// Host connectivity manager
    pub host_manager: Arc<ConnectivityManager<MemorySession>>,
    /// Companion connectivity manager
    pub companion_manager: Arc<ConnectivityManager<MemorySession>>,
    /// Host notification center
    pub host_center: Arc<SimNotificationCenter>,
    /// Companion notification center
    pub companion_center: Arc<SimNotificationCenter>,
    /// Host settings
    pub host_modes: ModeStore,
    /// Companion settings
    pub companion_modes: ModeStore,
    host_events: mpsc::UnboundedReceiver<SessionEvent>,
    companion_events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SimPair {
    /// Build both sides with fresh in-memory settings. Neither side is
    /// launched and neither session is activated.
    pub fn new(seed: u64) -> Result<Self, ConnectivityError> {
        Self::with_drivers(seed, SimDriver::new(), SimDriver::new())
    }

    /// Build both sides with the given drivers.
    pub fn with_drivers(
        seed: u64,
        host_driver: SimDriver,
        companion_driver: SimDriver,
    ) -> Result<Self, ConnectivityError> {
        let env = SimEnv::with_seed(seed);
        let (host_end, companion_end) = MemoryLink::pair();

        let host_manager = Arc::new(ConnectivityManager::new(host_end.session)?);
        let companion_manager = Arc::new(ConnectivityManager::new(companion_end.session)?);
        let host_center = Arc::new(SimNotificationCenter::new(env.clone()));
        let companion_center = Arc::new(SimNotificationCenter::new(env.clone()));
        let host_modes = ModeStore::in_memory();
        let companion_modes = ModeStore::in_memory();

        let host = HostRuntime::new(
            host_driver,
            Some(Arc::clone(&host_manager)),
            host_modes.clone(),
            host_center.clone(),
            env.clone(),
        );
        let companion = CompanionRuntime::new(
            companion_driver,
            Some(Arc::clone(&companion_manager)),
            companion_modes.clone(),
            companion_center.clone(),
            env.clone(),
        );

        Ok(Self {
            env,
            host,
            companion,
            host_manager,
            companion_manager,
            host_center,
            companion_center,
            host_modes,
            companion_modes,
            host_events: host_end.events,
            companion_events: companion_end.events,
        })
    }

    /// Host transport.
    pub fn host_session(&self) -> &MemorySession {
        self.host_manager.transport()
    }

    /// Companion transport.
    pub fn companion_session(&self) -> &MemorySession {
        self.companion_manager.transport()
    }

    /// Complete activation on both sides. Takes effect on the next pump.
    pub fn activate(&self) {
        self.host_session().complete_activation(ActivationState::Activated);
        self.companion_session().complete_activation(ActivationState::Activated);
    }

    /// Deliver traffic until both session queues and both UI queues are
    /// empty.
    pub fn pump(&mut self) -> Result<(), SimDriverError> {
        for _ in 0..MAX_ROUNDS {
            let delivered = self.deliver_session_events();
            self.host.drain()?;
            self.companion.drain()?;

            if delivered == 0 && self.host_events.is_empty() && self.companion_events.is_empty() {
                return Ok(());
            }
        }

        Err(SimDriverError(format!("link still busy after {MAX_ROUNDS} rounds")))
    }

    /// Deliver due companion notifications, each with `response`, to the
    /// companion runtime. Returns how many were delivered.
    pub fn deliver_companion_notifications(
        &mut self,
        response: Option<NotificationResponse>,
    ) -> usize {
        let due = self.companion_center.deliver_due();
        let count = due.len();
        let ui = self.companion.ui_handle();
        for notification in due {
            ui.post(CompanionEvent::NotificationReceived(NotificationEnvelope {
                notification,
                response: response.clone(),
            }));
        }
        count
    }

    fn deliver_session_events(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.host_events.try_recv() {
            self.host_manager.handle_event(event);
            delivered += 1;
        }
        while let Ok(event) = self.companion_events.try_recv() {
            self.companion_manager.handle_event(event);
            delivered += 1;
        }
        delivered
    }
}
