//! Scripted host and companion run over the in-memory link.
//!
//! Both runtimes share one tokio runtime. Each side's connectivity manager
//! consumes its session events on a spawned task, and a script plays
//! the user: it waits for activation, selects a mode on the host, schedules a
//! notification on each side, answers the companion's and then terminates
//! both apps. On an unsupported link both sides run without a manager and
//! only their local notifications flow.

use std::{path::Path, sync::Arc, time::Duration};

use tandem_app::{
    CompanionEvent, CompanionRuntime, HostEvent, HostRuntime, LOCAL_NOTIFICATION_DELAY,
    Notification, NotificationEnvelope, PrimaryNotificationView, UiHandle,
    load_primary_notification,
};
use tandem_core::{
    ActivationState, ConnectivityManager, Environment, ModeStore,
    memory::{LinkEndpoint, MemoryLink, MemorySession},
};
use tandem_proto::Mode;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    center::TimerNotificationCenter,
    config::{DeviceConfig, Role},
    error::DeviceError,
    fetcher::HttpAssetFetcher,
    log_driver::LogDriver,
    settings::RedbSettings,
    system_env::SystemEnv,
};

/// Pause between activation and the first user action, long enough for the
/// activation replay to finish.
const SETTLE: Duration = Duration::from_millis(200);

/// Slack on top of a notification's trigger before giving up on it.
const DELIVERY_SLACK: Duration = Duration::from_secs(1);

/// What a finished run left behind.
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// Host's stored mode
    pub host_mode: Mode,
    /// Companion's stored mode
    pub companion_mode: Mode,
    /// Notifications delivered on the host
    pub host_delivered: usize,
    /// Notifications delivered on the companion
    pub companion_delivered: usize,
    /// Navigation changes applied on the companion
    pub companion_transitions: usize,
    /// Primary view built for the host's notification, when fetching
    pub primary_view: Option<PrimaryNotificationView>,
}

/// Run the scripted scenario to completion.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the settings
/// database cannot be opened. An unsupported link is not an error: both
/// sides run without peer messaging.
pub async fn run_demo(config: DeviceConfig) -> Result<DemoReport, DeviceError> {
    config.validate()?;
    let env = SystemEnv::new();

    let persisted = mode_store(config.settings_path.as_deref())?;
    let (host_modes, companion_modes) = match config.role {
        Role::Host => (persisted, ModeStore::in_memory()),
        Role::Companion => (ModeStore::in_memory(), persisted),
    };

    let (host_end, companion_end) = MemoryLink::pair();
    let host_session = host_end.session.clone();
    let companion_session = companion_end.session.clone();
    host_session.set_supported(config.link_supported);
    let host_peer = connect("host", host_end);
    let companion_peer = connect("companion", companion_end);

    let (host_center, host_deliveries) = TimerNotificationCenter::new(env.clone());
    let (companion_center, companion_deliveries) = TimerNotificationCenter::new(env.clone());
    let host_center = Arc::new(host_center);
    let companion_center = Arc::new(companion_center);

    let companion_driver = LogDriver::new("companion");
    let companion_stats = companion_driver.stats();

    let mut host = HostRuntime::new(
        LogDriver::new("host"),
        host_peer.as_ref().map(PeerLink::manager),
        host_modes.clone(),
        host_center.clone(),
        env.clone(),
    );
    let mut companion = CompanionRuntime::new(
        companion_driver,
        companion_peer.as_ref().map(PeerLink::manager),
        companion_modes.clone(),
        companion_center.clone(),
        env.clone(),
    );

    let Ok(()) = host.launch();
    let Ok(()) = companion.launch(None);
    let Ok(_) = companion.dispatch(CompanionEvent::DidAppear);
    let Ok(()) = companion.became_active();

    let script = Script {
        config: &config,
        env,
        host_ui: host.ui_handle(),
        companion_ui: companion.ui_handle(),
        host_session: &host_session,
        companion_session: &companion_session,
    };
    let (Ok(()), Ok(()), primary_view) = tokio::join!(
        host.run(),
        companion.run(),
        script.play(host_deliveries, companion_deliveries)
    );

    drop((host_peer, companion_peer));

    let report = DemoReport {
        host_mode: host_modes.current(),
        companion_mode: companion_modes.current(),
        host_delivered: host_center.delivered().len(),
        companion_delivered: companion_center.delivered().len(),
        companion_transitions: companion_stats.transitions(),
        primary_view,
    };
    tracing::info!(?report, "demo finished");
    Ok(report)
}

/// One side's connectivity manager and the task feeding it session events.
struct PeerLink {
    manager: Arc<ConnectivityManager<MemorySession>>,
    pump: JoinHandle<()>,
}

impl PeerLink {
    fn manager(&self) -> Arc<ConnectivityManager<MemorySession>> {
        Arc::clone(&self.manager)
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Start peer messaging for one side. `None` if the link is unsupported, in
/// which case the side runs without a peer.
fn connect(side: &'static str, end: LinkEndpoint) -> Option<PeerLink> {
    let manager = match ConnectivityManager::new(end.session) {
        Ok(manager) => Arc::new(manager),
        Err(error) => {
            tracing::warn!(side, %error, "peer messaging disabled");
            return None;
        },
    };

    let events = end.events;
    let pump = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.run(events).await })
    };
    Some(PeerLink { manager, pump })
}

fn mode_store(path: Option<&Path>) -> Result<ModeStore, DeviceError> {
    let Some(path) = path else {
        return Ok(ModeStore::in_memory());
    };
    let settings = RedbSettings::open(path)?;
    tracing::info!(path = %path.display(), "settings opened");
    Ok(ModeStore::new(Arc::new(settings)))
}

/// The simulated user.
struct Script<'a> {
    config: &'a DeviceConfig,
    env: SystemEnv,
    host_ui: UiHandle<HostEvent>,
    companion_ui: UiHandle<CompanionEvent>,
    host_session: &'a MemorySession,
    companion_session: &'a MemorySession,
}

impl Script<'_> {
    async fn play(
        self,
        mut host_deliveries: mpsc::UnboundedReceiver<Notification>,
        mut companion_deliveries: mpsc::UnboundedReceiver<Notification>,
    ) -> Option<PrimaryNotificationView> {
        self.env.sleep(self.config.activation_delay).await;
        self.host_session.complete_activation(ActivationState::Activated);
        self.companion_session.complete_activation(ActivationState::Activated);
        self.env.sleep(SETTLE).await;

        if let Some(mode) = self.config.initial_mode {
            self.host_ui.post(HostEvent::SelectMode(mode));
        }
        self.host_ui.post(HostEvent::SendKnownNotification);
        self.companion_ui.post(CompanionEvent::RequestLocalNotification);

        match self.next_delivery(&mut companion_deliveries).await {
            Some(notification) => {
                self.companion_ui.post(CompanionEvent::NotificationReceived(NotificationEnvelope {
                    notification,
                    response: self.config.response.to_response(),
                }));
            },
            None => tracing::warn!("companion notification never arrived"),
        }

        let primary_view = match self.next_delivery(&mut host_deliveries).await {
            Some(notification) if self.config.fetch_attachments => {
                self.load_view(&notification).await
            },
            Some(_) => None,
            None => {
                tracing::warn!("host notification never arrived");
                None
            },
        };

        self.host_ui.post(HostEvent::Terminate);
        self.companion_ui.post(CompanionEvent::Terminate);
        primary_view
    }

    async fn next_delivery(
        &self,
        deliveries: &mut mpsc::UnboundedReceiver<Notification>,
    ) -> Option<Notification> {
        tokio::time::timeout(LOCAL_NOTIFICATION_DELAY + DELIVERY_SLACK, deliveries.recv())
            .await
            .ok()
            .flatten()
    }

    async fn load_view(&self, notification: &Notification) -> Option<PrimaryNotificationView> {
        let fetcher = match HttpAssetFetcher::new(self.config.fetch_timeout) {
            Ok(fetcher) => fetcher,
            Err(error) => {
                tracing::warn!(%error, "attachment fetching unavailable");
                return None;
            },
        };

        let view = load_primary_notification(&fetcher, &self.config.asset_host, notification, || {
            tracing::debug!("attachment load finished");
        })
        .await;
        Some(view)
    }
}
