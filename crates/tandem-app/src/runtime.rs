//! Per-role runtimes.
//!
//! Each runtime is the single context that owns its screen state. It drains
//! a UI event queue, feeds events to the pure state machine, and executes the
//! returned actions against the driver, the settings store, the notification
//! processor and the connectivity manager.
//!
//! Without a connectivity manager (the device has no paired-device support)
//! a runtime still drives its screen and notifications. Peer sends are
//! skipped.
//!
//! Transport callbacks never touch screen state. They post events through the
//! runtime's [`UiHandle`], which also keeps the queue open: `run` returns only
//! after a `Terminate` event is processed.

use std::sync::Arc;

use tandem_core::{ConnectivityManager, Environment, ModeStore, SendOptions, SessionTransport};
use tandem_proto::{CommandKey, CommandMessage, Messageable, Mode};
use tokio::sync::mpsc;

use crate::{
    behavior::{CompanionBehavior, HostBehavior},
    center::NotificationCenter,
    companion::{CompanionAction, CompanionApp, CompanionEvent},
    driver::Driver,
    host::{HostAction, HostApp, HostEvent},
    notification::{Category, Notification, NotificationEnvelope, PresentationOptions},
    processor::{NotificationProcessor, ResponseOutcome},
    ui::{UiHandle, ui_channel},
};

/// Companion-side runtime.
pub struct CompanionRuntime<D, T, E>
where
    D: Driver,
    T: SessionTransport + 'static,
    E: Environment,
{
    driver: D,
    app: CompanionApp,
    manager: Option<Arc<ConnectivityManager<T>>>,
    modes: ModeStore,
    processor: NotificationProcessor<E>,
    ui: UiHandle<CompanionEvent>,
    events: mpsc::UnboundedReceiver<CompanionEvent>,
}

impl<D, T, E> CompanionRuntime<D, T, E>
where
    D: Driver,
    T: SessionTransport + 'static,
    E: Environment,
{
    /// Create the runtime and install the companion behavior on `manager`.
    /// `None` runs without peer messaging.
    pub fn new(
        driver: D,
        manager: Option<Arc<ConnectivityManager<T>>>,
        modes: ModeStore,
        center: Arc<dyn NotificationCenter>,
        env: E,
    ) -> Self {
        let (ui, events) = ui_channel();
        match &manager {
            Some(manager) => {
                manager.set_behavior(Arc::new(CompanionBehavior::new(ui.clone())));
            },
            None => tracing::info!("no peer link, companion runs without peer messaging"),
        }

        Self {
            driver,
            app: CompanionApp::new(),
            manager,
            modes,
            processor: NotificationProcessor::new(center, env),
            ui,
            events,
        }
    }

    /// Handle for posting events from other contexts.
    pub fn ui_handle(&self) -> UiHandle<CompanionEvent> {
        self.ui.clone()
    }

    /// Screen state.
    pub fn app(&self) -> &CompanionApp {
        &self.app
    }

    /// Presentation driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Foreground presentation hook.
    pub fn will_present(&self, notification: &Notification) -> PresentationOptions {
        self.processor.will_present(notification)
    }

    /// App launch. `context` is the notification the app was opened from.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn launch(&mut self, context: Option<NotificationEnvelope>) -> Result<(), D::Error> {
        if let Err(error) = self.modes.register_defaults() {
            tracing::warn!(%error, "failed to register default mode");
        }
        self.processor.register();

        let stored_mode = self.modes.current();
        self.dispatch(CompanionEvent::Awake { stored_mode, context })?;
        Ok(())
    }

    /// App became active: refresh the screen and ask the host for its mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn became_active(&mut self) -> Result<(), D::Error> {
        self.dispatch(CompanionEvent::WillActivate)?;
        self.request_mode();
        Ok(())
    }

    /// Process one event. Returns `true` if the runtime should stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn dispatch(&mut self, event: CompanionEvent) -> Result<bool, D::Error> {
        if let CompanionEvent::NotificationReceived(envelope) = &event
            && self.processor.did_receive(envelope) == ResponseOutcome::RepeatingCancelled
        {
            return Ok(false);
        }

        for action in self.app.handle(event) {
            match action {
                CompanionAction::Render => self.driver.render_companion(&self.app)?,
                CompanionAction::PersistMode(mode) => {
                    if let Err(error) = self.modes.set(mode) {
                        tracing::warn!(%error, %mode, "failed to persist mode");
                    }
                },
                CompanionAction::Transition(transition) => self.driver.transition(&transition)?,
                CompanionAction::ScheduleLocalNotification => {
                    let category = Category::PrimaryMode.identifier();
                    if let Err(error) = self.processor.schedule_local(category, None) {
                        tracing::warn!(%error, "failed to schedule local notification");
                    }
                },
                CompanionAction::ScheduleRepeatingNotification => {
                    self.processor.add_repeating_notification_triggers();
                },
                CompanionAction::Quit => return Ok(true),
            }
        }

        Ok(false)
    }

    /// Process queued events without waiting. Returns `true` if a processed
    /// event asked the runtime to stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn drain(&mut self) -> Result<bool, D::Error> {
        while let Ok(event) = self.events.try_recv() {
            if self.dispatch(event)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run until a `Terminate` event is processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub async fn run(mut self) -> Result<(), D::Error> {
        while let Some(event) = self.events.recv().await {
            if self.dispatch(event)? {
                break;
            }
        }

        if let Some(manager) = &self.manager {
            manager.clear_behavior();
        }
        self.driver.stop();
        Ok(())
    }

    fn request_mode(&self) {
        let Some(manager) = &self.manager else {
            tracing::debug!("no peer link, mode request skipped");
            return;
        };

        let ui = self.ui.clone();
        let options = SendOptions::default()
            .queue_if_necessary()
            .on_reply(move |reply| match Mode::from_message(&reply) {
                Ok(mode) => {
                    tracing::debug!(%mode, "mode reply received");
                    ui.post(CompanionEvent::ModeReceived(mode));
                },
                Err(error) => tracing::warn!(%error, "undecodable mode reply"),
            })
            .on_error(|error| tracing::warn!(%error, "mode request failed"));

        let request = CommandMessage::new(CommandKey::RequestMode).to_message();
        let outcome = manager.send(request, options);
        tracing::debug!(?outcome, "mode requested");
    }
}

/// Host-side runtime.
pub struct HostRuntime<D, T, E>
where
    D: Driver,
    T: SessionTransport + 'static,
    E: Environment,
{
    driver: D,
    app: HostApp,
    manager: Option<Arc<ConnectivityManager<T>>>,
    modes: ModeStore,
    processor: NotificationProcessor<E>,
    ui: UiHandle<HostEvent>,
    events: mpsc::UnboundedReceiver<HostEvent>,
}

impl<D, T, E> HostRuntime<D, T, E>
where
    D: Driver,
    T: SessionTransport + 'static,
    E: Environment,
{
    /// Create the runtime and install the host behavior on `manager`.
    /// `None` runs without peer messaging.
    pub fn new(
        driver: D,
        manager: Option<Arc<ConnectivityManager<T>>>,
        modes: ModeStore,
        center: Arc<dyn NotificationCenter>,
        env: E,
    ) -> Self {
        let (ui, events) = ui_channel();
        match &manager {
            Some(manager) => {
                let behavior = HostBehavior::new(modes.clone(), Arc::clone(&center));
                manager.set_behavior(Arc::new(behavior));
            },
            None => tracing::info!("no peer link, host runs without peer messaging"),
        }

        Self {
            driver,
            app: HostApp::new(),
            manager,
            modes,
            processor: NotificationProcessor::new(center, env),
            ui,
            events,
        }
    }

    /// Handle for posting events from other contexts.
    pub fn ui_handle(&self) -> UiHandle<HostEvent> {
        self.ui.clone()
    }

    /// Screen state.
    pub fn app(&self) -> &HostApp {
        &self.app
    }

    /// Presentation driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Foreground presentation hook.
    pub fn will_present(&self, notification: &Notification) -> PresentationOptions {
        self.processor.will_present(notification)
    }

    /// Response hook.
    pub fn did_receive(&self, envelope: &NotificationEnvelope) -> ResponseOutcome {
        self.processor.did_receive(envelope)
    }

    /// App launch: register notifications, load the stored mode and
    /// broadcast it.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn launch(&mut self) -> Result<(), D::Error> {
        if let Err(error) = self.modes.register_defaults() {
            tracing::warn!(%error, "failed to register default mode");
        }
        self.processor.register();

        let stored_mode = self.modes.current();
        self.dispatch(HostEvent::Started { stored_mode })?;
        Ok(())
    }

    /// Process one event. Returns `true` if the runtime should stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn dispatch(&mut self, event: HostEvent) -> Result<bool, D::Error> {
        for action in self.app.handle(event) {
            match action {
                HostAction::Render => self.driver.render_host(&self.app)?,
                HostAction::PersistMode(mode) => {
                    if let Err(error) = self.modes.set(mode) {
                        tracing::warn!(%error, %mode, "failed to persist mode");
                    }
                },
                HostAction::BroadcastMode(mode) => self.broadcast_mode(mode),
                HostAction::ScheduleLocalNotification {
                    category_identifier,
                    attachment_identifier,
                } => {
                    let attachment = attachment_identifier.as_deref();
                    let scheduled = self.processor.schedule_local(&category_identifier, attachment);
                    if let Err(error) = scheduled {
                        tracing::warn!(%error, "failed to schedule local notification");
                    }
                },
                HostAction::ScheduleRepeatingNotification => {
                    self.processor.add_repeating_notification_triggers();
                },
                HostAction::Quit => return Ok(true),
            }
        }

        Ok(false)
    }

    /// Process queued events without waiting. Returns `true` if a processed
    /// event asked the runtime to stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub fn drain(&mut self) -> Result<bool, D::Error> {
        while let Ok(event) = self.events.try_recv() {
            if self.dispatch(event)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run until a `Terminate` event is processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub async fn run(mut self) -> Result<(), D::Error> {
        while let Some(event) = self.events.recv().await {
            if self.dispatch(event)? {
                break;
            }
        }

        if let Some(manager) = &self.manager {
            manager.clear_behavior();
        }
        self.driver.stop();
        Ok(())
    }

    fn broadcast_mode(&self, mode: Mode) {
        let Some(manager) = &self.manager else {
            tracing::debug!(%mode, "no peer link, mode broadcast skipped");
            return;
        };

        let outcome = manager.send(mode.to_message(), SendOptions::default().queue_if_necessary());
        tracing::debug!(%mode, ?outcome, "mode broadcast");
    }
}
