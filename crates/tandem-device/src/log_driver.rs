//! Driver that renders screens as log lines.

use std::{
    convert::Infallible,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tandem_app::{CompanionApp, Driver, HostApp, Transition};

/// Counters shared between a [`LogDriver`] and whoever reports on the run.
#[derive(Debug, Default)]
pub struct DriverStats {
    renders: AtomicUsize,
    transitions: AtomicUsize,
}

impl DriverStats {
    /// Screens drawn.
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::Relaxed)
    }

    /// Navigation changes applied.
    pub fn transitions(&self) -> usize {
        self.transitions.load(Ordering::Relaxed)
    }
}

/// Logs every render and transition at `info`. Never fails.
pub struct LogDriver {
    role: &'static str,
    stats: Arc<DriverStats>,
}

impl LogDriver {
    /// Driver whose lines are tagged with `role`.
    pub fn new(role: &'static str) -> Self {
        Self { role, stats: Arc::new(DriverStats::default()) }
    }

    /// Counters for this driver.
    pub fn stats(&self) -> Arc<DriverStats> {
        Arc::clone(&self.stats)
    }
}

impl Driver for LogDriver {
    type Error = Infallible;

    fn render_host(&mut self, app: &HostApp) -> Result<(), Self::Error> {
        self.stats.renders.fetch_add(1, Ordering::Relaxed);
        let controls = app.controls();
        tracing::info!(
            role = self.role,
            title = app.title(),
            reset = controls.reset,
            known = controls.known_notification,
            unknown = controls.unknown_notification,
            "host screen"
        );
        Ok(())
    }

    fn render_companion(&mut self, app: &CompanionApp) -> Result<(), Self::Error> {
        self.stats.renders.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            role = self.role,
            title = app.title(),
            visible = ?app.visible_group(),
            pending = app.pending().is_some(),
            secondary = ?app.secondary().body,
            "companion screen"
        );
        Ok(())
    }

    fn transition(&mut self, transition: &Transition) -> Result<(), Self::Error> {
        self.stats.transitions.fetch_add(1, Ordering::Relaxed);
        tracing::info!(role = self.role, ?transition, "transition");
        Ok(())
    }

    fn stop(&mut self) {
        tracing::debug!(role = self.role, "driver stopped");
    }
}
