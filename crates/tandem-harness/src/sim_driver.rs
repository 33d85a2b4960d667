//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` records what a real screen would show so tests can assert on
//! rendered state and navigation. It implements [`Driver`] so the same
//! runtimes run in production and simulation. With an
//! [`InvariantRegistry`] attached, every render is checked.

use std::fmt;

use tandem_app::{CompanionApp, Driver, HostApp, Transition};

use crate::invariants::{CompanionSnapshot, HostSnapshot, InvariantRegistry, SystemSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// A recorded render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Host screen
    Host(HostSnapshot),
    /// Companion screen
    Companion(CompanionSnapshot),
}

/// Simulation driver for deterministic testing.
#[derive(Default)]
pub struct SimDriver {
    frames: Vec<Frame>,
    transitions: Vec<Transition>,
    stopped: bool,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Every render, oldest first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Most recent render.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Every navigation change, oldest first.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Whether `stop` was called.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    fn check(&self, snapshot: &SystemSnapshot, context: &str) {
        if let Some(registry) = &self.invariants {
            registry.assert_all(snapshot, context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    fn render_host(&mut self, app: &HostApp) -> Result<(), Self::Error> {
        self.check(&SystemSnapshot::host(app), "after host render");
        self.frames.push(Frame::Host(HostSnapshot::from_app(app)));
        Ok(())
    }

    fn render_companion(&mut self, app: &CompanionApp) -> Result<(), Self::Error> {
        self.check(&SystemSnapshot::companion(app), "after companion render");
        self.frames.push(Frame::Companion(CompanionSnapshot::from_app(app)));
        Ok(())
    }

    fn transition(&mut self, transition: &Transition) -> Result<(), Self::Error> {
        if self.stopped {
            return Err(SimDriverError("transition after stop".to_string()));
        }
        self.transitions.push(transition.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}
