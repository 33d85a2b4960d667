//! Driver trait for abstracting presentation.
//!
//! The [`Driver`] trait decouples the runtimes from a concrete screen. A
//! device frontend draws real widgets; the simulation harness records what
//! would have been shown so tests can assert on it.

use crate::{
    companion::{CompanionApp, Transition},
    host::HostApp,
};

/// Presentation side of a runtime.
///
/// Methods are only ever called from the runtime that owns the screen state.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Draw the host screen.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_host(&mut self, app: &HostApp) -> Result<(), Self::Error>;

    /// Draw the companion screen.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render_companion(&mut self, app: &CompanionApp) -> Result<(), Self::Error>;

    /// Apply a navigation change on the companion.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be applied.
    fn transition(&mut self, transition: &Transition) -> Result<(), Self::Error>;

    /// Release resources. Called once when the runtime exits.
    fn stop(&mut self);
}
