//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during system execution.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all possible execution paths.
//!
//! # Architecture
//!
//! Observable state is extracted from [`HostApp`](tandem_app::HostApp) and
//! [`CompanionApp`](tandem_app::CompanionApp) into a [`SystemSnapshot`], then
//! registered [`Invariant`] checks run against it.

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{HostControlsMatchMode, ModeConvergence, VisibilityMatchesPending};
pub use snapshot::{CompanionSnapshot, HostSnapshot, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies an invariant in violation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantKind {
    /// Mode groups hidden exactly while a notification is pending
    VisibilityMatchesPending,
    /// Host controls agree with the host mode
    HostControlsMatchMode,
    /// Host and companion agree on the mode
    ModeConvergence,
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against system state.
pub trait Invariant: Send + Sync {
    /// Which invariant this is.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant against a snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Invariants that hold after every processed event.
    ///
    /// [`ModeConvergence`] is excluded: it only holds once the link is idle.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(VisibilityMatchesPending);
        registry.add(HostControlsMatchMode);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants, collecting every violation.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    #[allow(clippy::panic, reason = "Test-harness assertion")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tandem_app::{CompanionApp, HostApp};

    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        assert_eq!(InvariantRegistry::standard().len(), 2);
    }

    #[test]
    fn fresh_apps_pass() {
        let snapshot = SystemSnapshot::pair(&HostApp::new(), &CompanionApp::new());

        assert!(InvariantRegistry::standard().check_all(&snapshot).is_ok());
    }

    #[test]
    fn empty_snapshot_passes() {
        let mut registry = InvariantRegistry::standard();
        registry.add(ModeConvergence);

        assert!(registry.check_all(&SystemSnapshot::default()).is_ok());
    }
}
