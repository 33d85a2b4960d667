//! Observable state snapshots for invariant checking.

use tandem_app::{CompanionApp, HostApp, HostControls};
use tandem_proto::Mode;

/// Snapshot of both devices. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemSnapshot {
    /// Host screen
    pub host: Option<HostSnapshot>,
    /// Companion root screen
    pub companion: Option<CompanionSnapshot>,
}

impl SystemSnapshot {
    /// Snapshot of a host alone.
    pub fn host(app: &HostApp) -> Self {
        Self { host: Some(HostSnapshot::from_app(app)), companion: None }
    }

    /// Snapshot of a companion alone.
    pub fn companion(app: &CompanionApp) -> Self {
        Self { host: None, companion: Some(CompanionSnapshot::from_app(app)) }
    }

    /// Snapshot of both devices.
    pub fn pair(host: &HostApp, companion: &CompanionApp) -> Self {
        Self {
            host: Some(HostSnapshot::from_app(host)),
            companion: Some(CompanionSnapshot::from_app(companion)),
        }
    }
}

/// Host screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    /// Selected mode
    pub mode: Mode,
    /// Control visibility
    pub controls: HostControls,
}

impl HostSnapshot {
    /// Capture `app`.
    pub fn from_app(app: &HostApp) -> Self {
        Self { mode: app.mode(), controls: app.controls() }
    }
}

/// Companion root screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionSnapshot {
    /// Mode last received or loaded
    pub mode: Mode,
    /// Whether a notification is held
    pub pending: bool,
    /// Visible mode group
    pub visible_group: Option<Mode>,
    /// Whether a modal is presented
    pub modal: bool,
    /// Pushed detail count
    pub navigation_depth: usize,
}

impl CompanionSnapshot {
    /// Capture `app`.
    pub fn from_app(app: &CompanionApp) -> Self {
        Self {
            mode: app.mode(),
            pending: app.pending().is_some(),
            visible_group: app.visible_group(),
            modal: app.modal().is_some(),
            navigation_depth: app.navigation().len(),
        }
    }
}
