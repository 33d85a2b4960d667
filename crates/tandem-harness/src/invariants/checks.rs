//! Standard invariant checks.

use tandem_app::HostControls;
use tandem_proto::Mode;

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// While a notification is pending no mode group is visible; otherwise
/// exactly the current mode's group is.
pub struct VisibilityMatchesPending;

impl Invariant for VisibilityMatchesPending {
    fn kind(&self) -> InvariantKind {
        InvariantKind::VisibilityMatchesPending
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(companion) = &state.companion else {
            return Ok(());
        };

        let expected = if companion.pending { None } else { Some(companion.mode) };
        if companion.visible_group == expected {
            return Ok(());
        }

        Err(Violation {
            invariant: self.kind(),
            message: format!(
                "mode {} pending {}: visible group {:?}, expected {:?}",
                companion.mode, companion.pending, companion.visible_group, expected
            ),
        })
    }
}

/// Host controls are a function of the host mode.
pub struct HostControlsMatchMode;

impl Invariant for HostControlsMatchMode {
    fn kind(&self) -> InvariantKind {
        InvariantKind::HostControlsMatchMode
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(host) = &state.host else {
            return Ok(());
        };

        let configured = host.mode.is_defined();
        let primary = host.mode == Mode::Primary;
        let expected = HostControls {
            reset: configured,
            select_primary: !configured,
            select_secondary: !configured,
            known_notification: primary,
            unknown_notification: primary,
            repeating_notification: true,
        };

        if host.controls == expected {
            return Ok(());
        }

        Err(Violation {
            invariant: self.kind(),
            message: format!(
                "mode {}: controls {:?}, expected {:?}",
                host.mode, host.controls, expected
            ),
        })
    }
}

/// Host and companion agree on the mode.
///
/// Only meaningful once every queued send has been delivered.
pub struct ModeConvergence;

impl Invariant for ModeConvergence {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ModeConvergence
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let (Some(host), Some(companion)) = (&state.host, &state.companion) else {
            return Ok(());
        };

        if host.mode == companion.mode {
            return Ok(());
        }

        Err(Violation {
            invariant: self.kind(),
            message: format!("host mode {} != companion mode {}", host.mode, companion.mode),
        })
    }
}
