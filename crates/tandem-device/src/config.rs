//! Demo configuration.

use std::{path::PathBuf, time::Duration};

use tandem_app::{Action, DEFAULT_ASSET_HOST, NotificationResponse};
use tandem_proto::Mode;

use crate::{error::DeviceError, fetcher::DEFAULT_FETCH_TIMEOUT};

/// Which side keeps its settings in the database file.
///
/// The other side uses in-memory settings for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Role {
    /// The device that selects the mode
    #[default]
    Host,
    /// The paired companion
    Companion,
}

/// How the simulated user answers the companion's notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScriptedResponse {
    /// Let it arrive without interaction
    None,
    /// Choose the modal action
    #[default]
    Modal,
    /// Reply with text
    TextInput,
    /// Choose the call action
    Call,
    /// Choose the background action
    Background,
    /// Dismiss it
    Dismiss,
}

impl ScriptedResponse {
    /// Text sent for [`ScriptedResponse::TextInput`].
    pub const REPLY_TEXT: &'static str = "On my way";

    /// The response delivered with the notification.
    pub fn to_response(self) -> Option<NotificationResponse> {
        match self {
            Self::None => None,
            Self::Modal => Some(NotificationResponse::action(Action::Modal)),
            Self::TextInput => Some(NotificationResponse::text(Self::REPLY_TEXT)),
            Self::Call => Some(NotificationResponse::action(Action::Call)),
            Self::Background => Some(NotificationResponse::action(Action::Background)),
            Self::Dismiss => Some(NotificationResponse::dismiss()),
        }
    }
}

/// Configuration for one demo run.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Side whose settings are persisted
    pub role: Role,
    /// Mode the host selects once the link is up. `None` keeps the stored
    /// mode.
    pub initial_mode: Option<Mode>,
    /// Settings database. `None` keeps both sides in memory.
    pub settings_path: Option<PathBuf>,
    /// Host serving attachment images
    pub asset_host: String,
    /// Download the attachment of the host's notification
    pub fetch_attachments: bool,
    /// Per-request attachment timeout
    pub fetch_timeout: Duration,
    /// Answer given to the companion's notification
    pub response: ScriptedResponse,
    /// Delay before both sessions finish activating
    pub activation_delay: Duration,
    /// Whether the link reports paired-device support
    pub link_supported: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            role: Role::Host,
            initial_mode: Some(Mode::Primary),
            settings_path: None,
            asset_host: DEFAULT_ASSET_HOST.to_string(),
            fetch_attachments: false,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            response: ScriptedResponse::Modal,
            activation_delay: Duration::from_millis(500),
            link_supported: true,
        }
    }
}

impl DeviceConfig {
    /// Check values a run cannot start without.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Config` naming the first bad value.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.asset_host.is_empty() || self.asset_host.contains('/') {
            return Err(DeviceError::Config(format!("invalid asset host {:?}", self.asset_host)));
        }
        if self.fetch_timeout.is_zero() {
            return Err(DeviceError::Config("fetch timeout must be positive".to_string()));
        }
        Ok(())
    }
}
