//! Device mode.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{ProtocolError, Result},
    message::{MessageMap, Messageable, Value, text},
};

/// Role a device is configured to play.
///
/// Persisted as a single named setting and broadcast to the paired device
/// whenever the host changes it. Last write wins on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Mode not configured
    #[default]
    Undefined,
    /// Configured as primary device
    Primary,
    /// Configured as secondary device
    Secondary,
}

impl Mode {
    /// Key holding the mode in a message map.
    pub const KEY: &'static str = "mode";

    /// All modes, in declaration order.
    pub const ALL: [Self; 3] = [Self::Undefined, Self::Primary, Self::Secondary];

    /// Wire and storage string for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    /// Whether the mode has been configured.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "undefined" => Ok(Self::Undefined),
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            other => Err(ProtocolError::UnknownValue { key: Self::KEY, value: other.to_string() }),
        }
    }
}

impl Messageable for Mode {
    fn from_message(message: &MessageMap) -> Result<Self> {
        text(message, Self::KEY)?.parse()
    }

    fn to_message(&self) -> MessageMap {
        let mut map = MessageMap::new();
        map.insert(Self::KEY.to_string(), Value::Text(self.as_str().to_string()));
        map
    }
}
