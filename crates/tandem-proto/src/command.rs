//! Command messages.
//!
//! Commands carry a reserved discriminator under [`COMMAND_KEY`]. Decoders
//! check the discriminator first and only then read type-specific keys.

use std::{fmt, str::FromStr};

use crate::{
    errors::{ProtocolError, Result},
    message::{MessageMap, Messageable, Value, text},
};

/// Discriminator key present in every command map.
pub const COMMAND_KEY: &str = "Command";

/// Commands supported over the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKey {
    /// Ask the host for its current mode
    RequestMode,
    /// Remove a delivered notification from the receiver's notification
    /// center
    ClearNotification,
}

impl CommandKey {
    /// Wire string for this command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestMode => "requestMode",
            Self::ClearNotification => "clearNotification",
        }
    }

    /// Read the discriminator from a map.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MissingKey` if there is no discriminator
    /// - `ProtocolError::UnknownValue` if it names an unknown command
    pub fn from_message(message: &MessageMap) -> Result<Self> {
        text(message, COMMAND_KEY)?.parse()
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "requestMode" => Ok(Self::RequestMode),
            "clearNotification" => Ok(Self::ClearNotification),
            other => {
                Err(ProtocolError::UnknownValue { key: COMMAND_KEY, value: other.to_string() })
            },
        }
    }
}

/// Generic command with no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMessage {
    /// Command type
    pub command: CommandKey,
}

impl CommandMessage {
    /// Create a payload-free command.
    pub const fn new(command: CommandKey) -> Self {
        Self { command }
    }
}

impl Messageable for CommandMessage {
    fn from_message(message: &MessageMap) -> Result<Self> {
        CommandKey::from_message(message).map(Self::new)
    }

    fn to_message(&self) -> MessageMap {
        let mut map = MessageMap::new();
        map.insert(COMMAND_KEY.to_string(), Value::Text(self.command.as_str().to_string()));
        map
    }
}

/// Command asking the receiver to clear one delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearNotificationCommand {
    /// Notification request identifier to clear
    pub identifier: String,
}

impl ClearNotificationCommand {
    /// Key holding the notification identifier.
    pub const IDENTIFIER_KEY: &'static str = "IdentifierKey";

    /// Create a clear command for the given notification request identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into() }
    }

    /// Command type, always [`CommandKey::ClearNotification`].
    #[must_use]
    pub const fn command(&self) -> CommandKey {
        CommandKey::ClearNotification
    }
}

impl Messageable for ClearNotificationCommand {
    fn from_message(message: &MessageMap) -> Result<Self> {
        let command = CommandKey::from_message(message)?;
        if command != CommandKey::ClearNotification {
            return Err(ProtocolError::CommandMismatch {
                expected: CommandKey::ClearNotification.as_str(),
                actual: command.as_str().to_string(),
            });
        }

        let identifier = text(message, Self::IDENTIFIER_KEY)?;
        Ok(Self::new(identifier))
    }

    fn to_message(&self) -> MessageMap {
        let mut map = MessageMap::new();
        map.insert(COMMAND_KEY.to_string(), Value::Text(self.command().as_str().to_string()));
        map.insert(Self::IDENTIFIER_KEY.to_string(), Value::Text(self.identifier.clone()));
        map
    }
}
