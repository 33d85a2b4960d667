//! Closed set of peer messages.
//!
//! Inbound maps are tried against each concrete decoder, most specific
//! first, so a clear-notification command with its identifier is never
//! mistaken for the payload-free variant.

use crate::{
    command::{COMMAND_KEY, ClearNotificationCommand, CommandMessage},
    errors::{ProtocolError, Result},
    message::{MessageMap, Messageable},
    mode::Mode,
};

/// Every message that can cross the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerMessage {
    /// Mode broadcast or reply
    Mode(Mode),
    /// Payload-free command
    Command(CommandMessage),
    /// Clear a delivered notification
    ClearNotification(ClearNotificationCommand),
}

impl PeerMessage {
    /// Decode an inbound map into the first matching variant.
    ///
    /// # Errors
    ///
    /// - The command decoder's error if the map carries a command
    ///   discriminator that cannot be decoded
    /// - The mode decoder's error if the map carries a `mode` key that cannot
    ///   be decoded
    /// - `ProtocolError::Unrecognized` if the map has neither key
    pub fn decode(message: &MessageMap) -> Result<Self> {
        if message.contains_key(COMMAND_KEY) {
            return ClearNotificationCommand::from_message(message)
                .map(Self::ClearNotification)
                .or_else(|_| CommandMessage::from_message(message).map(Self::Command));
        }

        if message.contains_key(Mode::KEY) {
            return Mode::from_message(message).map(Self::Mode);
        }

        Err(ProtocolError::Unrecognized { keys: message.keys().cloned().collect() })
    }
}

impl Messageable for PeerMessage {
    fn from_message(message: &MessageMap) -> Result<Self> {
        Self::decode(message)
    }

    fn to_message(&self) -> MessageMap {
        match self {
            Self::Mode(mode) => mode.to_message(),
            Self::Command(command) => command.to_message(),
            Self::ClearNotification(command) => command.to_message(),
        }
    }
}

impl From<Mode> for PeerMessage {
    fn from(mode: Mode) -> Self {
        Self::Mode(mode)
    }
}

impl From<CommandMessage> for PeerMessage {
    fn from(command: CommandMessage) -> Self {
        Self::Command(command)
    }
}

impl From<ClearNotificationCommand> for PeerMessage {
    fn from(command: ClearNotificationCommand) -> Self {
        Self::ClearNotification(command)
    }
}
