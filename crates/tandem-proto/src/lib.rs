//! Peer Messages
//!
//! Typed messages exchanged between a host device and its paired companion,
//! and the string-keyed map representation they travel in.
//!
//! # Architecture
//!
//! Every message converts to and from a [`MessageMap`] through the
//! [`Messageable`] trait. Decoding never panics: a map that does not carry
//! the expected discriminator or fields yields a [`ProtocolError`], so inbound
//! traffic can be tried against several decoders in turn (see
//! [`PeerMessage::decode`]).
//!
//! Maps can additionally be serialized to CBOR for the raw-bytes send path
//! ([`encode_map`] / [`decode_map`]).
//!
//! # Components
//!
//! - [`Mode`]: the role a device is configured to play
//! - [`CommandMessage`]: payload-free command
//! - [`ClearNotificationCommand`]: command carrying a notification identifier
//! - [`PeerMessage`]: closed set of everything that crosses the link

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod command;
mod errors;
mod message;
mod mode;
mod peer;

pub use command::{COMMAND_KEY, ClearNotificationCommand, CommandKey, CommandMessage};
pub use errors::{ProtocolError, Result};
pub use message::{MAX_MESSAGE_SIZE, MessageMap, Messageable, Value, decode_map, encode_map};
pub use mode::Mode;
pub use peer::PeerMessage;
