//! Message representation.
//!
//! The link carries string-keyed maps whose values are CBOR values. Typed
//! messages implement [`Messageable`] to move in and out of that shape.
//!
//! # Invariants
//!
//! - `T::from_message(&t.to_message()) == Ok(t)` for every messageable `T`.
//! - Decoders verify their discriminator before reading any other field.

use std::collections::BTreeMap;

pub use ciborium::Value;

use crate::errors::{ProtocolError, Result};

/// Largest encoded map accepted on the raw-bytes path (64 KiB).
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Generic message representation: string keys to CBOR values.
pub type MessageMap = BTreeMap<String, Value>;

/// Conversion between a typed value and its [`MessageMap`] representation.
pub trait Messageable: Sized {
    /// Decode from a map.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when the map does not describe `Self`. This
    /// is a normal "no match" outcome, not a fault.
    fn from_message(message: &MessageMap) -> Result<Self>;

    /// Encode into a map.
    fn to_message(&self) -> MessageMap;
}

/// Read a text value from `message`.
pub(crate) fn text<'a>(message: &'a MessageMap, key: &'static str) -> Result<&'a str> {
    match message.get(key) {
        Some(Value::Text(value)) => Ok(value.as_str()),
        Some(_) => Err(ProtocolError::UnexpectedType { key, expected: "text" }),
        None => Err(ProtocolError::MissingKey { key }),
    }
}

/// Serialize a map to CBOR bytes.
///
/// # Errors
///
/// - `ProtocolError::CborEncode` if serialization fails
/// - `ProtocolError::PayloadTooLarge` if the result exceeds
///   [`MAX_MESSAGE_SIZE`]
pub fn encode_map(message: &MessageMap) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(message, &mut buf)
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;

    if buf.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge { size: buf.len(), max: MAX_MESSAGE_SIZE });
    }

    Ok(buf)
}

/// Deserialize a map from CBOR bytes.
///
/// The size check runs before the CBOR parser sees the input.
///
/// # Errors
///
/// - `ProtocolError::PayloadTooLarge` if `bytes` exceeds [`MAX_MESSAGE_SIZE`]
/// - `ProtocolError::CborDecode` if the bytes are not a CBOR map with text
///   keys
pub fn decode_map(bytes: &[u8]) -> Result<MessageMap> {
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge { size: bytes.len(), max: MAX_MESSAGE_SIZE });
    }

    ciborium::de::from_reader(bytes).map_err(|e| ProtocolError::CborDecode(e.to_string()))
}
