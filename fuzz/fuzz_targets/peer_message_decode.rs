//! Fuzz target for PeerMessage::decode
//!
//! Any map that decodes into a peer message must survive a second trip
//! through its map form unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tandem_proto::{Messageable, PeerMessage, decode_map};

fuzz_target!(|data: &[u8]| {
    let Ok(map) = decode_map(data) else {
        return;
    };

    if let Ok(message) = PeerMessage::decode(&map) {
        let again = PeerMessage::decode(&message.to_message());
        assert_eq!(again, Ok(message));
    }
});
