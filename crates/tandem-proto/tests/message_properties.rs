//! Property-based tests for the peer message codec.
//!
//! These verify that every concrete message survives the map representation
//! and the CBOR byte path, and pin the wire layout with inline snapshots.

use proptest::prelude::*;
use tandem_proto::{
    ClearNotificationCommand, CommandKey, CommandMessage, MessageMap, Messageable, Mode,
    PeerMessage, decode_map, encode_map,
};

fn arbitrary_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Undefined), Just(Mode::Primary), Just(Mode::Secondary)]
}

fn arbitrary_command() -> impl Strategy<Value = CommandKey> {
    prop_oneof![Just(CommandKey::RequestMode), Just(CommandKey::ClearNotification)]
}

fn arbitrary_message() -> impl Strategy<Value = PeerMessage> {
    prop_oneof![
        arbitrary_mode().prop_map(PeerMessage::Mode),
        arbitrary_command().prop_map(|c| PeerMessage::Command(CommandMessage::new(c))),
        ".{0,64}".prop_map(|id| PeerMessage::ClearNotification(ClearNotificationCommand::new(id))),
    ]
}

#[test]
fn prop_peer_message_roundtrip() {
    proptest!(|(message in arbitrary_message())| {
        let map = message.to_message();
        let decoded = PeerMessage::decode(&map).expect("decode should succeed");

        // PROPERTY: map round-trip must be identity
        prop_assert_eq!(decoded, message);
    });
}

#[test]
fn prop_peer_message_cbor_roundtrip() {
    proptest!(|(message in arbitrary_message())| {
        let bytes = encode_map(&message.to_message()).expect("encode should succeed");
        let map = decode_map(&bytes).expect("decode should succeed");

        prop_assert_eq!(PeerMessage::decode(&map).expect("decode should succeed"), message);
    });
}

#[test]
fn prop_concrete_types_roundtrip() {
    proptest!(|(mode in arbitrary_mode(), command in arbitrary_command(), id in ".{0,64}")| {
        prop_assert_eq!(Mode::from_message(&mode.to_message()), Ok(mode));

        let generic = CommandMessage::new(command);
        prop_assert_eq!(CommandMessage::from_message(&generic.to_message()), Ok(generic));

        let clear = ClearNotificationCommand::new(id);
        prop_assert_eq!(
            ClearNotificationCommand::from_message(&clear.to_message()),
            Ok(clear)
        );
    });
}

#[test]
fn prop_decode_never_panics_on_arbitrary_maps() {
    proptest!(|(entries in prop::collection::btree_map("[A-Za-z]{1,12}", ".{0,16}", 0..6))| {
        let map: MessageMap = entries
            .into_iter()
            .map(|(k, v)| (k, tandem_proto::Value::Text(v)))
            .collect();

        // Either a clean match or a clean failure
        let _ = PeerMessage::decode(&map);
    });
}

#[test]
fn prop_decode_map_never_panics_on_arbitrary_bytes() {
    proptest!(|(bytes in prop::collection::vec(any::<u8>(), 0..256))| {
        let _ = decode_map(&bytes);
    });
}

#[test]
fn mode_wire_layout() {
    let bytes = encode_map(&Mode::Primary.to_message()).unwrap();
    insta::assert_snapshot!(hex::encode(bytes), @"a1646d6f6465677072696d617279");
}

#[test]
fn request_mode_wire_layout() {
    let bytes = encode_map(&CommandMessage::new(CommandKey::RequestMode).to_message()).unwrap();
    insta::assert_snapshot!(hex::encode(bytes), @"a167436f6d6d616e646b726571756573744d6f6465");
}

#[test]
fn clear_notification_wire_layout() {
    let bytes = encode_map(&ClearNotificationCommand::new("n-1").to_message()).unwrap();
    insta::assert_snapshot!(
        hex::encode(bytes),
        @"a267436f6d6d616e6471636c6561724e6f74696669636174696f6e6d4964656e7469666965724b6579636e2d31"
    );
}
