//! Fuzz target for decode_map
//!
//! Arbitrary bytes on the raw-data path must decode to a map or fail with an
//! error. Anything that decodes must encode again without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tandem_proto::{decode_map, encode_map};

fuzz_target!(|data: &[u8]| {
    if let Ok(map) = decode_map(data) {
        let _ = encode_map(&map);
    }
});
