//! Fuzz target: `codec::decode_response`
//!
//! The client-side mirror of the request fuzzer: arbitrary bytes must
//! never panic the response decoder.
//!
//! cargo fuzz run fuzz_decode_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use remoteio::protocol::codec::{decode_response, encode_response};

fuzz_target!(|data: &[u8]| {
    if let Ok(response) = decode_response(data) {
        let frame = encode_response(&response);
        assert!(frame.len() <= 4096, "encoded frame exceeds MAX_FRAME_SIZE");
        let _ = decode_response(&frame).expect("re-encoded response must decode");
    }
});
