//! Fuzz target: `codec::decode_request`
//!
//! Drives arbitrary byte sequences into the request decoder and asserts
//! that it never panics and that every accepted request survives an
//! encode/decode round trip unchanged.
//!
//! cargo fuzz run fuzz_decode_request

#![no_main]

use libfuzzer_sys::fuzz_target;
use remoteio::protocol::codec::{decode_request, encode_request};

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = decode_request(data) {
        let frame = encode_request(&request);
        assert!(frame.len() <= 4096, "encoded frame exceeds MAX_FRAME_SIZE");
        assert_eq!(
            decode_request(&frame).expect("re-encoded request must decode"),
            request
        );
    }
});
