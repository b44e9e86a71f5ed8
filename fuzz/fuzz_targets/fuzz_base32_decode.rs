//! Fuzz target for the base32 codec.

#![no_main]

use libfuzzer_sys::fuzz_target;
use weft_identity::base32;

fuzz_target!(|text: &str| {
    if let Ok(bytes) = base32::decode(text) {
        // Decoded data re-encodes to a string that decodes identically.
        let reencoded = base32::encode(&bytes);
        assert_eq!(base32::decode(&reencoded).unwrap(), bytes);
    }
});
