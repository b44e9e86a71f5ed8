//! Fuzz target for binary identity decoding.
//!
//! Tests that unmarshaling arbitrary bytes is handled safely.

#![no_main]

use libfuzzer_sys::fuzz_target;
use weft_identity::Identity;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either decode cleanly or error - never panic.
    if let Ok((identity, consumed)) = Identity::from_bytes(data) {
        assert!(consumed <= data.len());
        assert!(!identity.address().is_reserved());

        // A successful decode must re-encode to the bytes it consumed.
        let reencoded = identity.to_bytes(identity.has_private());
        assert_eq!(reencoded, &data[..consumed]);
    }
});
