//! Fuzz target for textual identity parsing.
//!
//! Tests that parsing arbitrary strings is handled safely.

#![no_main]

use libfuzzer_sys::fuzz_target;
use weft_identity::Identity;

fuzz_target!(|text: &str| {
    if let Ok(identity) = text.parse::<Identity>() {
        assert!(!identity.address().is_reserved());

        // A successful parse must round-trip through its canonical form.
        let canonical = identity.to_text(identity.has_private());
        let reparsed: Identity = canonical.parse().expect("canonical form must parse");
        assert_eq!(reparsed, identity);
    }
});
