//! One-shot Poly1305 MAC.
//!
//! The current proof-of-work function finishes by MACing its whole work
//! buffer with a key taken from the buffer's own first 32 bytes and writing
//! the tag back over the first 16, so the adapter returns the tag by value
//! and leaves any aliasing to the caller.

use poly1305::universal_hash::KeyInit;
use poly1305::{Key, Poly1305};

/// Poly1305 key size in bytes.
pub const POLY1305_KEY_SIZE: usize = 32;

/// Poly1305 tag size in bytes.
pub const POLY1305_TAG_SIZE: usize = 16;

/// Compute the Poly1305 tag of `data` under `key`.
pub fn poly1305_tag(key: &[u8; POLY1305_KEY_SIZE], data: &[u8]) -> [u8; POLY1305_TAG_SIZE] {
    let mac = Poly1305::new(Key::from_slice(key));
    mac.compute_unpadded(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc8439_vector() {
        // RFC 8439 section 2.5.2.
        let key: [u8; 32] = hex::decode(
            "85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b",
        )
        .unwrap()
        .try_into()
        .unwrap();
        let msg = b"Cryptographic Forum Research Group";
        let expected = hex::decode("a8061dc1305136c6c22b8baf0c0127a9").unwrap();
        assert_eq!(poly1305_tag(&key, msg), expected[..]);
    }

    #[test]
    fn test_tag_depends_on_key_and_data() {
        let k1 = [1u8; POLY1305_KEY_SIZE];
        let k2 = [2u8; POLY1305_KEY_SIZE];
        assert_ne!(poly1305_tag(&k1, b"data"), poly1305_tag(&k2, b"data"));
        assert_ne!(poly1305_tag(&k1, b"data"), poly1305_tag(&k1, b"datb"));
    }
}
