//! Salsa20 stream-cipher adapters.
//!
//! The proof-of-work functions use Salsa20 as a keystream XOR: the 20-round
//! variant drives the legacy 2 MiB memory fill and the 12-round variant is
//! one of the branch lanes in the current 128 KiB fill. Both keep their
//! keystream position across calls, so repeated 64-byte applications are
//! equivalent to one long application.

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::{Salsa12, Salsa20};

/// Salsa20 key size in bytes.
pub const SALSA_KEY_SIZE: usize = 32;

/// Salsa20 IV size in bytes.
pub const SALSA_IV_SIZE: usize = 8;

/// A 20-round Salsa20 keystream XOR.
pub struct Salsa20Stream {
    inner: Salsa20,
}

impl Salsa20Stream {
    /// Create a new stream from a 32-byte key and an 8-byte IV.
    pub fn new(key: &[u8; SALSA_KEY_SIZE], iv: &[u8; SALSA_IV_SIZE]) -> Self {
        Self {
            inner: Salsa20::new(&(*key).into(), &(*iv).into()),
        }
    }

    /// XOR the next keystream bytes into `data` in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        self.inner.apply_keystream(data);
    }
}

/// A 12-round Salsa20 keystream XOR.
pub struct Salsa12Stream {
    inner: Salsa12,
}

impl Salsa12Stream {
    /// Create a new stream from a 32-byte key and an 8-byte IV.
    pub fn new(key: &[u8; SALSA_KEY_SIZE], iv: &[u8; SALSA_IV_SIZE]) -> Self {
        Self {
            inner: Salsa12::new(&(*key).into(), &(*iv).into()),
        }
    }

    /// XOR the next keystream bytes into `data` in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        self.inner.apply_keystream(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; SALSA_KEY_SIZE] = [7u8; SALSA_KEY_SIZE];
    const IV: [u8; SALSA_IV_SIZE] = [3u8; SALSA_IV_SIZE];

    #[test]
    fn test_keystream_position_persists_across_calls() {
        let mut split = [0u8; 128];
        let mut whole = [0u8; 128];

        let mut cipher = Salsa20Stream::new(&KEY, &IV);
        cipher.apply(&mut split[..64]);
        cipher.apply(&mut split[64..]);

        let mut cipher = Salsa20Stream::new(&KEY, &IV);
        cipher.apply(&mut whole);

        assert_eq!(split, whole);
    }

    #[test]
    fn test_apply_is_an_involution() {
        let mut data = *b"some plaintext covering multiple salsa blocks...................";
        let original = data;

        Salsa20Stream::new(&KEY, &IV).apply(&mut data);
        assert_ne!(data, original);
        Salsa20Stream::new(&KEY, &IV).apply(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_round_variants_differ() {
        let mut twenty = [0u8; 64];
        let mut twelve = [0u8; 64];
        Salsa20Stream::new(&KEY, &IV).apply(&mut twenty);
        Salsa12Stream::new(&KEY, &IV).apply(&mut twelve);
        assert_ne!(twenty, twelve);
    }

    #[test]
    fn test_different_ivs_differ() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        Salsa20Stream::new(&KEY, &[0u8; 8]).apply(&mut a);
        Salsa20Stream::new(&KEY, &[1u8; 8]).apply(&mut b);
        assert_ne!(a, b);
    }
}
