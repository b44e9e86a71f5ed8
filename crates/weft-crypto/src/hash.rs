//! SHA-512 and SHA-384 hashing adapters.
//!
//! The identity formats use SHA-512 for proof-of-work seeding and session-key
//! derivation and SHA-384 for fingerprints and P-384 prehashes. Two-input
//! variants hash the concatenation of both inputs without copying them into a
//! contiguous buffer first.

use sha2::{Digest, Sha384, Sha512};

/// SHA-512 digest size in bytes.
pub const SHA512_SIZE: usize = 64;

/// SHA-384 digest size in bytes.
pub const SHA384_SIZE: usize = 48;

/// Compute the SHA-512 digest of a single input.
pub fn sha512(data: &[u8]) -> [u8; SHA512_SIZE] {
    let mut out = [0u8; SHA512_SIZE];
    out.copy_from_slice(Sha512::digest(data).as_slice());
    out
}

/// Compute the SHA-512 digest of the concatenation of two inputs.
pub fn sha512_2(a: &[u8], b: &[u8]) -> [u8; SHA512_SIZE] {
    let mut hasher = Sha512::new();
    hasher.update(a);
    hasher.update(b);
    let mut out = [0u8; SHA512_SIZE];
    out.copy_from_slice(hasher.finalize().as_slice());
    out
}

/// Compute the SHA-384 digest of a single input.
pub fn sha384(data: &[u8]) -> [u8; SHA384_SIZE] {
    let mut out = [0u8; SHA384_SIZE];
    out.copy_from_slice(Sha384::digest(data).as_slice());
    out
}

/// Compute the SHA-384 digest of the concatenation of two inputs.
pub fn sha384_2(a: &[u8], b: &[u8]) -> [u8; SHA384_SIZE] {
    let mut hasher = Sha384::new();
    hasher.update(a);
    hasher.update(b);
    let mut out = [0u8; SHA384_SIZE];
    out.copy_from_slice(hasher.finalize().as_slice());
    out
}
