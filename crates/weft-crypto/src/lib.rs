//! # weft-crypto
//!
//! Cryptographic primitive adapters for the weft overlay network.
//!
//! This crate narrows a handful of general-purpose crypto crates down to the
//! fixed shapes the weft identity formats require:
//!
//! - **Hashing**: SHA-512 and SHA-384, one- and two-input variants
//! - **Stream cipher**: Salsa20 in 20- and 12-round variants
//! - **MAC**: one-shot Poly1305
//! - **Key exchange + signing**: combined Curve25519/Ed25519 key blobs
//! - **ECDSA/ECDH**: NIST P-384 with SHA-384 prehashes
//!
//! All output lengths are fixed and normative for the wire formats built on
//! top of them; changing any constant here breaks interoperability.
//!
//! ## Security
//!
//! Private key material returned by this crate is wrapped in
//! [`zeroize::Zeroizing`] so it is scrubbed when dropped. Constant-time
//! behavior inside the primitives is delegated to the underlying crates.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod c25519;
pub mod ecc384;
pub mod error;
pub mod hash;
pub mod mac;
pub mod salsa;

pub use error::{CryptoError, Result};
