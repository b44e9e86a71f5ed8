//! # weft-identity
//!
//! Peer identities for the weft overlay network.
//!
//! An [`Identity`] binds a short 40-bit [`Address`] to long-term public key
//! material through a memory-hard proof of work, making bulk address grinding
//! and address squatting computationally expensive. Identities sign control
//! messages and derive symmetric session keys by Diffie-Hellman agreement
//! with other peers.
//!
//! Two identity types exist:
//!
//! - [`IdentityType::C25519`] (type 0, legacy): a combined Curve25519/Ed25519
//!   key pair whose address falls out of a 2 MiB memory-hard digest of the
//!   public key.
//! - [`IdentityType::P384`] (type 1, current): a compound key adding a NIST
//!   P-384 key behind a 128 KiB proof of work, with the address taken from
//!   the SHA-384 fingerprint of the public blob.
//!
//! ## Security
//!
//! Private key material is zeroized on drop and never leaves through serde;
//! fingerprint hashes compare in constant time.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod base32;
mod codec;
pub mod error;
mod identity;
pub mod pow;

pub use address::Address;
pub use error::{IdentityError, Result};
pub use identity::{
    Fingerprint, Identity, IdentityType, SessionKey, FINGERPRINT_HASH_SIZE,
    P384_COMPOUND_PRIVATE_KEY_SIZE, P384_COMPOUND_PUBLIC_KEY_SIZE, SESSION_KEY_SIZE,
    SIGNATURE_BUFFER_SIZE,
};
