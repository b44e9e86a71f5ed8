//! Error types for identity operations.

use thiserror::Error;

use crate::address::Address;

/// Errors that can occur while building or decoding identities.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// A textual or binary identity failed to decode.
    #[error("malformed identity: {0}")]
    Malformed(String),

    /// The type byte or type digit named an unknown identity type.
    #[error("unknown identity type {0}")]
    UnknownType(u8),

    /// A binary identity ended before all required fields were read.
    #[error("truncated identity")]
    Truncated,

    /// The decoded address is reserved for administrative use.
    #[error("reserved address {0}")]
    ReservedAddress(Address),

    /// The address does not match the public key's recomputed fingerprint.
    #[error("address does not match public key fingerprint")]
    FingerprintMismatch,

    /// An operation that needs the private key was called on a public-only
    /// identity.
    #[error("identity has no private key")]
    MissingPrivateKey,

    /// Generation was cancelled before a satisfying key pair was found.
    #[error("identity generation cancelled")]
    Cancelled,

    /// An underlying cryptographic primitive failed.
    #[error(transparent)]
    Crypto(#[from] weft_crypto::CryptoError),
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;
