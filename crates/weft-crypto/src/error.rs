//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A key blob had the wrong length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes.
        expected: usize,
        /// Actual key length in bytes.
        actual: usize,
    },

    /// A byte string was not a valid curve point or scalar.
    #[error("invalid key encoding")]
    InvalidKeyEncoding,

    /// A signature had the wrong length.
    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected signature length in bytes.
        expected: usize,
        /// Actual signature length in bytes.
        actual: usize,
    },

    /// Signing failed inside the underlying primitive.
    #[error("signing failed")]
    Signing,

    /// Signature verification failed.
    #[error("signature verification failed")]
    SignatureVerification,
}

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
