//! Peer identities: proof-of-work-bound key material and its operations.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use subtle::ConstantTimeEq;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use weft_crypto::hash::{sha384, sha384_2, sha512};
use weft_crypto::{c25519, ecc384};

use crate::address::Address;
use crate::base32;
use crate::error::{IdentityError, Result};
use crate::pow;

/// Fingerprint hash size in bytes (SHA-384 of the public key blob).
pub const FINGERPRINT_HASH_SIZE: usize = 48;

/// Symmetric session key size in bytes.
pub const SESSION_KEY_SIZE: usize = 48;

/// Signature buffer size in bytes; both identity types sign into 96 bytes.
pub const SIGNATURE_BUFFER_SIZE: usize = 96;

/// Type 1 compound public key blob size: a 1-byte work nonce, the combined
/// C25519 keys, and a compressed P-384 point.
pub const P384_COMPOUND_PUBLIC_KEY_SIZE: usize =
    1 + c25519::COMBINED_PUBLIC_KEY_SIZE + ecc384::P384_PUBLIC_KEY_SIZE;

/// Type 1 compound private key blob size.
pub const P384_COMPOUND_PRIVATE_KEY_SIZE: usize =
    1 + c25519::COMBINED_PRIVATE_KEY_SIZE + ecc384::P384_PRIVATE_KEY_SIZE;

// Offsets of the sub-keys inside a compound blob. The layouts of the public
// and private blobs line up because the combined C25519 sizes are equal.
const NONCE_INDEX: usize = 0;
const C25519_OFFSET: usize = 1;
const ECC384_OFFSET: usize = 1 + c25519::COMBINED_PUBLIC_KEY_SIZE;

/// The two identity types, in wire-byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentityType {
    /// Type 0: combined Curve25519/Ed25519 keys behind the 2 MiB work
    /// function.
    C25519,
    /// Type 1: compound C25519 + NIST P-384 keys behind the 128 KiB work
    /// function.
    P384,
}

impl IdentityType {
    /// Decode a wire type byte.
    pub fn from_wire(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Self::C25519),
            1 => Ok(Self::P384),
            other => Err(IdentityError::UnknownType(other)),
        }
    }

    /// The wire type byte.
    pub fn to_wire(self) -> u8 {
        match self {
            Self::C25519 => 0,
            Self::P384 => 1,
        }
    }

    /// Public key blob size for this type.
    pub fn public_key_size(self) -> usize {
        match self {
            Self::C25519 => c25519::COMBINED_PUBLIC_KEY_SIZE,
            Self::P384 => P384_COMPOUND_PUBLIC_KEY_SIZE,
        }
    }

    /// Private key blob size for this type.
    pub fn private_key_size(self) -> usize {
        match self {
            Self::C25519 => c25519::COMBINED_PRIVATE_KEY_SIZE,
            Self::P384 => P384_COMPOUND_PRIVATE_KEY_SIZE,
        }
    }
}

/// An identity's short name: its address plus the SHA-384 of its public key.
#[derive(Clone, Copy)]
pub struct Fingerprint {
    /// The 40-bit address.
    pub address: Address,
    /// SHA-384 of the full public key blob.
    pub hash: [u8; FINGERPRINT_HASH_SIZE],
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && bool::from(self.hash.ct_eq(&other.hash))
    }
}

impl Eq for Fingerprint {}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.address, base32::encode(&self.hash))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// A 48-byte symmetric session key from Diffie-Hellman agreement.
///
/// Scrubbed on drop; feed it to a KDF rather than using it directly.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl SessionKey {
    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.0
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey([REDACTED])")
    }
}

/// Key material for the two identity types.
#[derive(Clone)]
pub(crate) enum KeyMaterial {
    C25519 {
        public: [u8; c25519::COMBINED_PUBLIC_KEY_SIZE],
        private: Option<Zeroizing<[u8; c25519::COMBINED_PRIVATE_KEY_SIZE]>>,
    },
    P384 {
        public: [u8; P384_COMPOUND_PUBLIC_KEY_SIZE],
        private: Option<Zeroizing<[u8; P384_COMPOUND_PRIVATE_KEY_SIZE]>>,
    },
}

impl KeyMaterial {
    pub(crate) fn public_bytes(&self) -> &[u8] {
        match self {
            Self::C25519 { public, .. } => public,
            Self::P384 { public, .. } => public,
        }
    }

    pub(crate) fn private_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::C25519 { private, .. } => private.as_ref().map(|p| &p[..]),
            Self::P384 { private, .. } => private.as_ref().map(|p| &p[..]),
        }
    }
}

fn secret_eq<const N: usize>(
    a: &Option<Zeroizing<[u8; N]>>,
    b: &Option<Zeroizing<[u8; N]>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.ct_eq(&b[..]).into(),
        _ => false,
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::C25519 { public: a, private: pa },
                Self::C25519 { public: b, private: pb },
            ) => a == b && secret_eq(pa, pb),
            (
                Self::P384 { public: a, private: pa },
                Self::P384 { public: b, private: pb },
            ) => a == b && secret_eq(pa, pb),
            _ => false,
        }
    }
}

impl Eq for KeyMaterial {}

/// A peer identity: a 40-bit address bound to public key material by proof
/// of work, optionally carrying the matching private keys.
///
/// Identities are immutable. They come into existence in exactly three ways:
/// [`Identity::generate`], parsing the textual form ([`str::parse`]), or
/// [`Identity::from_bytes`]. Private key material is zeroized on drop.
#[derive(Clone)]
pub struct Identity {
    pub(crate) fingerprint: Fingerprint,
    pub(crate) keys: KeyMaterial,
}

impl Identity {
    /// Generate a new identity of the given type using the OS random source.
    ///
    /// This runs the proof of work and can take from tens of milliseconds to
    /// several seconds depending on type and hardware.
    pub fn generate(kind: IdentityType) -> Self {
        Self::generate_with_rng(kind, &mut OsRng)
    }

    /// Generate a new identity from a caller-supplied random source.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(kind: IdentityType, rng: &mut R) -> Self {
        let never = AtomicBool::new(false);
        match Self::try_generate(kind, rng, &never) {
            Ok(identity) => identity,
            // Unreachable: the only error path is the cancel flag.
            Err(_) => unreachable_cancel(),
        }
    }

    /// Generate with cooperative cancellation.
    ///
    /// The flag is checked at least once per proof-of-work attempt; setting
    /// it makes generation return [`IdentityError::Cancelled`] promptly.
    /// A cancelled generation leaves nothing behind and is not resumable.
    pub fn try_generate<R: RngCore + CryptoRng>(
        kind: IdentityType,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<Self> {
        match kind {
            IdentityType::C25519 => Self::generate_c25519(rng, cancel),
            IdentityType::P384 => Self::generate_p384(rng, cancel),
        }
    }

    fn generate_c25519<R: RngCore + CryptoRng>(rng: &mut R, cancel: &AtomicBool) -> Result<Self> {
        let mut scratch = pow::V0Scratch::new();
        let mut digest = [0u8; pow::V0_DIGEST_SIZE];
        let mut attempts = 0u64;
        loop {
            let (public, private) = c25519::generate_satisfying(
                rng,
                |candidate| {
                    attempts += 1;
                    digest = scratch.digest(candidate);
                    pow::v0_accepts(&digest)
                },
                cancel,
            )
            .ok_or(IdentityError::Cancelled)?;

            // The address comes from the work digest, not the fingerprint.
            let address = Address::from_digest_tail(&digest);
            if address.is_reserved() {
                trace!(attempts, "candidate address reserved, restarting search");
                continue;
            }

            debug!(%address, attempts, "generated type 0 identity");
            return Ok(Self {
                fingerprint: Fingerprint {
                    address,
                    hash: sha384(&public),
                },
                keys: KeyMaterial::C25519 {
                    public,
                    private: Some(private),
                },
            });
        }
    }

    fn generate_p384<R: RngCore + CryptoRng>(rng: &mut R, cancel: &AtomicBool) -> Result<Self> {
        let mut attempts = 0u64;
        loop {
            let mut public = [0u8; P384_COMPOUND_PUBLIC_KEY_SIZE];
            let mut private = Zeroizing::new([0u8; P384_COMPOUND_PRIVATE_KEY_SIZE]);

            public[NONCE_INDEX] = 0;
            let (c_public, c_private) = c25519::generate(rng);
            public[C25519_OFFSET..ECC384_OFFSET].copy_from_slice(&c_public);
            private[C25519_OFFSET..ECC384_OFFSET].copy_from_slice(c_private.as_ref());
            let (e_public, e_private) = ecc384::generate(rng);
            public[ECC384_OFFSET..].copy_from_slice(&e_public);
            private[ECC384_OFFSET..].copy_from_slice(e_private.as_ref());

            loop {
                if cancel.load(Ordering::Relaxed) {
                    return Err(IdentityError::Cancelled);
                }
                attempts += 1;
                if pow::v1_accepts(&public) {
                    break;
                }
                // The nonce is only 8 bits; when it wraps, refresh the P-384
                // sub-key (the cheaper generator) and keep the C25519 keys.
                public[NONCE_INDEX] = public[NONCE_INDEX].wrapping_add(1);
                if public[NONCE_INDEX] == 0 {
                    let (e_public, e_private) = ecc384::generate(rng);
                    public[ECC384_OFFSET..].copy_from_slice(&e_public);
                    private[ECC384_OFFSET..].copy_from_slice(e_private.as_ref());
                }
            }

            let hash = sha384(&public);
            let address = Address::from_digest_tail(&hash);
            if address.is_reserved() {
                trace!(attempts, "candidate address reserved, restarting search");
                continue;
            }

            debug!(%address, attempts, "generated type 1 identity");
            return Ok(Self {
                fingerprint: Fingerprint { address, hash },
                keys: KeyMaterial::P384 {
                    public,
                    private: Some(private),
                },
            });
        }
    }

    /// Build an identity from decoded parts, enforcing the invariants every
    /// deserialization path shares.
    pub(crate) fn assemble(address: Address, keys: KeyMaterial) -> Result<Self> {
        if address.is_reserved() {
            return Err(IdentityError::ReservedAddress(address));
        }
        let hash = sha384(keys.public_bytes());
        if matches!(keys, KeyMaterial::P384 { .. }) && Address::from_digest_tail(&hash) != address {
            return Err(IdentityError::FingerprintMismatch);
        }
        Ok(Self {
            fingerprint: Fingerprint { address, hash },
            keys,
        })
    }

    /// Re-run the proof of work and address binding over the public key.
    ///
    /// This is expensive for type 0 (a full 2 MiB digest) and is intended for
    /// identities that arrived from untrusted sources.
    pub fn validate(&self) -> bool {
        if self.fingerprint.address.is_reserved() {
            return false;
        }
        match &self.keys {
            KeyMaterial::C25519 { public, .. } => {
                let digest = pow::V0Scratch::new().digest(public);
                pow::v0_accepts(&digest)
                    && Address::from_digest_tail(&digest) == self.fingerprint.address
            }
            KeyMaterial::P384 { public, .. } => {
                Address::from_digest_tail(&self.fingerprint.hash) == self.fingerprint.address
                    && pow::v1_accepts(public)
            }
        }
    }

    /// Sign `data` with this identity's private key.
    ///
    /// Type 0 produces the legacy 96-byte Ed25519 form; type 1 produces a
    /// 96-byte P-384 ECDSA signature over `SHA-384(data ‖ public)`, binding
    /// the signature to the signer's full public key so it cannot be replayed
    /// under a different identity.
    pub fn sign(&self, data: &[u8]) -> Result<[u8; SIGNATURE_BUFFER_SIZE]> {
        match &self.keys {
            KeyMaterial::C25519 {
                private: Some(private),
                ..
            } => Ok(c25519::sign(private, data)),
            KeyMaterial::P384 {
                public,
                private: Some(private),
            } => {
                let prehash = sha384_2(data, public);
                let mut scalar = Zeroizing::new([0u8; ecc384::P384_PRIVATE_KEY_SIZE]);
                scalar.copy_from_slice(&private[ECC384_OFFSET..]);
                Ok(ecc384::ecdsa_sign(&scalar, &prehash)?)
            }
            _ => Err(IdentityError::MissingPrivateKey),
        }
    }

    /// Sign into a caller-provided buffer.
    ///
    /// Returns the number of bytes written, or 0 if the buffer is smaller
    /// than [`SIGNATURE_BUFFER_SIZE`] or this identity has no private key.
    pub fn sign_into(&self, data: &[u8], out: &mut [u8]) -> usize {
        if out.len() < SIGNATURE_BUFFER_SIZE {
            return 0;
        }
        match self.sign(data) {
            Ok(sig) => {
                out[..SIGNATURE_BUFFER_SIZE].copy_from_slice(&sig);
                SIGNATURE_BUFFER_SIZE
            }
            Err(_) => 0,
        }
    }

    /// Verify a signature over `data` against this identity's public key.
    pub fn verify(&self, data: &[u8], sig: &[u8]) -> bool {
        match &self.keys {
            KeyMaterial::C25519 { public, .. } => c25519::verify(public, data, sig),
            KeyMaterial::P384 { public, .. } => {
                if sig.len() != SIGNATURE_BUFFER_SIZE {
                    return false;
                }
                let prehash = sha384_2(data, public);
                let mut point = [0u8; ecc384::P384_PUBLIC_KEY_SIZE];
                point.copy_from_slice(&public[ECC384_OFFSET..]);
                ecc384::ecdsa_verify(&point, &prehash, sig)
            }
        }
    }

    /// Derive a symmetric session key by Diffie-Hellman agreement.
    ///
    /// Requires this identity's private key. Two type 1 identities agree over
    /// both curves and hash the shared secrets together, so the session key
    /// is as strong as the stronger curve; every other compatible pairing
    /// agrees over the C25519 halves alone.
    ///
    /// Returns `None` without private key material (and in the degenerate
    /// case of a peer whose P-384 point fails to decode).
    pub fn agree(&self, other: &Identity) -> Option<SessionKey> {
        match (&self.keys, &other.keys) {
            (
                KeyMaterial::C25519 {
                    private: Some(private),
                    ..
                },
                _,
            ) => Some(c25519_session(private, &other.c25519_public())),
            (
                KeyMaterial::P384 {
                    private: Some(private),
                    ..
                },
                KeyMaterial::C25519 { public, .. },
            ) => {
                let mut sub = Zeroizing::new([0u8; c25519::COMBINED_PRIVATE_KEY_SIZE]);
                sub.copy_from_slice(&private[C25519_OFFSET..ECC384_OFFSET]);
                Some(c25519_session(&sub, public))
            }
            (
                KeyMaterial::P384 {
                    private: Some(private),
                    ..
                },
                KeyMaterial::P384 {
                    public: other_public,
                    ..
                },
            ) => {
                let mut c_private = Zeroizing::new([0u8; c25519::COMBINED_PRIVATE_KEY_SIZE]);
                c_private.copy_from_slice(&private[C25519_OFFSET..ECC384_OFFSET]);
                let mut e_private = Zeroizing::new([0u8; ecc384::P384_PRIVATE_KEY_SIZE]);
                e_private.copy_from_slice(&private[ECC384_OFFSET..]);

                let mut other_c = [0u8; c25519::COMBINED_PUBLIC_KEY_SIZE];
                other_c.copy_from_slice(&other_public[C25519_OFFSET..ECC384_OFFSET]);
                let mut other_e = [0u8; ecc384::P384_PUBLIC_KEY_SIZE];
                other_e.copy_from_slice(&other_public[ECC384_OFFSET..]);

                let c_shared = c25519::dh_agree(&c_private, &other_c);
                let e_shared = ecc384::ecdh_agree(&e_private, &other_e).ok()?;

                let mut raw = Zeroizing::new(
                    [0u8; c25519::DH_SHARED_SECRET_SIZE + ecc384::P384_SHARED_SECRET_SIZE],
                );
                raw[..c25519::DH_SHARED_SECRET_SIZE].copy_from_slice(c_shared.as_ref());
                raw[c25519::DH_SHARED_SECRET_SIZE..].copy_from_slice(e_shared.as_ref());
                Some(SessionKey(sha384(raw.as_ref())))
            }
            _ => None,
        }
    }

    /// SHA-384 over the public and private blobs together, or all zeros if
    /// this identity has no private key.
    ///
    /// This is a local secret derived from the whole identity, usable as
    /// proof-of-possession input; it is never a session key.
    pub fn hash_with_private(&self) -> [u8; FINGERPRINT_HASH_SIZE] {
        match self.keys.private_bytes() {
            Some(private) => sha384_2(self.keys.public_bytes(), private),
            None => [0u8; FINGERPRINT_HASH_SIZE],
        }
    }

    /// The identity's 40-bit address.
    pub fn address(&self) -> Address {
        self.fingerprint.address
    }

    /// The identity's fingerprint (address plus public key hash).
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// The identity type.
    pub fn kind(&self) -> IdentityType {
        match &self.keys {
            KeyMaterial::C25519 { .. } => IdentityType::C25519,
            KeyMaterial::P384 { .. } => IdentityType::P384,
        }
    }

    /// Whether this identity carries its private key.
    pub fn has_private(&self) -> bool {
        self.keys.private_bytes().is_some()
    }

    /// The raw public key blob.
    pub fn public_key_bytes(&self) -> &[u8] {
        self.keys.public_bytes()
    }

    fn c25519_public(&self) -> [u8; c25519::COMBINED_PUBLIC_KEY_SIZE] {
        let mut out = [0u8; c25519::COMBINED_PUBLIC_KEY_SIZE];
        match &self.keys {
            KeyMaterial::C25519 { public, .. } => out.copy_from_slice(public),
            KeyMaterial::P384 { public, .. } => {
                out.copy_from_slice(&public[C25519_OFFSET..ECC384_OFFSET])
            }
        }
        out
    }
}

fn c25519_session(
    private: &[u8; c25519::COMBINED_PRIVATE_KEY_SIZE],
    public: &[u8; c25519::COMBINED_PUBLIC_KEY_SIZE],
) -> SessionKey {
    let raw = c25519::dh_agree(private, public);
    let digest = sha512(raw.as_ref());
    let mut key = [0u8; SESSION_KEY_SIZE];
    key.copy_from_slice(&digest[..SESSION_KEY_SIZE]);
    SessionKey(key)
}

#[cold]
fn unreachable_cancel() -> ! {
    panic!("identity generation reported cancellation without a cancel signal")
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.keys == other.keys
    }
}

impl Eq for Identity {}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.fingerprint.address)
            .field("kind", &self.kind())
            .field("has_private", &self.has_private())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    // Operation tests run on identities assembled from fresh key pairs
    // without the proof-of-work search; signing, verification, and agreement
    // do not depend on the work criterion.
    fn unworked_c25519(with_private: bool) -> Identity {
        let (public, private) = c25519::generate(&mut OsRng);
        Identity {
            fingerprint: Fingerprint {
                address: Address::new(0x0102030405),
                hash: sha384(&public),
            },
            keys: KeyMaterial::C25519 {
                public,
                private: with_private.then_some(private),
            },
        }
    }

    fn unworked_p384(with_private: bool) -> Identity {
        let mut public = [0u8; P384_COMPOUND_PUBLIC_KEY_SIZE];
        let mut private = Zeroizing::new([0u8; P384_COMPOUND_PRIVATE_KEY_SIZE]);
        let (c_public, c_private) = c25519::generate(&mut OsRng);
        public[C25519_OFFSET..ECC384_OFFSET].copy_from_slice(&c_public);
        private[C25519_OFFSET..ECC384_OFFSET].copy_from_slice(c_private.as_ref());
        let (e_public, e_private) = ecc384::generate(&mut OsRng);
        public[ECC384_OFFSET..].copy_from_slice(&e_public);
        private[ECC384_OFFSET..].copy_from_slice(e_private.as_ref());
        let hash = sha384(&public);
        Identity {
            fingerprint: Fingerprint {
                address: Address::from_digest_tail(&hash),
                hash,
            },
            keys: KeyMaterial::P384 {
                public,
                private: with_private.then_some(private),
            },
        }
    }

    #[test]
    fn test_sign_verify_c25519() {
        let id = unworked_c25519(true);
        let sig = id.sign(b"hello").unwrap();
        assert!(id.verify(b"hello", &sig));
        assert!(!id.verify(b"hellp", &sig));
    }

    #[test]
    fn test_sign_verify_p384() {
        let id = unworked_p384(true);
        let sig = id.sign(b"hello").unwrap();
        assert_eq!(sig.len(), SIGNATURE_BUFFER_SIZE);
        assert!(id.verify(b"hello", &sig));
        assert!(!id.verify(b"hellp", &sig));
    }

    #[test]
    fn test_p384_verify_rejects_wrong_length() {
        let id = unworked_p384(true);
        let sig = id.sign(b"hello").unwrap();
        assert!(!id.verify(b"hello", &sig[..95]));
    }

    #[test]
    fn test_p384_signature_bound_to_public_key() {
        // The prehash covers the signer's public blob, so another identity's
        // verify must fail even over identical data.
        let a = unworked_p384(true);
        let b = unworked_p384(true);
        let sig = a.sign(b"hello").unwrap();
        assert!(!b.verify(b"hello", &sig));
    }

    #[test]
    fn test_sign_without_private_fails() {
        let id = unworked_c25519(false);
        assert!(matches!(
            id.sign(b"hello"),
            Err(IdentityError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_sign_into_small_buffer_returns_zero() {
        let id = unworked_c25519(true);
        let mut buf = [0u8; SIGNATURE_BUFFER_SIZE - 1];
        assert_eq!(id.sign_into(b"hello", &mut buf), 0);
        let mut buf = [0u8; SIGNATURE_BUFFER_SIZE + 7];
        assert_eq!(id.sign_into(b"hello", &mut buf), SIGNATURE_BUFFER_SIZE);
    }

    #[test]
    fn test_sign_into_without_private_returns_zero() {
        let id = unworked_p384(false);
        let mut buf = [0u8; SIGNATURE_BUFFER_SIZE];
        assert_eq!(id.sign_into(b"hello", &mut buf), 0);
    }

    #[test]
    fn test_agree_c25519_c25519_symmetric() {
        let a = unworked_c25519(true);
        let b = unworked_c25519(true);
        assert_eq!(a.agree(&b).unwrap(), b.agree(&a).unwrap());
    }

    #[test]
    fn test_agree_p384_p384_symmetric() {
        let a = unworked_p384(true);
        let b = unworked_p384(true);
        assert_eq!(a.agree(&b).unwrap(), b.agree(&a).unwrap());
    }

    #[test]
    fn test_agree_cross_type_uses_c25519_halves() {
        let a = unworked_c25519(true);
        let b = unworked_p384(true);
        let ab = a.agree(&b).unwrap();
        let ba = b.agree(&a).unwrap();
        assert_eq!(ab, ba);

        // The shared secret must equal a C25519-only agreement between the
        // C25519 halves of the two identities.
        let (priv_a, pub_b) = match (&a.keys, &b.keys) {
            (KeyMaterial::C25519 { private, .. }, KeyMaterial::P384 { public, .. }) => {
                let mut pub_b = [0u8; c25519::COMBINED_PUBLIC_KEY_SIZE];
                pub_b.copy_from_slice(&public[C25519_OFFSET..ECC384_OFFSET]);
                (private.as_ref().unwrap().clone(), pub_b)
            }
            _ => unreachable!(),
        };
        assert_eq!(ab, c25519_session(&priv_a, &pub_b));
    }

    #[test]
    fn test_agree_without_private_fails() {
        let a = unworked_c25519(false);
        let b = unworked_c25519(true);
        assert!(a.agree(&b).is_none());
        assert!(b.agree(&a).is_some());
    }

    #[test]
    fn test_agree_differs_per_peer() {
        let a = unworked_c25519(true);
        let b = unworked_c25519(true);
        let c = unworked_c25519(true);
        assert_ne!(a.agree(&b).unwrap(), a.agree(&c).unwrap());
    }

    #[test]
    fn test_hash_with_private() {
        let id = unworked_c25519(true);
        let h = id.hash_with_private();
        assert_ne!(h, [0u8; FINGERPRINT_HASH_SIZE]);

        let public_only = unworked_c25519(false);
        assert_eq!(
            public_only.hash_with_private(),
            [0u8; FINGERPRINT_HASH_SIZE]
        );
    }

    #[test]
    fn test_fingerprint_display_shape() {
        let id = unworked_p384(true);
        let text = id.fingerprint().to_string();
        let (addr, hash) = text.split_once('-').unwrap();
        assert_eq!(addr.len(), 10);
        assert_eq!(hash.len(), 77);
    }

    #[test]
    fn test_try_generate_cancelled_immediately() {
        let cancel = AtomicBool::new(true);
        for kind in [IdentityType::C25519, IdentityType::P384] {
            let result = Identity::try_generate(kind, &mut OsRng, &cancel);
            assert!(matches!(result, Err(IdentityError::Cancelled)));
        }
    }

    #[test]
    fn test_type_wire_bytes() {
        assert_eq!(IdentityType::from_wire(0).unwrap(), IdentityType::C25519);
        assert_eq!(IdentityType::from_wire(1).unwrap(), IdentityType::P384);
        assert!(matches!(
            IdentityType::from_wire(2),
            Err(IdentityError::UnknownType(2))
        ));
    }

    #[test]
    fn test_debug_redacts_private_material() {
        let id = unworked_c25519(true);
        let debug = format!("{id:?}");
        assert!(debug.contains("has_private: true"));
        let private_hex = hex::encode(id.keys.private_bytes().unwrap());
        assert!(!debug.contains(&private_hex));
    }
}
