//! Combined Curve25519/Ed25519 key material.
//!
//! A combined key blob carries a Curve25519 Diffie-Hellman key and an Ed25519
//! signing key side by side: bytes 0..32 are the DH half and bytes 32..64 the
//! signing half, in both the public and the private blob. The private signing
//! half is stored as the 32-byte Ed25519 seed.
//!
//! ## Legacy signature format
//!
//! Signatures are 96 bytes: the Ed25519 signature over the first 32 bytes of
//! SHA-512(message), followed by those same 32 digest bytes. The appended
//! digest is a historical artefact of the wire format; verifiers that receive
//! the full 96 bytes check it, and the Ed25519 signature itself is always
//! checked against a freshly derived digest.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{CryptoRng, RngCore};
use std::sync::atomic::{AtomicBool, Ordering};
use x25519_dalek::{PublicKey as DhPublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::hash::sha512;

/// Combined public key blob size in bytes (DH key plus signing key).
pub const COMBINED_PUBLIC_KEY_SIZE: usize = 64;

/// Combined private key blob size in bytes.
pub const COMBINED_PRIVATE_KEY_SIZE: usize = 64;

/// Legacy signature size in bytes.
pub const SIGNATURE_SIZE: usize = 96;

/// Curve25519 ECDH shared secret size in bytes.
pub const DH_SHARED_SECRET_SIZE: usize = 32;

/// Generate a fresh combined key pair.
pub fn generate<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> (
    [u8; COMBINED_PUBLIC_KEY_SIZE],
    Zeroizing<[u8; COMBINED_PRIVATE_KEY_SIZE]>,
) {
    let mut dh_secret = Zeroizing::new([0u8; 32]);
    let mut seed = Zeroizing::new([0u8; 32]);
    rng.fill_bytes(dh_secret.as_mut());
    rng.fill_bytes(seed.as_mut());

    let dh_public = DhPublicKey::from(&StaticSecret::from(*dh_secret));
    let signing_public = SigningKey::from_bytes(&seed).verifying_key();

    let mut public = [0u8; COMBINED_PUBLIC_KEY_SIZE];
    public[..32].copy_from_slice(dh_public.as_bytes());
    public[32..].copy_from_slice(&signing_public.to_bytes());

    let mut private = Zeroizing::new([0u8; COMBINED_PRIVATE_KEY_SIZE]);
    private[..32].copy_from_slice(dh_secret.as_ref());
    private[32..].copy_from_slice(seed.as_ref());

    (public, private)
}

/// Generate combined key pairs until `criterion` accepts the public blob.
///
/// The cancel flag is checked before every draw; a cancelled search returns
/// `None`. Each draw is independent, so the expected number of iterations is
/// the reciprocal of the criterion's accept rate.
pub fn generate_satisfying<R, F>(
    rng: &mut R,
    mut criterion: F,
    cancel: &AtomicBool,
) -> Option<(
    [u8; COMBINED_PUBLIC_KEY_SIZE],
    Zeroizing<[u8; COMBINED_PRIVATE_KEY_SIZE]>,
)>
where
    R: RngCore + CryptoRng,
    F: FnMut(&[u8; COMBINED_PUBLIC_KEY_SIZE]) -> bool,
{
    loop {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let (public, private) = generate(rng);
        if criterion(&public) {
            return Some((public, private));
        }
    }
}

/// Sign `data`, producing the legacy 96-byte signature.
pub fn sign(
    private: &[u8; COMBINED_PRIVATE_KEY_SIZE],
    data: &[u8],
) -> [u8; SIGNATURE_SIZE] {
    let digest = sha512(data);
    let mut seed = Zeroizing::new([0u8; 32]);
    seed.copy_from_slice(&private[32..]);
    let signing_key = SigningKey::from_bytes(&seed);

    let mut out = [0u8; SIGNATURE_SIZE];
    out[..64].copy_from_slice(&signing_key.sign(&digest[..32]).to_bytes());
    out[64..].copy_from_slice(&digest[..32]);
    out
}

/// Verify a legacy signature over `data`.
///
/// Accepts the bare 64-byte Ed25519 form and the full 96-byte form; when the
/// appended digest bytes are present they must match the message digest.
pub fn verify(public: &[u8; COMBINED_PUBLIC_KEY_SIZE], data: &[u8], sig: &[u8]) -> bool {
    if sig.len() < 64 {
        return false;
    }
    let digest = sha512(data);
    if sig.len() >= SIGNATURE_SIZE && sig[64..SIGNATURE_SIZE] != digest[..32] {
        return false;
    }

    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&public[32..]);
    let verifying_key = match VerifyingKey::from_bytes(&key_bytes) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(&sig[..64]);
    verifying_key
        .verify(&digest[..32], &Signature::from_bytes(&sig_bytes))
        .is_ok()
}

/// Curve25519 Diffie-Hellman over the DH halves of two combined blobs.
pub fn dh_agree(
    private: &[u8; COMBINED_PRIVATE_KEY_SIZE],
    public: &[u8; COMBINED_PUBLIC_KEY_SIZE],
) -> Zeroizing<[u8; DH_SHARED_SECRET_SIZE]> {
    let mut secret_bytes = Zeroizing::new([0u8; 32]);
    secret_bytes.copy_from_slice(&private[..32]);
    let mut peer_bytes = [0u8; 32];
    peer_bytes.copy_from_slice(&public[..32]);

    let shared = StaticSecret::from(*secret_bytes).diffie_hellman(&DhPublicKey::from(peer_bytes));
    Zeroizing::new(shared.to_bytes())
}
