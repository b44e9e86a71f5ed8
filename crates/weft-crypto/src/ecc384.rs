//! NIST P-384 ECDSA and ECDH adapters.
//!
//! Public keys travel as 49-byte compressed SEC1 points and private keys as
//! raw 48-byte scalars. Signatures are the fixed 96-byte `r ‖ s` form over a
//! caller-supplied 48-byte prehash (the identity layer hashes with SHA-384
//! before calling in), produced deterministically per RFC 6979. ECDH yields
//! the 48-byte x-coordinate of the shared point.

use p384::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use p384::elliptic_curve::sec1::ToEncodedPoint;
use p384::{ecdh, PublicKey, SecretKey};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::{CryptoError, Result};

/// Compressed SEC1 public key size in bytes.
pub const P384_PUBLIC_KEY_SIZE: usize = 49;

/// Private scalar size in bytes.
pub const P384_PRIVATE_KEY_SIZE: usize = 48;

/// Fixed `r ‖ s` signature size in bytes.
pub const P384_SIGNATURE_SIZE: usize = 96;

/// ECDH shared secret size in bytes.
pub const P384_SHARED_SECRET_SIZE: usize = 48;

/// Prehash (SHA-384 digest) size in bytes.
pub const P384_PREHASH_SIZE: usize = 48;

/// Generate a fresh P-384 key pair.
pub fn generate<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> (
    [u8; P384_PUBLIC_KEY_SIZE],
    Zeroizing<[u8; P384_PRIVATE_KEY_SIZE]>,
) {
    let secret = SecretKey::random(rng);
    let point = secret.public_key().to_encoded_point(true);

    let mut public = [0u8; P384_PUBLIC_KEY_SIZE];
    public.copy_from_slice(point.as_bytes());
    let mut private = Zeroizing::new([0u8; P384_PRIVATE_KEY_SIZE]);
    private.copy_from_slice(secret.to_bytes().as_slice());

    (public, private)
}

/// Sign a 48-byte prehash, producing a fixed 96-byte signature.
pub fn ecdsa_sign(
    private: &[u8; P384_PRIVATE_KEY_SIZE],
    prehash: &[u8; P384_PREHASH_SIZE],
) -> Result<[u8; P384_SIGNATURE_SIZE]> {
    let signing_key =
        SigningKey::from_slice(private.as_ref()).map_err(|_| CryptoError::InvalidKeyEncoding)?;
    let signature: Signature = signing_key
        .sign_prehash(prehash)
        .map_err(|_| CryptoError::Signing)?;

    let mut out = [0u8; P384_SIGNATURE_SIZE];
    out.copy_from_slice(signature.to_bytes().as_slice());
    Ok(out)
}

/// Verify a 96-byte signature over a 48-byte prehash.
///
/// Returns `false` for malformed points, malformed signatures, wrong-length
/// signatures, and honest verification failures alike.
pub fn ecdsa_verify(
    public: &[u8; P384_PUBLIC_KEY_SIZE],
    prehash: &[u8; P384_PREHASH_SIZE],
    sig: &[u8],
) -> bool {
    if sig.len() != P384_SIGNATURE_SIZE {
        return false;
    }
    let verifying_key = match VerifyingKey::from_sec1_bytes(public) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = match Signature::from_slice(sig) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    verifying_key.verify_prehash(prehash, &signature).is_ok()
}

/// ECDH agreement between a private scalar and a compressed public point.
pub fn ecdh_agree(
    private: &[u8; P384_PRIVATE_KEY_SIZE],
    public: &[u8; P384_PUBLIC_KEY_SIZE],
) -> Result<Zeroizing<[u8; P384_SHARED_SECRET_SIZE]>> {
    let secret =
        SecretKey::from_slice(private.as_ref()).map_err(|_| CryptoError::InvalidKeyEncoding)?;
    let peer = PublicKey::from_sec1_bytes(public).map_err(|_| CryptoError::InvalidKeyEncoding)?;

    let shared = ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let mut out = Zeroizing::new([0u8; P384_SHARED_SECRET_SIZE]);
    out.copy_from_slice(shared.raw_secret_bytes().as_slice());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha384;
    use rand::rngs::OsRng;

    #[test]
    fn test_generate_sizes_and_compression() {
        let (public, private) = generate(&mut OsRng);
        assert_eq!(public.len(), P384_PUBLIC_KEY_SIZE);
        assert_eq!(private.len(), P384_PRIVATE_KEY_SIZE);
        // Compressed SEC1 points start with 0x02 or 0x03.
        assert!(public[0] == 0x02 || public[0] == 0x03);
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let (public, private) = generate(&mut OsRng);
        let prehash = sha384(b"locator");
        let sig = ecdsa_sign(&private, &prehash).unwrap();
        assert!(ecdsa_verify(&public, &prehash, &sig));
    }

    #[test]
    fn test_verify_rejects_wrong_prehash() {
        let (public, private) = generate(&mut OsRng);
        let sig = ecdsa_sign(&private, &sha384(b"locator")).unwrap();
        assert!(!ecdsa_verify(&public, &sha384(b"rotacol"), &sig));
    }

    #[test]
    fn test_verify_rejects_bad_lengths() {
        let (public, private) = generate(&mut OsRng);
        let prehash = sha384(b"locator");
        let sig = ecdsa_sign(&private, &prehash).unwrap();
        assert!(!ecdsa_verify(&public, &prehash, &sig[..95]));
        assert!(!ecdsa_verify(&public, &prehash, &[0u8; 97]));
    }

    #[test]
    fn test_verify_rejects_garbage_point() {
        let (_, private) = generate(&mut OsRng);
        let prehash = sha384(b"locator");
        let sig = ecdsa_sign(&private, &prehash).unwrap();
        let bogus = [0xa5u8; P384_PUBLIC_KEY_SIZE];
        assert!(!ecdsa_verify(&bogus, &prehash, &sig));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let (_, private) = generate(&mut OsRng);
        let prehash = sha384(b"locator");
        assert_eq!(
            ecdsa_sign(&private, &prehash).unwrap(),
            ecdsa_sign(&private, &prehash).unwrap()
        );
    }

    #[test]
    fn test_ecdh_is_symmetric() {
        let (pub_a, priv_a) = generate(&mut OsRng);
        let (pub_b, priv_b) = generate(&mut OsRng);
        let ab = ecdh_agree(&priv_a, &pub_b).unwrap();
        let ba = ecdh_agree(&priv_b, &pub_a).unwrap();
        assert_eq!(*ab, *ba);
    }

    #[test]
    fn test_ecdh_rejects_garbage_point() {
        let (_, private) = generate(&mut OsRng);
        let bogus = [0xa5u8; P384_PUBLIC_KEY_SIZE];
        assert!(ecdh_agree(&private, &bogus).is_err());
    }
}
