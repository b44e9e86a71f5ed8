//! Memory-hard proof-of-work engines.
//!
//! Both engines exist to make bulk address grinding expensive. The legacy v0
//! engine walks a 2 MiB buffer with Salsa20 in a CBC-like chain (ordinary
//! Salsa20 is seekable, which is good in a cipher but useless for sequential
//! memory-hardness) and then uses the buffer as a shuffle table over the
//! digest. The current v1 engine fills 128 KiB through three data-dependent
//! branches, sorts the whole buffer, and MACs it; the sort makes every output
//! bit depend on every filled word, and the branching penalizes SIMT-style
//! execution that must run all three lanes.
//!
//! Every constant here is normative for interoperability.

use weft_crypto::hash::{sha384, sha512};
use weft_crypto::mac::poly1305_tag;
use weft_crypto::salsa::{Salsa12Stream, Salsa20Stream};
use zeroize::Zeroize;

/// v0 work buffer size in bytes (2 MiB).
pub const V0_MEMORY: usize = 2_097_152;

/// v0 acceptance threshold: `digest[0] < 17`, an accept rate of about 1/15.
pub const V0_THRESHOLD: u8 = 17;

/// v0 digest size in bytes.
pub const V0_DIGEST_SIZE: usize = 64;

/// v1 work buffer size in bytes (128 KiB).
pub const V1_MEMORY: usize = 131_072;

/// v1 acceptance modulus: the leading word must be divisible by 1000.
pub const V1_MODULUS: u64 = 1000;

const V1_WORDS: usize = V1_MEMORY / 8;

// Moduli for the v1 prime-reduction lane, one per 64-bit word.
const V1_PRIMES: [u64; 8] = [
    4_503_599_627_370_101,
    4_503_599_627_370_161,
    4_503_599_627_370_227,
    4_503_599_627_370_287,
    4_503_599_627_370_299,
    4_503_599_627_370_323,
    4_503_599_627_370_353,
    4_503_599_627_370_449,
];

fn load_be(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(word)
}

fn load_le(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

/// Reusable heap scratch for the v0 engine.
///
/// The buffer may be reused across candidates on one thread but must never be
/// shared between threads; it is re-zeroed at the start of every digest and
/// scrubbed on drop.
pub struct V0Scratch {
    mem: Vec<u8>,
}

impl V0Scratch {
    /// Allocate a zeroed 2 MiB scratch buffer.
    pub fn new() -> Self {
        Self {
            mem: vec![0u8; V0_MEMORY],
        }
    }

    /// Run the v0 memory-hard digest over a public key blob.
    pub fn digest(&mut self, public_key: &[u8]) -> [u8; V0_DIGEST_SIZE] {
        let mut digest = sha512(public_key);
        let mem = &mut self.mem;
        mem.fill(0);

        let mut key = [0u8; 32];
        key.copy_from_slice(&digest[..32]);
        let mut iv = [0u8; 8];
        iv.copy_from_slice(&digest[32..40]);
        let mut cipher = Salsa20Stream::new(&key, &iv);

        // Sequential fill: each 64-byte block is the encryption of its
        // predecessor's ciphertext, so block N cannot be produced without
        // materializing blocks 0..N.
        cipher.apply(&mut mem[..64]);
        for i in (64..V0_MEMORY).step_by(64) {
            mem.copy_within(i - 64..i, i);
            cipher.apply(&mut mem[i..i + 64]);
        }

        // Shuffle pass: consume the buffer two words at a time as swap
        // indices into the digest and the buffer itself, re-encrypting the
        // digest after every swap.
        let mut i = 0;
        while i < V0_MEMORY / 8 {
            let digest_word = (load_be(&mem[i * 8..]) % 8) as usize;
            let mem_word = (load_be(&mem[(i + 1) * 8..]) % (V0_MEMORY / 8) as u64) as usize;
            i += 2;

            let mut tmp = [0u8; 8];
            tmp.copy_from_slice(&mem[mem_word * 8..mem_word * 8 + 8]);
            mem[mem_word * 8..mem_word * 8 + 8]
                .copy_from_slice(&digest[digest_word * 8..digest_word * 8 + 8]);
            digest[digest_word * 8..digest_word * 8 + 8].copy_from_slice(&tmp);

            cipher.apply(&mut digest);
        }

        digest
    }
}

impl Default for V0Scratch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for V0Scratch {
    fn drop(&mut self) {
        self.mem.zeroize();
    }
}

/// Whether a v0 digest satisfies the work criterion.
pub fn v0_accepts(digest: &[u8; V0_DIGEST_SIZE]) -> bool {
    digest[0] < V0_THRESHOLD
}

/// Run the v1 proof-of-work criterion over an arbitrary byte sequence.
///
/// Accept rate is 1/1000.
pub fn v1_accepts(input: &[u8]) -> bool {
    let mut w = vec![0u8; V1_MEMORY];
    w[..64].copy_from_slice(&sha512(input));

    // Fill the buffer 64 bytes at a time, choosing one of three lanes from
    // the source words: SHA-512, per-word prime reduction followed by a
    // SHA-384 over source and reduced words together, or Salsa20/12 keyed by
    // the source. The SHA-384 lane intentionally overwrites only 48 of the 64
    // destination bytes, leaving the last two reduced words in place.
    let mut i = 8usize;
    let mut j = 0usize;
    while i < V1_WORDS {
        let bi = i * 8;
        let bj = j * 8;
        i += 8;
        j += 8;

        let wp0 = load_le(&w[bj..]);
        let wp1 = load_le(&w[bj + 8..]);
        if wp0 & 7 == 0 {
            let d = sha512(&w[bj..bj + 64]);
            w[bi..bi + 64].copy_from_slice(&d);
        } else if wp1 & 15 == 0 {
            for (k, prime) in V1_PRIMES.iter().enumerate() {
                let v = load_be(&w[bj + k * 8..]) % prime;
                w[bi + k * 8..bi + k * 8 + 8].copy_from_slice(&v.to_be_bytes());
            }
            let d = sha384(&w[bj..bj + 128]);
            w[bi..bi + 48].copy_from_slice(&d);
        } else {
            let mut key = [0u8; 32];
            key.copy_from_slice(&w[bj..bj + 32]);
            let mut iv = [0u8; 8];
            iv.copy_from_slice(&w[bj + 32..bj + 40]);
            w.copy_within(bj..bj + 64, bi);
            Salsa12Stream::new(&key, &iv).apply(&mut w[bi..bi + 64]);
        }
    }

    // Sort as little-endian unsigned 64-bit integers so the final MAC
    // depends on the full buffer contents, not just a suffix.
    let mut words: Vec<u64> = w.chunks_exact(8).map(load_le).collect();
    words.sort_unstable();
    for (chunk, word) in w.chunks_exact_mut(8).zip(&words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }

    // Self-MAC: the sorted buffer is keyed by its own first 32 bytes and the
    // tag lands back over its first 16.
    let mut key = [0u8; 32];
    key.copy_from_slice(&w[..32]);
    let tag = poly1305_tag(&key, &w);
    w[..16].copy_from_slice(&tag);

    load_be(&w[..8]) % V1_MODULUS == 0
}
