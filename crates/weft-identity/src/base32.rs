//! Unpadded lowercase base32.
//!
//! Type 1 identities encode their key blobs with RFC 3548-style base32 using
//! the alphabet `abcdefghijklmnopqrstuvwxyz234567`, lowercase and without
//! padding. The alphabet is part of the wire format; decoders are strict
//! about it.

use crate::error::{IdentityError, Result};

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Encode bytes as unpadded lowercase base32.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer = 0u64;
    let mut bits = 0u32;
    for &byte in data {
        buffer = (buffer << 8) | u64::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode unpadded lowercase base32.
///
/// Trailing bits that do not fill a whole byte are discarded, matching the
/// encoder; any character outside the alphabet is an error.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer = 0u64;
    let mut bits = 0u32;
    for c in s.bytes() {
        let value = match c {
            b'a'..=b'z' => c - b'a',
            b'2'..=b'7' => c - b'2' + 26,
            _ => {
                return Err(IdentityError::Malformed(format!(
                    "invalid base32 character {:?}",
                    c as char
                )))
            }
        };
        buffer = (buffer << 5) | u64::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4648_vectors() {
        // RFC 4648 section 10, lowercased and stripped of padding.
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"f"), "my");
        assert_eq!(encode(b"fo"), "mzxq");
        assert_eq!(encode(b"foo"), "mzxw6");
        assert_eq!(encode(b"foob"), "mzxw6yq");
        assert_eq!(encode(b"fooba"), "mzxw6ytb");
        assert_eq!(encode(b"foobar"), "mzxw6ytboi");
    }

    #[test]
    fn test_decode_vectors() {
        assert_eq!(decode("mzxw6ytboi").unwrap(), b"foobar");
        assert_eq!(decode("").unwrap(), b"");
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(decode("MZXW6").is_err());
        assert!(decode("mzxw0").is_err());
        assert!(decode("mzxw6=").is_err());
        assert!(decode("mzx 6").is_err());
    }

    #[test]
    fn test_encoded_lengths() {
        // The type 1 blob sizes as they appear in identity strings.
        assert_eq!(encode(&[0u8; 114]).len(), 183);
        assert_eq!(encode(&[0u8; 113]).len(), 181);
    }

    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip(data: Vec<u8>) {
                prop_assert_eq!(decode(&encode(&data)).unwrap(), data);
            }

            #[test]
            fn encoding_is_lowercase_alphabet_only(data: Vec<u8>) {
                let encoded = encode(&data);
                prop_assert!(encoded
                    .bytes()
                    .all(|c| c.is_ascii_lowercase() || (b'2'..=b'7').contains(&c)));
            }
        }
    }
}
