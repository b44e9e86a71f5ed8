//! 40-bit overlay addresses.
//!
//! An address is the short name of a peer: 40 bits, written as exactly ten
//! lowercase hex digits and transported as five big-endian bytes. Addresses
//! are never chosen — they fall out of the proof of work binding them to an
//! identity's public key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::IdentityError;

/// Address length on the wire in bytes.
pub const ADDRESS_SIZE: usize = 5;

/// Mask selecting the 40 significant bits of an address.
pub const ADDRESS_MASK: u64 = 0xff_ffff_ffff;

/// A 40-bit overlay network address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    /// Create an address from a 40-bit value; higher bits are discarded.
    pub fn new(value: u64) -> Self {
        Self(value & ADDRESS_MASK)
    }

    /// Read an address from its 5-byte big-endian wire form.
    pub fn from_bytes(bytes: &[u8; ADDRESS_SIZE]) -> Self {
        let mut value = 0u64;
        for &b in bytes {
            value = (value << 8) | u64::from(b);
        }
        Self(value)
    }

    /// Read an address from the trailing 5 bytes of a digest.
    ///
    /// Both proof-of-work schemes derive the address this way: type 0 from
    /// the tail of the 64-byte work digest, type 1 from the tail of the
    /// 48-byte fingerprint hash.
    pub fn from_digest_tail(digest: &[u8]) -> Self {
        let tail: &[u8; ADDRESS_SIZE] = digest[digest.len() - ADDRESS_SIZE..]
            .try_into()
            .expect("digest shorter than an address");
        Self::from_bytes(tail)
    }

    /// The 5-byte big-endian wire form.
    pub fn to_bytes(self) -> [u8; ADDRESS_SIZE] {
        let mut out = [0u8; ADDRESS_SIZE];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = (self.0 >> (8 * (ADDRESS_SIZE - 1 - i))) as u8;
        }
        out
    }

    /// The address as an integer (top 24 bits zero).
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this address is reserved for administrative use.
    ///
    /// Reserved addresses are zero and anything whose high byte is `0xff`;
    /// identities carrying one are rejected everywhere.
    pub fn is_reserved(self) -> bool {
        self.0 == 0 || (self.0 >> 32) == 0xff
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl FromStr for Address {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = u64::from_str_radix(s, 16)
            .map_err(|_| IdentityError::Malformed(format!("bad address field {s:?}")))?;
        Ok(Self::new(value))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        if value & !ADDRESS_MASK != 0 {
            return Err(serde::de::Error::custom("address wider than 40 bits"));
        }
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_predicate() {
        assert!(Address::new(0).is_reserved());
        assert!(Address::new(0xff_0000_0000).is_reserved());
        assert!(Address::new(0xff_ffff_ffff).is_reserved());
        assert!(!Address::new(1).is_reserved());
        assert!(!Address::new(0xfe_ffff_ffff).is_reserved());
    }

    #[test]
    fn test_wire_roundtrip() {
        let addr = Address::new(0x0123_4567_89);
        assert_eq!(addr.to_bytes(), [0x01, 0x23, 0x45, 0x67, 0x89]);
        assert_eq!(Address::from_bytes(&addr.to_bytes()), addr);
    }

    #[test]
    fn test_display_is_ten_lowercase_hex_digits() {
        assert_eq!(Address::new(0xab).to_string(), "00000000ab");
        assert_eq!(Address::new(0xdead_beef_01).to_string(), "deadbeef01");
    }

    #[test]
    fn test_parse_masks_to_40_bits() {
        let addr: Address = "fffdeadbeef01".parse().unwrap();
        assert_eq!(addr.as_u64(), 0xdead_beef_01);
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("zzzzzzzzzz".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn test_from_digest_tail() {
        let mut digest = [0u8; 48];
        digest[43..].copy_from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(Address::from_digest_tail(&digest).as_u64(), 0x01_0203_0405);
    }

    #[test]
    fn test_new_masks_high_bits() {
        assert_eq!(Address::new(u64::MAX).as_u64(), ADDRESS_MASK);
    }
}
