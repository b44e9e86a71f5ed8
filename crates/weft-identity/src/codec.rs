//! Canonical identity encodings.
//!
//! Textual form: `address:type:public[:private]` — the address as exactly ten
//! lowercase hex digits, the type as a single digit, and the key blobs as
//! lowercase hex (type 0) or unpadded lowercase base32 (type 1).
//!
//! Binary form, in order: 5-byte big-endian address, 1 type byte, the
//! fixed-size public blob, 1 private-length byte, then the private blob when
//! the length byte is non-zero. The length byte must be zero or exactly the
//! type's private size; anything else is an error.
//!
//! Both decoders reject reserved addresses, and for type 1 both recompute the
//! fingerprint and require its trailing bytes to match the carried address.
//! Type 0 addresses can only be checked by re-running the proof of work, so
//! decoding defers that to [`Identity::validate`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

use weft_crypto::c25519;

use crate::address::{Address, ADDRESS_SIZE};
use crate::base32;
use crate::error::{IdentityError, Result};
use crate::identity::{
    Identity, IdentityType, KeyMaterial, P384_COMPOUND_PRIVATE_KEY_SIZE,
    P384_COMPOUND_PUBLIC_KEY_SIZE,
};

impl Identity {
    /// Encode the textual form, including the private key only when asked
    /// for and present.
    pub fn to_text(&self, include_private: bool) -> String {
        let mut out = format!("{}:", self.fingerprint.address);
        match &self.keys {
            KeyMaterial::C25519 { public, private } => {
                out.push_str("0:");
                out.push_str(&hex::encode(public));
                if include_private {
                    if let Some(private) = private {
                        out.push(':');
                        out.push_str(&hex::encode(&private[..]));
                    }
                }
            }
            KeyMaterial::P384 { public, private } => {
                out.push_str("1:");
                out.push_str(&base32::encode(public));
                if include_private {
                    if let Some(private) = private {
                        out.push(':');
                        out.push_str(&base32::encode(&private[..]));
                    }
                }
            }
        }
        out
    }

    /// Encode the binary form, including the private key only when asked for
    /// and present.
    pub fn to_bytes(&self, include_private: bool) -> Vec<u8> {
        let kind = self.kind();
        let mut out = Vec::with_capacity(
            ADDRESS_SIZE + 1 + kind.public_key_size() + 1 + kind.private_key_size(),
        );
        out.extend_from_slice(&self.fingerprint.address.to_bytes());
        out.push(kind.to_wire());
        out.extend_from_slice(self.keys.public_bytes());
        match self.keys.private_bytes() {
            Some(private) if include_private => {
                out.push(private.len() as u8);
                out.extend_from_slice(private);
            }
            _ => out.push(0),
        }
        out
    }

    /// Decode the binary form, returning the identity and the number of
    /// bytes consumed.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < ADDRESS_SIZE + 1 {
            return Err(IdentityError::Truncated);
        }
        let mut addr_bytes = [0u8; ADDRESS_SIZE];
        addr_bytes.copy_from_slice(&data[..ADDRESS_SIZE]);
        let address = Address::from_bytes(&addr_bytes);
        let kind = IdentityType::from_wire(data[ADDRESS_SIZE])?;
        let cursor = ADDRESS_SIZE + 1;

        let (keys, consumed) = match kind {
            IdentityType::C25519 => {
                let ((public, private), consumed) = read_key_blobs(data, cursor)?;
                (KeyMaterial::C25519 { public, private }, consumed)
            }
            IdentityType::P384 => {
                let ((public, private), consumed) = read_key_blobs(data, cursor)?;
                (KeyMaterial::P384 { public, private }, consumed)
            }
        };

        Ok((Identity::assemble(address, keys)?, consumed))
    }
}

/// Read a fixed-size public blob and a length-prefixed optional private blob.
fn read_key_blobs<const PUB: usize, const PRIV: usize>(
    data: &[u8],
    mut cursor: usize,
) -> Result<(([u8; PUB], Option<Zeroizing<[u8; PRIV]>>), usize)> {
    if data.len() < cursor + PUB + 1 {
        return Err(IdentityError::Truncated);
    }
    let mut public = [0u8; PUB];
    public.copy_from_slice(&data[cursor..cursor + PUB]);
    cursor += PUB;

    let private_len = data[cursor] as usize;
    cursor += 1;
    let private = match private_len {
        0 => None,
        len if len == PRIV => {
            if data.len() < cursor + PRIV {
                return Err(IdentityError::Truncated);
            }
            let mut private = Zeroizing::new([0u8; PRIV]);
            private.copy_from_slice(&data[cursor..cursor + PRIV]);
            cursor += PRIV;
            Some(private)
        }
        len => {
            return Err(IdentityError::Malformed(format!(
                "private key length byte {len}, expected 0 or {PRIV}"
            )))
        }
    };

    Ok(((public, private), cursor))
}

impl FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() < 3 || fields.len() > 4 {
            return Err(IdentityError::Malformed(format!(
                "expected 3 or 4 colon-delimited fields, got {}",
                fields.len()
            )));
        }

        let address: Address = fields[0].parse()?;
        if address.is_reserved() {
            return Err(IdentityError::ReservedAddress(address));
        }

        let keys = match fields[1] {
            "0" => {
                let public = decode_hex_blob(fields[2])?;
                let private = match fields.get(3) {
                    // A trailing field of a single character is tolerated and
                    // treated as no private key, matching historic parsers.
                    Some(f) if f.len() > 1 => Some(decode_hex_secret(f)?),
                    _ => None,
                };
                KeyMaterial::C25519 { public, private }
            }
            "1" => {
                let public = decode_base32_blob(fields[2])?;
                let private = match fields.get(3) {
                    Some(f) if f.len() > 1 => Some(decode_base32_secret(f)?),
                    _ => None,
                };
                KeyMaterial::P384 { public, private }
            }
            other => {
                return Err(IdentityError::Malformed(format!(
                    "bad identity type field {other:?}"
                )))
            }
        };

        Identity::assemble(address, keys)
    }
}

fn decode_hex_blob(field: &str) -> Result<[u8; c25519::COMBINED_PUBLIC_KEY_SIZE]> {
    let bytes = hex::decode(field)
        .map_err(|_| IdentityError::Malformed("bad hex in public key field".into()))?;
    bytes
        .try_into()
        .map_err(|_| IdentityError::Malformed("wrong public key size".into()))
}

fn decode_hex_secret(field: &str) -> Result<Zeroizing<[u8; c25519::COMBINED_PRIVATE_KEY_SIZE]>> {
    let mut bytes = hex::decode(field)
        .map_err(|_| IdentityError::Malformed("bad hex in private key field".into()))?;
    if bytes.len() != c25519::COMBINED_PRIVATE_KEY_SIZE {
        bytes.zeroize();
        return Err(IdentityError::Malformed("wrong private key size".into()));
    }
    let mut out = Zeroizing::new([0u8; c25519::COMBINED_PRIVATE_KEY_SIZE]);
    out.copy_from_slice(&bytes);
    bytes.zeroize();
    Ok(out)
}

fn decode_base32_blob(field: &str) -> Result<[u8; P384_COMPOUND_PUBLIC_KEY_SIZE]> {
    let bytes = base32::decode(field)?;
    bytes
        .try_into()
        .map_err(|_| IdentityError::Malformed("wrong public key size".into()))
}

fn decode_base32_secret(field: &str) -> Result<Zeroizing<[u8; P384_COMPOUND_PRIVATE_KEY_SIZE]>> {
    let mut bytes = base32::decode(field)?;
    if bytes.len() != P384_COMPOUND_PRIVATE_KEY_SIZE {
        bytes.zeroize();
        return Err(IdentityError::Malformed("wrong private key size".into()));
    }
    let mut out = Zeroizing::new([0u8; P384_COMPOUND_PRIVATE_KEY_SIZE]);
    out.copy_from_slice(&bytes);
    bytes.zeroize();
    Ok(out)
}

impl fmt::Display for Identity {
    /// The public textual form; private material never appears here.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(false))
    }
}

impl Serialize for Identity {
    /// Identities serialize as their public textual form. Private key
    /// material deliberately never passes through serde; use
    /// [`Identity::to_bytes`] or [`Identity::to_text`] with
    /// `include_private = true` for local storage.
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text(false))
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
