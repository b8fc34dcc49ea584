//! # Core Entities
//!
//! Primitive value types shared by the authentication and heartbeat subsystems.
//!
//! - `Address`: 20-byte Ethereum account address (EIP-55 checksummed display)
//! - `Hash`: 32-byte keccak-256 digest
//! - `UnixSeconds`: wall-clock timestamps exchanged with wallets and the chain

use crate::errors::TypeError;
use crate::hashing::keccak256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash (keccak-256 throughout this workspace).
pub type Hash = [u8; 32];

/// Unix timestamp in seconds.
///
/// Signed so that "age" arithmetic (`now - ts`) can go negative for
/// timestamps issued slightly in the future.
pub type UnixSeconds = i64;

/// Length of an Ethereum address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte Ethereum-style address.
///
/// Parsing accepts an optional `0x`/`0X` prefix and any letter case; the
/// checksum casing of the input is not enforced. Equality is byte equality,
/// which makes address comparison case-insensitive by construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Wrap raw address bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, which must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let array: [u8; ADDRESS_LEN] =
            bytes
                .try_into()
                .map_err(|_| TypeError::InvalidLength {
                    expected: ADDRESS_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Raw big-endian address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                digest[i / 2] >> 4
            } else {
                digest[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != ADDRESS_LEN * 2 {
            return Err(TypeError::InvalidAddress(format!(
                "expected {} hex digits, got {}",
                ADDRESS_LEN * 2,
                digits.len()
            )));
        }

        let bytes = hex::decode(digits).map_err(|e| TypeError::InvalidAddress(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode bytes as `0x`-prefixed lowercase hex (the form used for hashes on the wire).
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a `0x`-prefixed hex string. The prefix is mandatory.
pub fn from_prefixed_hex(s: &str) -> Result<Vec<u8>, TypeError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or(TypeError::MissingHexPrefix)?;
    hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Vectors from EIP-55
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for expected in CHECKSUMMED {
            let parsed: Address = expected.to_lowercase().parse().unwrap();
            assert_eq!(parsed.to_checksum(), expected);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let a: Address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
        let b: Address = "0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED".parse().unwrap();
        let c: Address = "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(TypeError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let bad = format!("0x{}", "zz".repeat(20));
        assert!(bad.parse::<Address>().is_err());
    }

    #[test]
    fn test_serde_uses_checksum_string() {
        let addr: Address = CHECKSUMMED[0].parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED[0]));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_prefixed_hex_requires_prefix() {
        assert_eq!(from_prefixed_hex("0x0a0b").unwrap(), vec![0x0a, 0x0b]);
        assert!(matches!(
            from_prefixed_hex("0a0b"),
            Err(TypeError::MissingHexPrefix)
        ));
        assert!(matches!(
            from_prefixed_hex("0x0a0"),
            Err(TypeError::InvalidHex(_))
        ));
    }
}
