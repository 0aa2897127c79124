//! Account addresses
//!
//! An address is the 32-byte ed25519 public key of an account, rendered as
//! bech32 with the `erd` human-readable part.

use crate::{Error, Result};
use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Human-readable part of every account address
pub const ADDRESS_HRP: &str = "erd";

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a slice, failing unless it is exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            Error::Address(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse a bech32 `erd1...` string
    pub fn from_bech32(s: &str) -> Result<Self> {
        let (hrp, data, variant) =
            bech32::decode(s).map_err(|e| Error::Address(format!("{}: {}", s, e)))?;

        if variant != Variant::Bech32 {
            return Err(Error::Address(format!("{}: not a bech32 address", s)));
        }
        if hrp != ADDRESS_HRP {
            return Err(Error::Address(format!(
                "{}: human-readable part '{}', expected '{}'",
                s, hrp, ADDRESS_HRP
            )));
        }

        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| Error::Address(format!("{}: {}", s, e)))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Bech32 rendering
    pub fn to_bech32(&self) -> String {
        self.to_string()
    }

    /// Smart contract addresses start with eight zero bytes
    pub fn is_smart_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bech32::encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32)
            .map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_bech32(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    const ALICE_HEX: &str = "0139472eff6886771a982f3083da5d421f24c29181e63888228dc81ca60d69e1";
    const DELEGATION_SC: &str = "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqhllllsajxzat";

    #[test]
    fn test_decode_known_address() {
        let address = Address::from_bech32(ALICE).unwrap();
        assert_eq!(hex::encode(address.as_bytes()), ALICE_HEX);
        assert_eq!(address.to_bech32(), ALICE);
        assert!(!address.is_smart_contract());
    }

    #[test]
    fn test_contract_address() {
        let address: Address = DELEGATION_SC.parse().unwrap();
        assert!(address.is_smart_contract());
    }

    #[test]
    fn test_zero_address_encoding() {
        let address = Address::from_bytes([0u8; 32]);
        assert_eq!(
            address.to_string(),
            "erd1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq6gq4hu"
        );
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let mut corrupted = ALICE.to_string();
        corrupted.pop();
        corrupted.push('q');
        assert!(Address::from_bech32(&corrupted).is_err());
    }

    #[test]
    fn test_rejects_wrong_hrp() {
        let other = bech32::encode("xyz", [1u8; 32].to_base32(), Variant::Bech32).unwrap();
        let err = Address::from_bech32(&other).unwrap_err();
        assert!(err.to_string().contains("expected 'erd'"));
    }

    #[test]
    fn test_rejects_short_payload() {
        let short = bech32::encode("erd", [1u8; 20].to_base32(), Variant::Bech32).unwrap();
        assert!(Address::from_bech32(&short).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let address = Address::from_bech32(ALICE).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", ALICE));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
