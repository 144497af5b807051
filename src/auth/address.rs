//! Wallet address normalization
//!
//! Addresses are 20-byte identifiers rendered as `0x` + 40 hex digits. Case
//! carries no meaning, so every address entering the system is normalized to
//! lowercase before it is stored, looked up, or compared.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,

    #[error("Address must contain exactly 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Address contains non-hex characters")]
    InvalidHex,
}

/// A normalized (lowercase, `0x`-prefixed) wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let digits = strip_hex_prefix(trimmed);
        if digits.len() != 40 {
            return Err(AddressError::InvalidLength(digits.len()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex);
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Build from the last 20 bytes of a public key hash
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_prefix() {
        let checksummed = WalletAddress::parse("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23").unwrap();
        let bare = WalletAddress::parse("2C7536E3605D9C16A7A3D7B1898E529396A65C23").unwrap();

        assert_eq!(checksummed, bare);
        assert_eq!(
            checksummed.as_str(),
            "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let address = WalletAddress::parse("  0X7E5F4552091A69125D5DFCB7B8C2659029395BDF\n").unwrap();
        assert_eq!(
            address.to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(WalletAddress::parse(""), Err(AddressError::Empty));
        assert_eq!(
            WalletAddress::parse("0xabc"),
            Err(AddressError::InvalidLength(3))
        );
        assert_eq!(
            WalletAddress::parse("0xzz7536e3605d9c16a7a3d7b1898e529396a65c23"),
            Err(AddressError::InvalidHex)
        );
    }
}
