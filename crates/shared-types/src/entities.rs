//! # Core Domain Entities
//!
//! Addresses and account records shared by the ledger modules and the
//! transaction pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address.
///
/// User addresses are derived from a public key, module addresses from the
/// module name. Both use the first 20 bytes of a SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Derive an address from arbitrary key material.
    pub fn derive(material: &[u8]) -> Self {
        let digest = Sha256::digest(material);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(bytes)
    }

    /// Deterministic address of a module account.
    pub fn for_module(name: &str) -> Self {
        Self::derive(name.as_bytes())
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Lowercase hex rendering without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Error returned when parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address {0:?}")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).map_err(|_| AddressParseError(s.to_string()))?;
        if decoded.len() != ADDRESS_LEN {
            return Err(AddressParseError(s.to_string()));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

/// On-chain account state needed for signing.
///
/// `account_number` is assigned once when the account is created and never
/// changes. `sequence` increases by one for every transaction the account
/// signs and is the replay-protection counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account address.
    pub address: Address,
    /// Immutable account index.
    pub account_number: u64,
    /// Next expected sequence.
    pub sequence: u64,
    /// Compressed public key, known after the first signed transaction.
    pub public_key: Option<Vec<u8>>,
}

impl AccountRecord {
    /// Fresh record with sequence zero and no known public key.
    pub fn new(address: Address, account_number: u64) -> Self {
        Self {
            address,
            account_number,
            sequence: 0,
            public_key: None,
        }
    }
}
