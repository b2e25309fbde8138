//! # SHA-256 Hashing

use sha2::{Digest, Sha256};
use shared_types::Hash;

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Uppercase hex SHA-256, the conventional transaction hash rendering.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode_upper(sha256(data))
}
