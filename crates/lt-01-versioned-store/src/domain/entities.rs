use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Name of a store namespace. One per module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreKey(String);

impl StoreKey {
    /// Key for the namespace `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Namespace name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Non-empty and free of `/`, the terminator of [`db_prefix`](Self::db_prefix).
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.contains('/')
    }

    /// Prefix every key of this namespace carries in the backing database.
    pub(crate) fn db_prefix(&self) -> Vec<u8> {
        format!("s/k:{}/", self.0).into_bytes()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// How a mounted namespace persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    /// Writes are flushed to the backing database on commit and
    /// contribute to the commit hash.
    Versioned,
    /// Writes are discarded on every commit.
    Transient,
}

/// Hash of one namespace at a committed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Namespace.
    pub name: String,
    /// SHA-256 over the namespace's sorted key/value pairs.
    pub hash: Hash,
}

/// Result of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Version produced by this commit. The first commit yields 1.
    pub version: u64,
    /// Per-namespace hashes, sorted by name.
    pub store_infos: Vec<StoreInfo>,
    /// Hash over all store infos.
    pub app_hash: Hash,
}

impl CommitInfo {
    /// Hex rendering of the app hash.
    pub fn app_hash_hex(&self) -> String {
        hex::encode(self.app_hash)
    }
}
