//! # lt-01-versioned-store
//!
//! Multi-namespace versioned key-value store shared by every ledger module.
//!
//! ## Contract
//!
//! | Step | Rule |
//! |------|------|
//! | `mount_store` | once per namespace, before load |
//! | `load_latest_version` | exactly once, after all mounts |
//! | `kv_store` / `commit` | only after load |
//!
//! Breaking any of these rules is a `ConfigError`.
//!
//! ## Crate Structure
//!
//! - `domain/` - store keys, commit info, errors
//! - `ports/` - `BackingDb`, the database every namespace writes through
//! - `adapters/` - `MemDb`, the in-memory backing database
//! - `service/` - `CommitMultiStore` and `KvStore` prefix views
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use lt_01_versioned_store::{CommitMultiStore, MemDb, StoreKey, StoreKind};
//!
//! let db = Arc::new(MemDb::new());
//! let cms = CommitMultiStore::new(db.clone());
//! cms.mount_store(StoreKey::new("bank"), StoreKind::Versioned, db)?;
//! cms.load_latest_version()?;
//! cms.kv_store(&StoreKey::new("bank"))?.set(b"k", b"v");
//! cms.commit()?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::MemDb;
pub use domain::{CommitInfo, StoreError, StoreInfo, StoreKey, StoreKind};
pub use ports::{BackingDb, BatchOperation};
pub use service::{Checkpoint, CommitMultiStore, KvStore};
