//! # Execution Context
//!
//! Every module operation takes an `&ExecutionContext`. A context is never
//! mutated; advancing time or height produces a new context over the same
//! evolving store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lt_01_versioned_store::{CommitMultiStore, KvStore, StoreKey};

use crate::errors::ModuleError;

/// Store handle plus block time and height.
#[derive(Clone)]
pub struct ExecutionContext {
    store: Arc<CommitMultiStore>,
    block_time: DateTime<Utc>,
    block_height: u64,
    chain_id: String,
}

impl ExecutionContext {
    pub fn new(
        store: Arc<CommitMultiStore>,
        block_time: DateTime<Utc>,
        block_height: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            block_time,
            block_height,
            chain_id: chain_id.into(),
        }
    }

    pub fn store(&self) -> &Arc<CommitMultiStore> {
        &self.store
    }

    pub fn block_time(&self) -> DateTime<Utc> {
        self.block_time
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Same store, different height.
    pub fn with_block_height(&self, height: u64) -> Self {
        Self {
            block_height: height,
            ..self.clone()
        }
    }

    /// Same store, different time.
    pub fn with_block_time(&self, time: DateTime<Utc>) -> Self {
        Self {
            block_time: time,
            ..self.clone()
        }
    }

    pub fn with_chain_id(&self, chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            ..self.clone()
        }
    }

    /// View of a module namespace. Fails with a configuration error if the
    /// store has not been loaded or the namespace was never mounted.
    pub fn kv_store(&self, key: &StoreKey) -> Result<KvStore, ModuleError> {
        Ok(self.store.kv_store(key)?)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("chain_id", &self.chain_id)
            .field("block_height", &self.block_height)
            .field("block_time", &self.block_time)
            .field("store_version", &self.store.latest_version())
            .finish()
    }
}
