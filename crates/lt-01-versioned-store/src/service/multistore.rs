//! # Commit MultiStore
//!
//! Namespaces are mounted first, then the store is loaded exactly once, and
//! only then can namespaces be read or written.
//!
//! ```text
//! mount_store(k1) ─┐
//! mount_store(k2) ─┼─→ load_latest_version() ─→ kv_store(k) / commit()
//! mount_store(kN) ─┘
//! ```
//!
//! Writes are buffered per namespace until `commit()`, which flushes
//! versioned namespaces to their backing database, clears transient ones and
//! bumps the version.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::ConfigError;
use tracing::{debug, info, instrument};

use crate::domain::{CommitInfo, StoreError, StoreInfo, StoreKey, StoreKind};
use crate::ports::{BackingDb, BatchOperation};
use crate::service::kv_store::KvStore;

const LATEST_VERSION_KEY: &[u8] = b"s/latest";

fn commit_info_key(version: u64) -> Vec<u8> {
    format!("s/{}", version).into_bytes()
}

type Pending = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// A mounted namespace: its backing handle plus uncommitted writes.
pub(crate) struct MountedStore {
    pub(crate) key: StoreKey,
    pub(crate) kind: StoreKind,
    db: Arc<dyn BackingDb>,
    db_prefix: Vec<u8>,
    pending: RwLock<Pending>,
}

impl MountedStore {
    fn new(key: StoreKey, kind: StoreKind, db: Arc<dyn BackingDb>) -> Self {
        let db_prefix = key.db_prefix();
        Self {
            key,
            kind,
            db,
            db_prefix,
            pending: RwLock::new(BTreeMap::new()),
        }
    }

    fn db_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = self.db_prefix.clone();
        full.extend_from_slice(key);
        full
    }

    pub(crate) fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(buffered) = self.pending.read().get(key) {
            return Ok(buffered.clone());
        }
        if self.kind == StoreKind::Transient {
            return Ok(None);
        }
        self.db.get(&self.db_key(key))
    }

    pub(crate) fn set(&self, key: Vec<u8>, value: Vec<u8>) {
        self.pending.write().insert(key, Some(value));
    }

    pub(crate) fn delete(&self, key: Vec<u8>) {
        self.pending.write().insert(key, None);
    }

    /// Committed pairs overlaid with pending writes, sorted by key.
    pub(crate) fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        if self.kind == StoreKind::Versioned {
            let strip = self.db_prefix.len();
            for (k, v) in self.db.prefix_scan(&self.db_key(prefix))? {
                merged.insert(k[strip..].to_vec(), v);
            }
        }
        for (k, v) in self.pending.read().iter() {
            if !k.starts_with(prefix) {
                continue;
            }
            match v {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }

    /// Flush pending writes. Returns the namespace hash for versioned stores.
    fn commit(&self) -> Result<Option<StoreInfo>, StoreError> {
        let pending = std::mem::take(&mut *self.pending.write());
        if self.kind == StoreKind::Transient {
            return Ok(None);
        }

        let ops = pending
            .into_iter()
            .map(|(k, v)| match v {
                Some(v) => BatchOperation::put(self.db_key(&k), v),
                None => BatchOperation::delete(self.db_key(&k)),
            })
            .collect::<Vec<_>>();
        debug!(store = %self.key, writes = ops.len(), "flushing namespace");
        self.db.write_batch(ops)?;

        let mut hasher = Sha256::new();
        for (k, v) in self.db.prefix_scan(&self.db_prefix)? {
            hasher.update((k.len() as u64).to_be_bytes());
            hasher.update(&k);
            hasher.update((v.len() as u64).to_be_bytes());
            hasher.update(&v);
        }
        Ok(Some(StoreInfo {
            name: self.key.name().to_string(),
            hash: hasher.finalize().into(),
        }))
    }
}

#[derive(Default)]
struct LoadState {
    loaded: bool,
    version: u64,
    last_commit: Option<CommitInfo>,
}

/// Uncommitted writes of every namespace at some point in time.
///
/// Restoring one discards every write made after it was taken.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pending: BTreeMap<StoreKey, Pending>,
}

/// The shared versioned store all modules are mounted into.
pub struct CommitMultiStore {
    meta_db: Arc<dyn BackingDb>,
    mounts: RwLock<BTreeMap<StoreKey, Arc<MountedStore>>>,
    state: RwLock<LoadState>,
}

impl CommitMultiStore {
    /// New store keeping its version metadata in `meta_db`.
    pub fn new(meta_db: Arc<dyn BackingDb>) -> Self {
        Self {
            meta_db,
            mounts: RwLock::new(BTreeMap::new()),
            state: RwLock::new(LoadState::default()),
        }
    }

    /// Reserve a namespace backed by `db`.
    ///
    /// Must happen before `load_latest_version`. A namespace can be mounted
    /// once.
    pub fn mount_store(
        &self,
        key: StoreKey,
        kind: StoreKind,
        db: Arc<dyn BackingDb>,
    ) -> Result<(), ConfigError> {
        if !key.is_valid() {
            return Err(ConfigError::InvalidNamespace(key.name().to_string()));
        }
        if self.state.read().loaded {
            return Err(ConfigError::MountAfterLoad(key.name().to_string()));
        }
        let mut mounts = self.mounts.write();
        if mounts.contains_key(&key) {
            return Err(ConfigError::NamespaceAlreadyMounted(key.name().to_string()));
        }
        debug!(store = %key, ?kind, "mounting namespace");
        mounts.insert(key.clone(), Arc::new(MountedStore::new(key, kind, db)));
        Ok(())
    }

    /// Finalize mounting and restore the latest committed version.
    #[instrument(skip(self))]
    pub fn load_latest_version(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write();
        if state.loaded {
            return Err(ConfigError::StoreAlreadyLoaded.into());
        }

        let version = match self.meta_db.get(LATEST_VERSION_KEY)? {
            Some(bytes) => bincode::deserialize::<u64>(&bytes)?,
            None => 0,
        };
        let last_commit = match version {
            0 => None,
            v => self
                .meta_db
                .get(&commit_info_key(v))?
                .map(|bytes| bincode::deserialize::<CommitInfo>(&bytes))
                .transpose()?,
        };

        state.loaded = true;
        state.version = version;
        state.last_commit = last_commit;
        info!(
            version,
            namespaces = self.mounts.read().len(),
            "versioned store loaded"
        );
        Ok(version)
    }

    /// True once `load_latest_version` succeeded.
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Last committed version, zero before the first commit.
    pub fn latest_version(&self) -> u64 {
        self.state.read().version
    }

    /// Commit info of the latest version, if any.
    pub fn last_commit_info(&self) -> Option<CommitInfo> {
        self.state.read().last_commit.clone()
    }

    /// Mounted namespace names, sorted.
    pub fn mounted(&self) -> Vec<StoreKey> {
        self.mounts.read().keys().cloned().collect()
    }

    fn ensure_loaded(&self) -> Result<(), StoreError> {
        if self.state.read().loaded {
            Ok(())
        } else {
            Err(ConfigError::StoreNotLoaded.into())
        }
    }

    /// Read/write view of a mounted namespace.
    pub fn kv_store(&self, key: &StoreKey) -> Result<KvStore, StoreError> {
        self.ensure_loaded()?;
        let mounts = self.mounts.read();
        let store = mounts
            .get(key)
            .ok_or_else(|| ConfigError::NamespaceNotMounted(key.name().to_string()))?;
        Ok(KvStore::new(Arc::clone(store)))
    }

    /// Flush every namespace and produce the next version.
    #[instrument(skip(self))]
    pub fn commit(&self) -> Result<CommitInfo, StoreError> {
        self.ensure_loaded()?;
        let mut state = self.state.write();

        let mut store_infos = Vec::new();
        for store in self.mounts.read().values() {
            if let Some(info) = store.commit()? {
                store_infos.push(info);
            }
        }

        let mut hasher = Sha256::new();
        for info in &store_infos {
            hasher.update(info.name.as_bytes());
            hasher.update(info.hash);
        }
        let version = state.version + 1;
        let commit = CommitInfo {
            version,
            store_infos,
            app_hash: hasher.finalize().into(),
        };

        self.meta_db.write_batch(vec![
            BatchOperation::put(LATEST_VERSION_KEY.to_vec(), bincode::serialize(&version)?),
            BatchOperation::put(commit_info_key(version), bincode::serialize(&commit)?),
        ])?;

        state.version = version;
        state.last_commit = Some(commit.clone());
        info!(version, app_hash = %commit.app_hash_hex(), "store committed");
        Ok(commit)
    }

    /// Capture the uncommitted writes of every namespace.
    pub fn checkpoint(&self) -> Checkpoint {
        let pending = self
            .mounts
            .read()
            .iter()
            .map(|(key, store)| (key.clone(), store.pending.read().clone()))
            .collect();
        Checkpoint { pending }
    }

    /// Discard every uncommitted write made after `checkpoint`.
    pub fn rollback(&self, checkpoint: Checkpoint) {
        let mut saved = checkpoint.pending;
        for (key, store) in self.mounts.read().iter() {
            *store.pending.write() = saved.remove(key).unwrap_or_default();
        }
        debug!("rolled back uncommitted writes");
    }
}
