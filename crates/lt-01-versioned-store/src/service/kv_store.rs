//! Prefix views over a mounted namespace.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{StoreError, StoreKey};
use crate::service::multistore::MountedStore;

/// Read/write handle on one namespace, optionally narrowed to a key prefix.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Clone)]
pub struct KvStore {
    store: Arc<MountedStore>,
    prefix: Vec<u8>,
}

impl KvStore {
    pub(crate) fn new(store: Arc<MountedStore>) -> Self {
        Self {
            store,
            prefix: Vec::new(),
        }
    }

    /// Namespace this view belongs to.
    pub fn store_key(&self) -> &StoreKey {
        &self.store.key
    }

    /// Narrower view: every key is implicitly prefixed by `prefix`.
    pub fn prefixed(&self, prefix: impl AsRef<[u8]>) -> KvStore {
        let mut full = self.prefix.clone();
        full.extend_from_slice(prefix.as_ref());
        Self {
            store: Arc::clone(&self.store),
            prefix: full,
        }
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = self.prefix.clone();
        full.extend_from_slice(key);
        full
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.get(&self.full_key(key.as_ref()))
    }

    pub fn has(&self, key: impl AsRef<[u8]>) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    pub fn set(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        self.store
            .set(self.full_key(key.as_ref()), value.as_ref().to_vec());
    }

    pub fn delete(&self, key: impl AsRef<[u8]>) {
        self.store.delete(self.full_key(key.as_ref()));
    }

    /// Pairs under `prefix` (relative to this view), sorted by key. Returned
    /// keys are relative to this view.
    pub fn scan(&self, prefix: impl AsRef<[u8]>) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let strip = self.prefix.len();
        Ok(self
            .store
            .scan(&self.full_key(prefix.as_ref()))?
            .into_iter()
            .map(|(k, v)| (k[strip..].to_vec(), v))
            .collect())
    }

    /// Decode a bincode value.
    pub fn get_value<T: DeserializeOwned>(
        &self,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<T>, StoreError> {
        self.get(key)?
            .map(|bytes| bincode::deserialize(&bytes).map_err(StoreError::from))
            .transpose()
    }

    /// Encode `value` with bincode and store it.
    pub fn set_value<T: Serialize>(&self, key: impl AsRef<[u8]>, value: &T) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value)?;
        self.set(key, bytes);
        Ok(())
    }

    /// Decode every value under `prefix`.
    pub fn scan_values<T: DeserializeOwned>(
        &self,
        prefix: impl AsRef<[u8]>,
    ) -> Result<Vec<(Vec<u8>, T)>, StoreError> {
        self.scan(prefix)?
            .into_iter()
            .map(|(k, v)| Ok((k, bincode::deserialize(&v)?)))
            .collect()
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("store", &self.store.key)
            .field("prefix", &hex::encode(&self.prefix))
            .finish()
    }
}
