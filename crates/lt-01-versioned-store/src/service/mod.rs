pub mod kv_store;
pub mod multistore;

pub use kv_store::KvStore;
pub use multistore::{Checkpoint, CommitMultiStore};
