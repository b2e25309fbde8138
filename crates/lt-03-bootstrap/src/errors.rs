use lt_01_versioned_store::StoreError;
use shared_types::ConfigError;
use thiserror::Error;

/// Failures while wiring the ledger.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("store error during bootstrap: {0}")]
    Store(StoreError),
}

impl From<StoreError> for BootstrapError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config(cfg) => BootstrapError::Config(cfg),
            other => BootstrapError::Store(other),
        }
    }
}
