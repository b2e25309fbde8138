use lt_01_versioned_store::StoreError;
use lt_02_ledger_modules::ModuleError;
use lt_03_bootstrap::BootstrapError;
use shared_types::ConfigError;
use thiserror::Error;

/// Node-internal failures. A rejected transaction is not one of these.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("genesis failed: {0}")]
    Genesis(ModuleError),

    #[error("block {height} failed: {source}")]
    Block {
        height: u64,
        #[source]
        source: ModuleError,
    },

    #[error("commit failed: {0}")]
    Commit(#[from] StoreError),

    #[error(transparent)]
    Module(#[from] ModuleError),
}
