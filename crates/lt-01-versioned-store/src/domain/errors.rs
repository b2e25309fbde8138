use shared_types::ConfigError;
use thiserror::Error;

/// Errors surfaced by store reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store was wired incorrectly (double mount, use before load, ...).
    #[error("store configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A stored value could not be encoded or decoded.
    #[error("store codec error: {0}")]
    Codec(String),

    /// The backing database failed.
    #[error("backing database error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True for wiring mistakes that should abort the test.
    pub fn is_config(&self) -> bool {
        matches!(self, StoreError::Config(_))
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: StoreError = ConfigError::StoreNotLoaded.into();
        assert!(err.is_config());
        assert!(err.to_string().contains("load_latest_version"));
    }
}
