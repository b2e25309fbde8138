//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Harness-setup bugs.
///
/// These are never recoverable: continuing after one guarantees incoherent
/// state, so callers abort the test when they see one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A store namespace was mounted twice.
    #[error("store namespace {0:?} is already mounted")]
    NamespaceAlreadyMounted(String),

    /// Namespace name is empty or contains `/`.
    #[error("invalid store namespace name {0:?}")]
    InvalidNamespace(String),

    /// A namespace was mounted after the store was loaded.
    #[error("cannot mount namespace {0:?} after the store has been loaded")]
    MountAfterLoad(String),

    /// The store was used before `load_latest_version`.
    #[error("store used before load_latest_version")]
    StoreNotLoaded,

    /// `load_latest_version` was called twice.
    #[error("store already loaded")]
    StoreAlreadyLoaded,

    /// Namespace was never mounted.
    #[error("store namespace {0:?} is not mounted")]
    NamespaceNotMounted(String),

    /// Broadcast mode value outside sync/async/commit.
    #[error("unsupported broadcast mode {0:?}")]
    UnsupportedBroadcastMode(String),

    /// Default protocol parameters could not be applied.
    #[error("failed to apply default {module} params: {reason}")]
    DefaultParams {
        /// Module whose params failed.
        module: String,
        /// Underlying error.
        reason: String,
    },

    /// Network configuration rejected by validation.
    #[error("invalid network config: {0}")]
    InvalidNetworkConfig(String),
}

/// Coin arithmetic and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinsError {
    /// Subtraction would go negative.
    #[error("insufficient {denom}: available {available}, required {required}")]
    Insufficient {
        /// Denomination short.
        denom: String,
        /// Amount held.
        available: u128,
        /// Amount needed.
        required: u128,
    },

    /// Addition overflowed u128.
    #[error("coin amount overflow")]
    Overflow,

    /// Denomination failed validation.
    #[error("invalid denom {0:?}")]
    InvalidDenom(String),

    /// Coin string could not be parsed.
    #[error("cannot parse coins from {0:?}")]
    Parse(String),
}
