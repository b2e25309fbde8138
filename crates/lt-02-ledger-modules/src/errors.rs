use lt_01_versioned_store::StoreError;
use shared_types::{Address, Capability, CoinsError, ConfigError};
use thiserror::Error;

/// Root codespace shared by every module for generic failures.
pub const ROOT_CODESPACE: &str = "sdk";

/// Errors returned by module operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid coins: {0}")]
    Coins(CoinsError),

    #[error("{address} has insufficient funds: {source}")]
    InsufficientFunds {
        address: Address,
        #[source]
        source: CoinsError,
    },

    #[error("account {0} does not exist")]
    AccountNotFound(Address),

    #[error("module account {0:?} is not registered in the permission table")]
    UnknownModuleAccount(String),

    #[error("module account {module:?} lacks {capability} permission")]
    MissingPermission {
        module: String,
        capability: Capability,
    },

    #[error("{0} is not allowed to receive funds")]
    BlockedAddress(Address),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{module} params are not set")]
    ParamsNotSet { module: &'static str },

    #[error("invalid {module} params: {reason}")]
    InvalidParams { module: &'static str, reason: String },

    #[error("validator {0} does not exist")]
    ValidatorNotFound(Address),

    #[error("validator {0} already exists")]
    ValidatorExists(Address),

    #[error("invalid coin denomination: got {got}, expected {expected}")]
    BadDenom { expected: String, got: String },

    #[error("no delegation from {delegator} to {validator}")]
    DelegationNotFound {
        delegator: Address,
        validator: Address,
    },

    #[error("not enough delegation shares: have {available}, requested {requested}")]
    InsufficientShares { available: u128, requested: u128 },

    #[error("fee allowance from {granter} to {grantee} not found")]
    AllowanceNotFound { granter: Address, grantee: Address },

    #[error("fee allowance from {granter} to {grantee} already exists")]
    AllowanceExists { granter: Address, grantee: Address },

    #[error("fee allowance expired")]
    AllowanceExpired,

    #[error("fee limit exceeded")]
    FeeLimitExceeded,

    #[error("invalid upgrade plan: {0}")]
    InvalidPlan(String),

    #[error("upgrade {0:?} has already been applied")]
    UpgradeAlreadyApplied(String),
}

impl ModuleError {
    /// True for wiring mistakes (use before load, unmounted namespace).
    pub fn is_config(&self) -> bool {
        matches!(self, ModuleError::Store(StoreError::Config(_)))
    }

    /// The configuration error, when this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            ModuleError::Store(StoreError::Config(cfg)) => Some(cfg),
            _ => None,
        }
    }

    pub(crate) fn insufficient(address: Address, err: CoinsError) -> Self {
        match err {
            CoinsError::Insufficient { .. } => ModuleError::InsufficientFunds {
                address,
                source: err,
            },
            other => ModuleError::Coins(other),
        }
    }

    /// `(codespace, code)` a node reports when this error rejects a
    /// transaction.
    pub fn abci_code(&self) -> (&'static str, u32) {
        match self {
            ModuleError::Store(_) => (ROOT_CODESPACE, 1),
            ModuleError::Coins(_) => (ROOT_CODESPACE, 10),
            ModuleError::InsufficientFunds { .. } => (ROOT_CODESPACE, 5),
            ModuleError::AccountNotFound(_) => (ROOT_CODESPACE, 9),
            ModuleError::UnknownModuleAccount(_) => (ROOT_CODESPACE, 9),
            ModuleError::MissingPermission { .. } => (ROOT_CODESPACE, 4),
            ModuleError::BlockedAddress(_) => (ROOT_CODESPACE, 4),
            ModuleError::Unauthorized(_) => (ROOT_CODESPACE, 4),
            ModuleError::InvalidRequest(_) => (ROOT_CODESPACE, 18),
            ModuleError::ParamsNotSet { .. } | ModuleError::InvalidParams { .. } => {
                ("params", 2)
            }
            ModuleError::ValidatorNotFound(_) => ("staking", 3),
            ModuleError::ValidatorExists(_) => ("staking", 4),
            ModuleError::BadDenom { .. } => ("staking", 29),
            ModuleError::DelegationNotFound { .. } => ("staking", 19),
            ModuleError::InsufficientShares { .. } => ("staking", 22),
            ModuleError::FeeLimitExceeded => ("feegrant", 2),
            ModuleError::AllowanceNotFound { .. } => ("feegrant", 3),
            ModuleError::AllowanceExpired => ("feegrant", 4),
            ModuleError::AllowanceExists { .. } => ("feegrant", 5),
            ModuleError::InvalidPlan(_) => ("upgrade", 2),
            ModuleError::UpgradeAlreadyApplied(_) => ("upgrade", 3),
        }
    }
}

impl From<ConfigError> for ModuleError {
    fn from(err: ConfigError) -> Self {
        ModuleError::Store(StoreError::Config(err))
    }
}
