//! # Bootstrap Configuration
//!
//! Options for a single bootstrap call and the parameters of the validator
//! network the transaction pipeline drives.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use shared_types::{Capability, ConfigError, PermissionTable};

/// Block height of the context returned by `bootstrap`.
pub const EXAMPLE_HEIGHT: u64 = 1111;

/// Chain id of the bootstrapped context and the default network.
pub const DEFAULT_CHAIN_ID: &str = "ledger-testkit-1";

/// Default staking denomination.
pub const DEFAULT_BOND_DENOM: &str = "stake";

/// Min gas price is expressed in millionths of the bond denom per gas unit.
pub const GAS_PRICE_SCALE: u128 = 1_000_000;

/// Tokens per unit of consensus power.
pub const POWER_REDUCTION: u128 = 1_000_000;

/// Block time of the context returned by `bootstrap`: 2020-01-01 12:00 UTC.
pub fn example_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Tokens for `power` units of consensus power.
pub fn tokens_from_consensus_power(power: u64) -> u128 {
    u128::from(power) * POWER_REDUCTION
}

/// Options for one bootstrap call.
///
/// Every call starts from [`PermissionTable::default_base`] and merges the
/// additional entries into a fresh copy.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Module accounts registered on top of the base table.
    pub additional_permissions: PermissionTable,
    /// Heights at which a scheduled upgrade is skipped.
    pub upgrade_skip_heights: BTreeSet<u64>,
}

impl BootstrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register extra module accounts.
    pub fn with_additional_module_accounts(mut self, permissions: PermissionTable) -> Self {
        self.additional_permissions.merge(&permissions);
        self
    }

    /// Register one extra module account.
    pub fn with_module_account(
        mut self,
        name: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.additional_permissions = self.additional_permissions.with(name, capabilities);
        self
    }

    pub fn with_upgrade_skip_heights(mut self, heights: impl IntoIterator<Item = u64>) -> Self {
        self.upgrade_skip_heights.extend(heights);
        self
    }
}

/// Validator network parameters.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub chain_id: String,
    pub bond_denom: String,
    /// Millionths of `bond_denom` charged per gas unit.
    pub min_gas_price: u128,
    /// Genesis balance of every validator account in its own
    /// `node<i>token` denom.
    pub account_tokens: u128,
    /// Genesis balance of every validator account in `bond_denom`.
    pub staking_tokens: u128,
    /// Amount each validator actually bonds at genesis.
    pub bonded_tokens: u128,
    /// Block interval in seconds.
    pub timeout_commit_secs: u64,
    pub num_validators: usize,
    pub signing_algo: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
            min_gas_price: 6, // 0.000006stake
            account_tokens: tokens_from_consensus_power(1000),
            staking_tokens: tokens_from_consensus_power(500),
            bonded_tokens: tokens_from_consensus_power(100),
            timeout_commit_secs: 2,
            num_validators: 1,
            signing_algo: "secp256k1".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Minimum fee, in `bond_denom`, for a transaction with `gas_limit`.
    /// Rounds up.
    pub fn min_fee(&self, gas_limit: u64) -> u128 {
        (u128::from(gas_limit) * self.min_gas_price).div_ceil(GAS_PRICE_SCALE)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::InvalidNetworkConfig(reason));
        if self.chain_id.trim().is_empty() {
            return invalid("chain id is empty".into());
        }
        if self.num_validators == 0 {
            return invalid("at least one validator is required".into());
        }
        if self.signing_algo != "secp256k1" {
            return invalid(format!("unsupported signing algorithm {:?}", self.signing_algo));
        }
        if self.bond_denom.len() < 3 || !self.bond_denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return invalid(format!("invalid bond denom {:?}", self.bond_denom));
        }
        if self.bonded_tokens == 0 {
            return invalid("bonded tokens must be positive".into());
        }
        if self.bonded_tokens > self.staking_tokens {
            return invalid(format!(
                "bonded tokens {} exceed staking tokens {}",
                self.bonded_tokens, self.staking_tokens
            ));
        }
        if self.staking_tokens > self.account_tokens {
            return invalid(format!(
                "staking tokens {} exceed account tokens {}",
                self.staking_tokens, self.account_tokens
            ));
        }
        Ok(())
    }
}
