use serde::{Deserialize, Serialize};
use shared_types::{Address, Coin, CoinsError};

/// Denomination staked by default.
pub const DEFAULT_BOND_DENOM: &str = "stake";

/// 21 days.
pub const DEFAULT_UNBONDING_TIME_SECS: u64 = 60 * 60 * 24 * 21;

/// Basis-point denominator (100% = 10_000 bps).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Staking protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub unbonding_time_secs: u64,
    pub max_validators: u32,
    pub max_entries: u32,
    pub historical_entries: u32,
    pub bond_denom: String,
    pub min_commission_rate_bps: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            unbonding_time_secs: DEFAULT_UNBONDING_TIME_SECS,
            max_validators: 100,
            max_entries: 7,
            historical_entries: 10_000,
            bond_denom: DEFAULT_BOND_DENOM.to_string(),
            min_commission_rate_bps: 0,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), String> {
        if self.unbonding_time_secs == 0 {
            return Err("unbonding time must be positive".into());
        }
        if self.max_validators == 0 {
            return Err("max validators must be positive".into());
        }
        if self.max_entries == 0 {
            return Err("max entries must be positive".into());
        }
        if self.bond_denom.trim().is_empty() {
            return Err("bond denom cannot be blank".into());
        }
        if self.min_commission_rate_bps > BPS_DENOMINATOR {
            return Err("minimum commission rate cannot exceed 100%".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondStatus {
    Bonded,
    Unbonded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub moniker: String,
    pub website: String,
    pub details: String,
}

impl Description {
    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Self::default()
        }
    }
}

/// A validator. Operator address doubles as the self-delegator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: Address,
    pub consensus_pubkey: Vec<u8>,
    pub description: Description,
    pub status: BondStatus,
    pub tokens: u128,
    pub delegator_shares: u128,
    pub commission_rate_bps: u32,
    pub min_self_delegation: u128,
}

impl Validator {
    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    /// Shares issued for `amount` tokens.
    pub fn shares_from_tokens(&self, amount: u128) -> Result<u128, CoinsError> {
        if self.tokens == 0 || self.delegator_shares == 0 {
            return Ok(amount);
        }
        amount
            .checked_mul(self.delegator_shares)
            .map(|product| product / self.tokens)
            .ok_or(CoinsError::Overflow)
    }

    /// Tokens redeemed by `shares`.
    pub fn tokens_from_shares(&self, shares: u128) -> Result<u128, CoinsError> {
        if self.delegator_shares == 0 {
            return Ok(0);
        }
        shares
            .checked_mul(self.tokens)
            .map(|product| product / self.delegator_shares)
            .ok_or(CoinsError::Overflow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub shares: u128,
}

/// Register a validator with an initial self-delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateValidator {
    pub description: Description,
    pub commission_rate_bps: u32,
    pub min_self_delegation: u128,
    pub validator_address: Address,
    pub pubkey: Vec<u8>,
    pub value: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegate {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub amount: Coin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUndelegate {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub amount: Coin,
}
