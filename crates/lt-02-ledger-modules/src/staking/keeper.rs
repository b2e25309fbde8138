//! # Staking Keeper
//!
//! Validators, delegations and the two staking pools. Bonded validators keep
//! their tokens in the bonded pool; validators beyond `max_validators` start
//! unbonded and use the not-bonded pool. Undelegation pays out immediately.

use std::sync::Arc;

use lt_01_versioned_store::{KvStore, StoreKey};
use shared_types::{Address, Coin, Coins, BONDED_POOL_NAME, NOT_BONDED_POOL_NAME};
use tracing::{debug, info, instrument};

use crate::auth::AccountKeeper;
use crate::bank::BankKeeper;
use crate::context::ExecutionContext;
use crate::errors::ModuleError;
use crate::events::{event_types, Event};
use crate::staking::types::{
    BondStatus, Delegation, MsgCreateValidator, MsgDelegate, MsgUndelegate, Params, Validator,
    BPS_DENOMINATOR,
};

pub const STORE_KEY: &str = "staking";

const PARAMS_KEY: &[u8] = b"p";
const VALIDATOR_PREFIX: &[u8] = b"v/";
const DELEGATION_PREFIX: &[u8] = b"d/";

/// Staking module. Depends on the account and bank keepers.
pub struct StakingKeeper {
    store_key: StoreKey,
    accounts: Arc<AccountKeeper>,
    bank: Arc<BankKeeper>,
    authority: Address,
}

fn pool_for(status: BondStatus) -> &'static str {
    match status {
        BondStatus::Bonded => BONDED_POOL_NAME,
        BondStatus::Unbonded => NOT_BONDED_POOL_NAME,
    }
}

fn delegation_key(delegator: &Address, validator: &Address) -> Vec<u8> {
    let mut key = delegator.as_bytes().to_vec();
    key.extend_from_slice(validator.as_bytes());
    key
}

impl StakingKeeper {
    pub fn new(
        store_key: StoreKey,
        accounts: Arc<AccountKeeper>,
        bank: Arc<BankKeeper>,
        authority: Address,
    ) -> Self {
        Self {
            store_key,
            accounts,
            bank,
            authority,
        }
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    fn kv(&self, ctx: &ExecutionContext) -> Result<KvStore, ModuleError> {
        ctx.kv_store(&self.store_key)
    }

    // ---------------------------------------------------------------------
    // Params
    // ---------------------------------------------------------------------

    pub fn set_params(&self, ctx: &ExecutionContext, params: &Params) -> Result<(), ModuleError> {
        params
            .validate()
            .map_err(|reason| ModuleError::InvalidParams {
                module: "staking",
                reason,
            })?;
        self.kv(ctx)?.set_value(PARAMS_KEY, params)?;
        info!(bond_denom = %params.bond_denom, max_validators = params.max_validators, "staking params set");
        Ok(())
    }

    /// `set_params` on behalf of `signer`, which must be the module authority.
    pub fn update_params(&self, ctx: &ExecutionContext, signer: &Address, params: &Params) -> Result<(), ModuleError> {
        if *signer != self.authority {
            return Err(ModuleError::Unauthorized(format!(
                "expected {} as staking authority, got {}",
                self.authority, signer
            )));
        }
        self.set_params(ctx, params)
    }

    pub fn get_params(&self, ctx: &ExecutionContext) -> Result<Params, ModuleError> {
        self.kv(ctx)?
            .get_value(PARAMS_KEY)?
            .ok_or(ModuleError::ParamsNotSet { module: "staking" })
    }

    pub fn bond_denom(&self, ctx: &ExecutionContext) -> Result<String, ModuleError> {
        Ok(self.get_params(ctx)?.bond_denom)
    }

    // ---------------------------------------------------------------------
    // Validators
    // ---------------------------------------------------------------------

    pub fn get_validator(&self, ctx: &ExecutionContext, operator: &Address) -> Result<Option<Validator>, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(VALIDATOR_PREFIX)
            .get_value(operator.as_bytes())?)
    }

    fn set_validator(&self, ctx: &ExecutionContext, validator: &Validator) -> Result<(), ModuleError> {
        self.kv(ctx)?
            .prefixed(VALIDATOR_PREFIX)
            .set_value(validator.operator_address.as_bytes(), validator)?;
        Ok(())
    }

    /// All validators, ordered by operator address.
    pub fn validators(&self, ctx: &ExecutionContext) -> Result<Vec<Validator>, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(VALIDATOR_PREFIX)
            .scan_values::<Validator>(b"")?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    pub fn bonded_validators(&self, ctx: &ExecutionContext) -> Result<Vec<Validator>, ModuleError> {
        Ok(self
            .validators(ctx)?
            .into_iter()
            .filter(Validator::is_bonded)
            .collect())
    }

    /// Bond-denom balance of the bonded pool.
    pub fn total_bonded_tokens(&self, ctx: &ExecutionContext) -> Result<u128, ModuleError> {
        let denom = self.bond_denom(ctx)?;
        let pool = self.accounts.get_module_account(ctx, BONDED_POOL_NAME)?;
        Ok(self.bank.get_balance(ctx, &pool.address(), &denom)?.amount)
    }

    #[instrument(skip(self, ctx, msg), fields(validator = %msg.validator_address))]
    pub fn create_validator(&self, ctx: &ExecutionContext, msg: &MsgCreateValidator) -> Result<Vec<Event>, ModuleError> {
        let params = self.get_params(ctx)?;
        if self.get_validator(ctx, &msg.validator_address)?.is_some() {
            return Err(ModuleError::ValidatorExists(msg.validator_address));
        }
        if msg.value.denom != params.bond_denom {
            return Err(ModuleError::BadDenom {
                expected: params.bond_denom,
                got: msg.value.denom.clone(),
            });
        }
        if msg.commission_rate_bps > BPS_DENOMINATOR
            || msg.commission_rate_bps < params.min_commission_rate_bps
        {
            return Err(ModuleError::InvalidRequest(format!(
                "commission rate {} bps outside [{}, {}]",
                msg.commission_rate_bps, params.min_commission_rate_bps, BPS_DENOMINATOR
            )));
        }
        if msg.value.amount == 0 || msg.value.amount < msg.min_self_delegation {
            return Err(ModuleError::InvalidRequest(
                "self delegation below minimum".into(),
            ));
        }

        let bonded = self.bonded_validators(ctx)?.len() as u32;
        let status = if bonded < params.max_validators {
            BondStatus::Bonded
        } else {
            BondStatus::Unbonded
        };
        let validator = Validator {
            operator_address: msg.validator_address,
            consensus_pubkey: msg.pubkey.clone(),
            description: msg.description.clone(),
            status,
            tokens: 0,
            delegator_shares: 0,
            commission_rate_bps: msg.commission_rate_bps,
            min_self_delegation: msg.min_self_delegation,
        };
        self.set_validator(ctx, &validator)?;

        let mut events = vec![Event::new(event_types::CREATE_VALIDATOR)
            .attr("validator", msg.validator_address)
            .attr("amount", &msg.value)];
        events.extend(self.delegate(ctx, &msg.validator_address, &msg.validator_address, &msg.value)?);
        info!(moniker = %msg.description.moniker, ?status, "validator created");
        Ok(events)
    }

    // ---------------------------------------------------------------------
    // Delegations
    // ---------------------------------------------------------------------

    pub fn get_delegation(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Option<Delegation>, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(DELEGATION_PREFIX)
            .get_value(delegation_key(delegator, validator))?)
    }

    fn set_delegation(&self, ctx: &ExecutionContext, delegation: &Delegation) -> Result<(), ModuleError> {
        let key = delegation_key(&delegation.delegator_address, &delegation.validator_address);
        let kv = self.kv(ctx)?.prefixed(DELEGATION_PREFIX);
        if delegation.shares == 0 {
            kv.delete(key);
        } else {
            kv.set_value(key, delegation)?;
        }
        Ok(())
    }

    pub fn delegator_delegations(&self, ctx: &ExecutionContext, delegator: &Address) -> Result<Vec<Delegation>, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(DELEGATION_PREFIX)
            .scan_values::<Delegation>(delegator.as_bytes())?
            .into_iter()
            .map(|(_, d)| d)
            .collect())
    }

    pub fn validator_delegations(&self, ctx: &ExecutionContext, validator: &Address) -> Result<Vec<Delegation>, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(DELEGATION_PREFIX)
            .scan_values::<Delegation>(b"")?
            .into_iter()
            .map(|(_, d)| d)
            .filter(|d| d.validator_address == *validator)
            .collect())
    }

    /// Bond `amount` from `delegator` to `validator`.
    pub fn delegate(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
        amount: &Coin,
    ) -> Result<Vec<Event>, ModuleError> {
        let bond_denom = self.bond_denom(ctx)?;
        if amount.denom != bond_denom {
            return Err(ModuleError::BadDenom {
                expected: bond_denom,
                got: amount.denom.clone(),
            });
        }
        if amount.is_zero() {
            return Err(ModuleError::InvalidRequest("delegation amount must be positive".into()));
        }
        let mut val = self
            .get_validator(ctx, validator)?
            .ok_or(ModuleError::ValidatorNotFound(*validator))?;

        let mut events = self.bank.delegate_coins_from_account_to_module(
            ctx,
            delegator,
            pool_for(val.status),
            &Coins::from(amount.clone()),
        )?;

        let shares = val.shares_from_tokens(amount.amount).map_err(ModuleError::Coins)?;
        val.tokens += amount.amount;
        val.delegator_shares += shares;
        self.set_validator(ctx, &val)?;

        let mut delegation = self
            .get_delegation(ctx, delegator, validator)?
            .unwrap_or(Delegation {
                delegator_address: *delegator,
                validator_address: *validator,
                shares: 0,
            });
        delegation.shares += shares;
        self.set_delegation(ctx, &delegation)?;
        debug!(%delegator, %validator, shares, "delegated");

        events.push(
            Event::new(event_types::DELEGATE)
                .attr("validator", validator)
                .attr("delegator", delegator)
                .attr("amount", amount)
                .attr("new_shares", shares),
        );
        Ok(events)
    }

    /// Unbond `amount` tokens and pay them out right away.
    pub fn undelegate(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
        amount: &Coin,
    ) -> Result<Vec<Event>, ModuleError> {
        let bond_denom = self.bond_denom(ctx)?;
        if amount.denom != bond_denom {
            return Err(ModuleError::BadDenom {
                expected: bond_denom,
                got: amount.denom.clone(),
            });
        }
        let mut val = self
            .get_validator(ctx, validator)?
            .ok_or(ModuleError::ValidatorNotFound(*validator))?;
        let mut delegation = self
            .get_delegation(ctx, delegator, validator)?
            .ok_or(ModuleError::DelegationNotFound {
                delegator: *delegator,
                validator: *validator,
            })?;

        let shares = val.shares_from_tokens(amount.amount).map_err(ModuleError::Coins)?;
        if shares == 0 || shares > delegation.shares {
            return Err(ModuleError::InsufficientShares {
                available: delegation.shares,
                requested: shares,
            });
        }
        let tokens = val.tokens_from_shares(shares).map_err(ModuleError::Coins)?;

        delegation.shares -= shares;
        self.set_delegation(ctx, &delegation)?;
        val.tokens -= tokens;
        val.delegator_shares -= shares;
        self.set_validator(ctx, &val)?;

        let returned = Coins::single(bond_denom.clone(), tokens);
        let mut events =
            self.bank
                .undelegate_coins_from_module_to_account(ctx, pool_for(val.status), delegator, &returned)?;
        debug!(%delegator, %validator, tokens, "undelegated");

        events.push(
            Event::new(event_types::UNBOND)
                .attr("validator", validator)
                .attr("delegator", delegator)
                .attr("amount", Coin::new(bond_denom, tokens))
                .attr("completion_time", ctx.block_time().to_rfc3339()),
        );
        Ok(events)
    }

    // ---------------------------------------------------------------------
    // Message handlers
    // ---------------------------------------------------------------------

    pub fn handle_create_validator(&self, ctx: &ExecutionContext, msg: &MsgCreateValidator) -> Result<Vec<Event>, ModuleError> {
        self.create_validator(ctx, msg)
    }

    pub fn handle_delegate(&self, ctx: &ExecutionContext, msg: &MsgDelegate) -> Result<Vec<Event>, ModuleError> {
        self.delegate(ctx, &msg.delegator_address, &msg.validator_address, &msg.amount)
    }

    pub fn handle_undelegate(&self, ctx: &ExecutionContext, msg: &MsgUndelegate) -> Result<Vec<Event>, ModuleError> {
        self.undelegate(ctx, &msg.delegator_address, &msg.validator_address, &msg.amount)
    }
}
