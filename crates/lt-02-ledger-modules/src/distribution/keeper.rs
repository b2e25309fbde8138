//! # Distribution Keeper
//!
//! Routes collected fees to the community pool and to bonded validators by
//! voting power, and pays delegators their share of a validator's
//! outstanding rewards.
//!
//! Each allocation is credited to the validator's delegations right away,
//! split by the shares they hold at that block. A withdrawal pays exactly
//! what was credited to that delegation, so the order in which delegators
//! withdraw does not change what each receives. Rounding dust goes to the
//! community pool.

use std::sync::Arc;

use lt_01_versioned_store::{KvStore, StoreKey};
use shared_types::{Address, Coins, DISTRIBUTION_MODULE_NAME};
use tracing::{debug, info, instrument};

use crate::auth::AccountKeeper;
use crate::bank::BankKeeper;
use crate::context::ExecutionContext;
use crate::distribution::types::{
    FeePool, MsgFundCommunityPool, MsgSetWithdrawAddress, MsgWithdrawDelegatorReward, Params,
};
use crate::errors::ModuleError;
use crate::events::{event_types, Event};
use crate::staking::{StakingKeeper, Validator, BPS_DENOMINATOR};

pub const STORE_KEY: &str = "distribution";

const PARAMS_KEY: &[u8] = b"p";
const FEE_POOL_KEY: &[u8] = b"f";
const OUTSTANDING_PREFIX: &[u8] = b"r/";
const WITHDRAW_ADDR_PREFIX: &[u8] = b"w/";
const ACCRUED_PREFIX: &[u8] = b"a/";

/// Reward distribution. Depends on the account, bank and staking keepers.
pub struct DistributionKeeper {
    store_key: StoreKey,
    accounts: Arc<AccountKeeper>,
    bank: Arc<BankKeeper>,
    staking: Arc<StakingKeeper>,
    fee_collector_name: String,
    authority: Address,
}

impl DistributionKeeper {
    pub fn new(
        store_key: StoreKey,
        accounts: Arc<AccountKeeper>,
        bank: Arc<BankKeeper>,
        staking: Arc<StakingKeeper>,
        fee_collector_name: impl Into<String>,
        authority: Address,
    ) -> Self {
        Self {
            store_key,
            accounts,
            bank,
            staking,
            fee_collector_name: fee_collector_name.into(),
            authority,
        }
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    pub fn fee_collector_name(&self) -> &str {
        &self.fee_collector_name
    }

    fn kv(&self, ctx: &ExecutionContext) -> Result<KvStore, ModuleError> {
        ctx.kv_store(&self.store_key)
    }

    pub fn set_params(&self, ctx: &ExecutionContext, params: &Params) -> Result<(), ModuleError> {
        params
            .validate()
            .map_err(|reason| ModuleError::InvalidParams {
                module: "distribution",
                reason,
            })?;
        self.kv(ctx)?.set_value(PARAMS_KEY, params)?;
        info!(community_tax_bps = params.community_tax_bps, "distribution params set");
        Ok(())
    }

    /// `set_params` on behalf of `signer`, which must be the module authority.
    pub fn update_params(&self, ctx: &ExecutionContext, signer: &Address, params: &Params) -> Result<(), ModuleError> {
        if *signer != self.authority {
            return Err(ModuleError::Unauthorized(format!(
                "expected {} as distribution authority, got {}",
                self.authority, signer
            )));
        }
        self.set_params(ctx, params)
    }

    pub fn get_params(&self, ctx: &ExecutionContext) -> Result<Params, ModuleError> {
        self.kv(ctx)?
            .get_value(PARAMS_KEY)?
            .ok_or(ModuleError::ParamsNotSet {
                module: "distribution",
            })
    }

    pub fn get_fee_pool(&self, ctx: &ExecutionContext) -> Result<FeePool, ModuleError> {
        Ok(self.kv(ctx)?.get_value(FEE_POOL_KEY)?.unwrap_or_default())
    }

    fn set_fee_pool(&self, ctx: &ExecutionContext, pool: &FeePool) -> Result<(), ModuleError> {
        self.kv(ctx)?.set_value(FEE_POOL_KEY, pool)?;
        Ok(())
    }

    fn add_to_community_pool(&self, ctx: &ExecutionContext, amount: &Coins) -> Result<(), ModuleError> {
        let mut pool = self.get_fee_pool(ctx)?;
        pool.community_pool = pool
            .community_pool
            .checked_add(amount)
            .map_err(ModuleError::Coins)?;
        self.set_fee_pool(ctx, &pool)
    }

    /// Deposit into the community pool.
    pub fn fund_community_pool(
        &self,
        ctx: &ExecutionContext,
        amount: &Coins,
        depositor: &Address,
    ) -> Result<Vec<Event>, ModuleError> {
        let events =
            self.bank
                .send_coins_from_account_to_module(ctx, depositor, DISTRIBUTION_MODULE_NAME, amount)?;
        self.add_to_community_pool(ctx, amount)?;
        Ok(events)
    }

    pub fn validator_outstanding_rewards(&self, ctx: &ExecutionContext, validator: &Address) -> Result<Coins, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(OUTSTANDING_PREFIX)
            .get_value(validator.as_bytes())?
            .unwrap_or_default())
    }

    fn set_outstanding_rewards(&self, ctx: &ExecutionContext, validator: &Address, rewards: &Coins) -> Result<(), ModuleError> {
        let kv = self.kv(ctx)?.prefixed(OUTSTANDING_PREFIX);
        if rewards.is_empty() {
            kv.delete(validator.as_bytes());
        } else {
            kv.set_value(validator.as_bytes(), rewards)?;
        }
        Ok(())
    }

    fn accrued_store(&self, ctx: &ExecutionContext, validator: &Address) -> Result<KvStore, ModuleError> {
        Ok(self.kv(ctx)?.prefixed(ACCRUED_PREFIX).prefixed(validator.as_bytes()))
    }

    /// Credit `reward` to the delegations of `validator` by shares. Returns
    /// the amount actually credited.
    fn accrue_to_delegators(
        &self,
        ctx: &ExecutionContext,
        validator: &Validator,
        reward: &Coins,
    ) -> Result<Coins, ModuleError> {
        let accrued = self.accrued_store(ctx, &validator.operator_address)?;
        let mut credited = Coins::empty();
        for delegation in self.staking.validator_delegations(ctx, &validator.operator_address)? {
            let share = reward
                .mul_ratio_floor(delegation.shares, validator.delegator_shares)
                .map_err(ModuleError::Coins)?;
            if share.is_empty() {
                continue;
            }
            let key = delegation.delegator_address.as_bytes();
            let prior: Option<Coins> = accrued.get_value(key)?;
            let total = prior
                .unwrap_or_default()
                .checked_add(&share)
                .map_err(ModuleError::Coins)?;
            accrued.set_value(key, &total)?;
            credited = credited.checked_add(&share).map_err(ModuleError::Coins)?;
        }
        Ok(credited)
    }

    /// Move everything the fee collector holds into distribution.
    ///
    /// The community tax goes to the community pool; the rest is split
    /// across bonded validators by tokens and credited to their
    /// delegations. Returns the total collected.
    #[instrument(skip(self, ctx))]
    pub fn allocate_tokens(&self, ctx: &ExecutionContext) -> Result<Coins, ModuleError> {
        let fee_collector = self.accounts.get_module_account(ctx, &self.fee_collector_name)?;
        let collected = self.bank.get_all_balances(ctx, &fee_collector.address())?;
        if collected.is_empty() {
            return Ok(collected);
        }
        self.bank.send_coins_from_module_to_module(
            ctx,
            &self.fee_collector_name,
            DISTRIBUTION_MODULE_NAME,
            &collected,
        )?;

        let params = self.get_params(ctx)?;
        let tax = collected
            .mul_ratio_floor(u128::from(params.community_tax_bps), u128::from(BPS_DENOMINATOR))
            .map_err(ModuleError::Coins)?;
        let for_validators = collected.checked_sub(&tax).map_err(ModuleError::Coins)?;

        let validators = self.staking.bonded_validators(ctx)?;
        let total_power: u128 = validators.iter().map(|v| v.tokens).sum();
        let mut distributed = Coins::empty();
        if total_power > 0 {
            for validator in &validators {
                let reward = for_validators
                    .mul_ratio_floor(validator.tokens, total_power)
                    .map_err(ModuleError::Coins)?;
                if reward.is_empty() {
                    continue;
                }
                let credited = self.accrue_to_delegators(ctx, validator, &reward)?;
                let outstanding = self
                    .validator_outstanding_rewards(ctx, &validator.operator_address)?
                    .checked_add(&credited)
                    .map_err(ModuleError::Coins)?;
                self.set_outstanding_rewards(ctx, &validator.operator_address, &outstanding)?;
                distributed = distributed.checked_add(&credited).map_err(ModuleError::Coins)?;
            }
        }

        let to_community = collected
            .checked_sub(&distributed)
            .map_err(ModuleError::Coins)?;
        self.add_to_community_pool(ctx, &to_community)?;
        debug!(%collected, %distributed, community = %to_community, "fees allocated");
        Ok(collected)
    }

    /// Rewards `delegator` could withdraw from `validator` right now.
    ///
    /// Credits survive a full undelegation; the delegation only has to
    /// exist when nothing has been credited.
    pub fn delegation_rewards(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, ModuleError> {
        if self.staking.get_validator(ctx, validator)?.is_none() {
            return Err(ModuleError::ValidatorNotFound(*validator));
        }
        let accrued: Option<Coins> = self.accrued_store(ctx, validator)?.get_value(delegator.as_bytes())?;
        if let Some(accrued) = accrued {
            return Ok(accrued);
        }
        match self.staking.get_delegation(ctx, delegator, validator)? {
            Some(_) => Ok(Coins::empty()),
            None => Err(ModuleError::DelegationNotFound {
                delegator: *delegator,
                validator: *validator,
            }),
        }
    }

    /// Pay out delegation rewards to the delegator's withdraw address.
    pub fn withdraw_delegation_rewards(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
    ) -> Result<(Coins, Vec<Event>), ModuleError> {
        let rewards = self.delegation_rewards(ctx, delegator, validator)?;
        let mut events = Vec::new();
        if !rewards.is_empty() {
            self.accrued_store(ctx, validator)?.delete(delegator.as_bytes());
            let remaining = self
                .validator_outstanding_rewards(ctx, validator)?
                .checked_sub(&rewards)
                .map_err(ModuleError::Coins)?;
            self.set_outstanding_rewards(ctx, validator, &remaining)?;
            let recipient = self.get_withdraw_address(ctx, delegator)?;
            events.extend(self.bank.send_coins_from_module_to_account(
                ctx,
                DISTRIBUTION_MODULE_NAME,
                &recipient,
                &rewards,
            )?);
        }
        events.push(
            Event::new(event_types::WITHDRAW_REWARDS)
                .attr("amount", &rewards)
                .attr("validator", validator)
                .attr("delegator", delegator),
        );
        Ok((rewards, events))
    }

    /// Where rewards of `delegator` are paid. Defaults to the delegator.
    pub fn get_withdraw_address(&self, ctx: &ExecutionContext, delegator: &Address) -> Result<Address, ModuleError> {
        Ok(self
            .kv(ctx)?
            .prefixed(WITHDRAW_ADDR_PREFIX)
            .get_value(delegator.as_bytes())?
            .unwrap_or(*delegator))
    }

    pub fn set_withdraw_address(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        withdraw: &Address,
    ) -> Result<Vec<Event>, ModuleError> {
        if self.bank.is_blocked(withdraw) {
            return Err(ModuleError::BlockedAddress(*withdraw));
        }
        if !self.get_params(ctx)?.withdraw_addr_enabled {
            return Err(ModuleError::InvalidRequest(
                "set withdraw address disabled".into(),
            ));
        }
        self.kv(ctx)?
            .prefixed(WITHDRAW_ADDR_PREFIX)
            .set_value(delegator.as_bytes(), withdraw)?;
        Ok(vec![Event::new(event_types::SET_WITHDRAW_ADDRESS)
            .attr("withdraw_address", withdraw)])
    }

    pub fn handle_withdraw_delegator_reward(
        &self,
        ctx: &ExecutionContext,
        msg: &MsgWithdrawDelegatorReward,
    ) -> Result<Vec<Event>, ModuleError> {
        let (_, events) =
            self.withdraw_delegation_rewards(ctx, &msg.delegator_address, &msg.validator_address)?;
        Ok(events)
    }

    pub fn handle_set_withdraw_address(&self, ctx: &ExecutionContext, msg: &MsgSetWithdrawAddress) -> Result<Vec<Event>, ModuleError> {
        self.set_withdraw_address(ctx, &msg.delegator_address, &msg.withdraw_address)
    }

    pub fn handle_fund_community_pool(&self, ctx: &ExecutionContext, msg: &MsgFundCommunityPool) -> Result<Vec<Event>, ModuleError> {
        self.fund_community_pool(ctx, &msg.amount, &msg.depositor)
    }
}
