//! The wired keeper set returned by `bootstrap`.

use std::sync::Arc;

use lt_02_ledger_modules::upgrade::PlanStatus;
use lt_02_ledger_modules::{
    AccountKeeper, AccountQuery, BalanceQuery, BankKeeper, DistributionKeeper, DistributionQuery,
    Event, ExecutionContext, FeeGrantKeeper, FeeGrantQuery, ModuleError, Msg, StakeQuery,
    StakingKeeper, UpgradeKeeper, UpgradeQuery,
};
use shared_types::{Address, Coins, MINT_MODULE_NAME};
use tracing::{debug, info, instrument, warn};

use crate::initializer::Initializer;

/// Every module keeper, sharing one store.
///
/// Keepers reference their dependencies through `Arc`; this struct is the
/// only owner of the set as a whole.
pub struct TestKeepers {
    pub initializer: Initializer,
    pub accounts: Arc<AccountKeeper>,
    pub bank: Arc<BankKeeper>,
    pub staking: Arc<StakingKeeper>,
    pub distribution: Arc<DistributionKeeper>,
    pub feegrant: Arc<FeeGrantKeeper>,
    pub upgrade: Arc<UpgradeKeeper>,
}

impl TestKeepers {
    /// Credit `amount` to `address`, creating the account if needed.
    ///
    /// Coins are minted into the mint module and sent from there, so supply
    /// tracks every credit. Repeated calls add to the balance. A failed call
    /// leaves no trace: neither supply nor the mint module changes.
    #[instrument(skip(self, ctx, amount), fields(amount = %amount))]
    pub fn mint_to_account(
        &self,
        ctx: &ExecutionContext,
        address: &Address,
        amount: &Coins,
    ) -> Result<(), ModuleError> {
        let checkpoint = ctx.store().checkpoint();
        let minted = self
            .bank
            .mint_coins(ctx, MINT_MODULE_NAME, amount)
            .and_then(|_| {
                self.bank
                    .send_coins_from_module_to_account(ctx, MINT_MODULE_NAME, address, amount)
            });
        if let Err(err) = minted {
            ctx.store().rollback(checkpoint);
            return Err(err);
        }
        debug!(%address, "minted to account");
        Ok(())
    }

    /// Stateless checks, then hand `msg` to the module that owns it.
    pub fn deliver_msg(&self, ctx: &ExecutionContext, msg: &Msg) -> Result<Vec<Event>, ModuleError> {
        msg.validate_basic()?;
        match msg {
            Msg::Send(m) => self.bank.handle_send(ctx, m),
            Msg::CreateValidator(m) => self.staking.handle_create_validator(ctx, m),
            Msg::Delegate(m) => self.staking.handle_delegate(ctx, m),
            Msg::Undelegate(m) => self.staking.handle_undelegate(ctx, m),
            Msg::WithdrawDelegatorReward(m) => self.distribution.handle_withdraw_delegator_reward(ctx, m),
            Msg::SetWithdrawAddress(m) => self.distribution.handle_set_withdraw_address(ctx, m),
            Msg::FundCommunityPool(m) => self.distribution.handle_fund_community_pool(ctx, m),
            Msg::GrantAllowance(m) => self.feegrant.handle_grant_allowance(ctx, m),
            Msg::RevokeAllowance(m) => self.feegrant.handle_revoke_allowance(ctx, m),
        }
    }

    /// Start-of-block work: distribute collected fees, then run any upgrade
    /// due at this height.
    pub fn begin_block(&self, ctx: &ExecutionContext) -> Result<PlanStatus, ModuleError> {
        self.distribution.allocate_tokens(ctx)?;
        let status = self.upgrade.begin_block(ctx)?;
        match &status {
            PlanStatus::Due(plan) => {
                let version = self.upgrade.apply_upgrade(ctx, plan)?;
                info!(name = %plan.name, version, "upgrade executed");
            }
            PlanStatus::Skipped(plan) => warn!(name = %plan.name, "upgrade skipped"),
            PlanStatus::Idle => {}
        }
        Ok(status)
    }

    pub fn account_query(&self) -> &dyn AccountQuery {
        self.accounts.as_ref()
    }

    pub fn balance_query(&self) -> &dyn BalanceQuery {
        self.bank.as_ref()
    }

    pub fn stake_query(&self) -> &dyn StakeQuery {
        self.staking.as_ref()
    }

    pub fn distribution_query(&self) -> &dyn DistributionQuery {
        self.distribution.as_ref()
    }

    pub fn feegrant_query(&self) -> &dyn FeeGrantQuery {
        self.feegrant.as_ref()
    }

    pub fn upgrade_query(&self) -> &dyn UpgradeQuery {
        self.upgrade.as_ref()
    }
}
