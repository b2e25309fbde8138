//! Read-only capability traits over the keepers.
//!
//! Query paths (the local node, test assertions) take `&dyn BalanceQuery`
//! and friends instead of concrete keepers, so a read never gains access to
//! a mutating operation.

use std::collections::BTreeSet;

use shared_types::{AccountRecord, Address, Coin, Coins};

use crate::auth::AccountKeeper;
use crate::bank::BankKeeper;
use crate::context::ExecutionContext;
use crate::distribution::DistributionKeeper;
use crate::errors::ModuleError;
use crate::feegrant::{FeeGrantKeeper, Grant};
use crate::staking::{Delegation, StakingKeeper, Validator};
use crate::upgrade::{Plan, UpgradeKeeper};

pub trait AccountQuery: Send + Sync {
    fn account(&self, ctx: &ExecutionContext, address: &Address) -> Result<Option<AccountRecord>, ModuleError>;

    fn module_addresses(&self) -> BTreeSet<Address>;
}

pub trait BalanceQuery: Send + Sync {
    fn balance(&self, ctx: &ExecutionContext, address: &Address, denom: &str) -> Result<Coin, ModuleError>;

    fn balances_of(&self, ctx: &ExecutionContext, address: &Address) -> Result<Coins, ModuleError>;

    fn supply_of(&self, ctx: &ExecutionContext, denom: &str) -> Result<Coin, ModuleError>;
}

pub trait StakeQuery: Send + Sync {
    fn validator(&self, ctx: &ExecutionContext, operator: &Address) -> Result<Option<Validator>, ModuleError>;

    fn all_validators(&self, ctx: &ExecutionContext) -> Result<Vec<Validator>, ModuleError>;

    fn delegations_of(&self, ctx: &ExecutionContext, delegator: &Address) -> Result<Vec<Delegation>, ModuleError>;
}

pub trait DistributionQuery: Send + Sync {
    fn pending_rewards(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, ModuleError>;

    fn community_pool(&self, ctx: &ExecutionContext) -> Result<Coins, ModuleError>;

    fn withdraw_address(&self, ctx: &ExecutionContext, delegator: &Address) -> Result<Address, ModuleError>;
}

pub trait FeeGrantQuery: Send + Sync {
    fn allowance(&self, ctx: &ExecutionContext, granter: &Address, grantee: &Address) -> Result<Option<Grant>, ModuleError>;
}

pub trait UpgradeQuery: Send + Sync {
    fn current_plan(&self, ctx: &ExecutionContext) -> Result<Option<Plan>, ModuleError>;

    fn done_height(&self, ctx: &ExecutionContext, name: &str) -> Result<Option<u64>, ModuleError>;

    fn current_protocol_version(&self, ctx: &ExecutionContext) -> Result<u64, ModuleError>;
}

impl AccountQuery for AccountKeeper {
    fn account(&self, ctx: &ExecutionContext, address: &Address) -> Result<Option<AccountRecord>, ModuleError> {
        self.get_account(ctx, address)
    }

    fn module_addresses(&self) -> BTreeSet<Address> {
        self.module_account_addrs()
    }
}

impl BalanceQuery for BankKeeper {
    fn balance(&self, ctx: &ExecutionContext, address: &Address, denom: &str) -> Result<Coin, ModuleError> {
        self.get_balance(ctx, address, denom)
    }

    fn balances_of(&self, ctx: &ExecutionContext, address: &Address) -> Result<Coins, ModuleError> {
        self.get_all_balances(ctx, address)
    }

    fn supply_of(&self, ctx: &ExecutionContext, denom: &str) -> Result<Coin, ModuleError> {
        self.get_supply(ctx, denom)
    }
}

impl StakeQuery for StakingKeeper {
    fn validator(&self, ctx: &ExecutionContext, operator: &Address) -> Result<Option<Validator>, ModuleError> {
        self.get_validator(ctx, operator)
    }

    fn all_validators(&self, ctx: &ExecutionContext) -> Result<Vec<Validator>, ModuleError> {
        self.validators(ctx)
    }

    fn delegations_of(&self, ctx: &ExecutionContext, delegator: &Address) -> Result<Vec<Delegation>, ModuleError> {
        self.delegator_delegations(ctx, delegator)
    }
}

impl DistributionQuery for DistributionKeeper {
    fn pending_rewards(
        &self,
        ctx: &ExecutionContext,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, ModuleError> {
        self.delegation_rewards(ctx, delegator, validator)
    }

    fn community_pool(&self, ctx: &ExecutionContext) -> Result<Coins, ModuleError> {
        Ok(self.get_fee_pool(ctx)?.community_pool)
    }

    fn withdraw_address(&self, ctx: &ExecutionContext, delegator: &Address) -> Result<Address, ModuleError> {
        self.get_withdraw_address(ctx, delegator)
    }
}

impl FeeGrantQuery for FeeGrantKeeper {
    fn allowance(&self, ctx: &ExecutionContext, granter: &Address, grantee: &Address) -> Result<Option<Grant>, ModuleError> {
        self.get_allowance(ctx, granter, grantee)
    }
}

impl UpgradeQuery for UpgradeKeeper {
    fn current_plan(&self, ctx: &ExecutionContext) -> Result<Option<Plan>, ModuleError> {
        self.get_upgrade_plan(ctx)
    }

    fn done_height(&self, ctx: &ExecutionContext, name: &str) -> Result<Option<u64>, ModuleError> {
        self.get_done_height(ctx, name)
    }

    fn current_protocol_version(&self, ctx: &ExecutionContext) -> Result<u64, ModuleError> {
        self.protocol_version(ctx)
    }
}
