//! Shared fixtures for unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use lt_01_versioned_store::{CommitMultiStore, MemDb, StoreKey, StoreKind};
use shared_types::{
    module_account_addrs, Address, Coins, PermissionTable, FEE_COLLECTOR_NAME, GOV_MODULE_NAME,
    MINT_MODULE_NAME,
};

use crate::auth::{self, AccountKeeper};
use crate::bank::{self, BankKeeper};
use crate::context::ExecutionContext;
use crate::distribution::{self, DistributionKeeper};
use crate::feegrant::{self, FeeGrantKeeper};
use crate::staking::{self, StakingKeeper};
use crate::upgrade::{self, NoopProtocolVersionSetter, UpgradeKeeper};

pub(crate) fn unloaded_context(namespaces: &[&str]) -> ExecutionContext {
    let db = Arc::new(MemDb::new());
    let cms = CommitMultiStore::new(db.clone());
    for name in namespaces {
        cms.mount_store(StoreKey::new(*name), StoreKind::Versioned, db.clone())
            .unwrap();
    }
    let time = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
    ExecutionContext::new(Arc::new(cms), time, 1111, "test-chain")
}

pub(crate) fn test_context(namespaces: &[&str]) -> ExecutionContext {
    let ctx = unloaded_context(namespaces);
    ctx.store().load_latest_version().unwrap();
    ctx
}

/// Every keeper wired over one loaded store, mirroring the production
/// construction order.
pub(crate) struct TestStack {
    pub ctx: ExecutionContext,
    pub accounts: Arc<AccountKeeper>,
    pub bank: Arc<BankKeeper>,
    pub staking: Arc<StakingKeeper>,
    pub distribution: Arc<DistributionKeeper>,
    pub feegrant: FeeGrantKeeper,
    pub upgrade: UpgradeKeeper,
}

impl TestStack {
    pub fn new() -> Self {
        let stack = Self::without_params();
        stack
            .distribution
            .set_params(&stack.ctx, &distribution::Params::default())
            .unwrap();
        stack
            .staking
            .set_params(&stack.ctx, &staking::Params::default())
            .unwrap();
        stack
    }

    pub fn without_params() -> Self {
        let ctx = test_context(&[
            auth::STORE_KEY,
            bank::STORE_KEY,
            staking::STORE_KEY,
            distribution::STORE_KEY,
            feegrant::STORE_KEY,
            upgrade::STORE_KEY,
        ]);
        let permissions = PermissionTable::default_base();
        let authority = Address::for_module(GOV_MODULE_NAME);
        let blocked = module_account_addrs(&permissions);

        let accounts = Arc::new(AccountKeeper::new(
            StoreKey::new(auth::STORE_KEY),
            permissions,
            authority,
        ));
        let bank = Arc::new(BankKeeper::new(
            StoreKey::new(bank::STORE_KEY),
            accounts.clone(),
            blocked,
            authority,
        ));
        let staking = Arc::new(StakingKeeper::new(
            StoreKey::new(staking::STORE_KEY),
            accounts.clone(),
            bank.clone(),
            authority,
        ));
        let distribution = Arc::new(DistributionKeeper::new(
            StoreKey::new(distribution::STORE_KEY),
            accounts.clone(),
            bank.clone(),
            staking.clone(),
            FEE_COLLECTOR_NAME,
            authority,
        ));
        let feegrant = FeeGrantKeeper::new(StoreKey::new(feegrant::STORE_KEY), accounts.clone());
        let upgrade = UpgradeKeeper::new(
            StoreKey::new(upgrade::STORE_KEY),
            BTreeSet::new(),
            authority,
            Arc::new(NoopProtocolVersionSetter),
        );

        Self {
            ctx,
            accounts,
            bank,
            staking,
            distribution,
            feegrant,
            upgrade,
        }
    }

    /// Mint `coins` and hand them to the address derived from `seed`.
    pub fn funded(&self, seed: &[u8], coins: &str) -> Address {
        let address = Address::derive(seed);
        let amount: Coins = coins.parse().unwrap();
        self.bank.mint_coins(&self.ctx, MINT_MODULE_NAME, &amount).unwrap();
        self.bank
            .send_coins_from_module_to_account(&self.ctx, MINT_MODULE_NAME, &address, &amount)
            .unwrap();
        address
    }
}
