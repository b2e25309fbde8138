//! # Module Initializer
//!
//! Mounts one store namespace per module and constructs its keeper. The
//! caller drives construction in dependency order:
//!
//! ```text
//! Level 0: accounts, upgrade (no module dependencies)
//! Level 1: bank (accounts), fee-grant (accounts)
//! Level 2: staking (accounts, bank)
//! Level 3: distribution (accounts, bank, staking)
//! ```
//!
//! Every keeper needs its dependencies as constructed values, so an
//! out-of-order call does not compile.

use std::collections::BTreeSet;
use std::sync::Arc;

use lt_01_versioned_store::{CommitMultiStore, MemDb, StoreKey, StoreKind};
use lt_02_ledger_modules::{
    auth, bank, distribution, feegrant, staking, upgrade, AccountKeeper, BankKeeper,
    DistributionKeeper, FeeGrantKeeper, NoopProtocolVersionSetter, ProtocolVersionSetter,
    StakingKeeper, UpgradeKeeper,
};
use shared_types::{
    module_account_addrs, Address, ConfigError, PermissionTable, FEE_COLLECTOR_NAME,
    GOV_MODULE_NAME,
};
use tracing::info;

use crate::errors::BootstrapError;

/// Owns the backing database and the multistore while keepers are built.
pub struct Initializer {
    db: Arc<MemDb>,
    store: Arc<CommitMultiStore>,
    permissions: PermissionTable,
    authority: Address,
}

impl Initializer {
    /// Fresh in-memory store. `permissions` is the merged table every
    /// permission-aware keeper sees.
    pub fn new(permissions: PermissionTable) -> Self {
        let db = Arc::new(MemDb::new());
        let store = Arc::new(CommitMultiStore::new(db.clone()));
        Self {
            db,
            store,
            permissions,
            authority: Address::for_module(GOV_MODULE_NAME),
        }
    }

    pub fn store(&self) -> &Arc<CommitMultiStore> {
        &self.store
    }

    pub fn db(&self) -> &Arc<MemDb> {
        &self.db
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Governance address every keeper accepts as authority.
    pub fn authority(&self) -> Address {
        self.authority
    }

    fn mount(&self, name: &str) -> Result<StoreKey, ConfigError> {
        let key = StoreKey::new(name);
        self.store
            .mount_store(key.clone(), StoreKind::Versioned, self.db.clone())?;
        Ok(key)
    }

    pub fn accounts(&self) -> Result<Arc<AccountKeeper>, ConfigError> {
        let key = self.mount(auth::STORE_KEY)?;
        info!(modules = self.permissions.len(), "  [acc] account keeper initialized");
        Ok(Arc::new(AccountKeeper::new(
            key,
            self.permissions.clone(),
            self.authority,
        )))
    }

    /// Module account addresses are blocked from receiving user sends.
    pub fn bank(&self, accounts: &Arc<AccountKeeper>) -> Result<Arc<BankKeeper>, ConfigError> {
        let key = self.mount(bank::STORE_KEY)?;
        let blocked = module_account_addrs(&self.permissions);
        info!(blocked = blocked.len(), "  [bank] bank keeper initialized");
        Ok(Arc::new(BankKeeper::new(
            key,
            accounts.clone(),
            blocked,
            self.authority,
        )))
    }

    pub fn staking(
        &self,
        accounts: &Arc<AccountKeeper>,
        bank: &Arc<BankKeeper>,
    ) -> Result<Arc<StakingKeeper>, ConfigError> {
        let key = self.mount(staking::STORE_KEY)?;
        info!("  [staking] staking keeper initialized");
        Ok(Arc::new(StakingKeeper::new(
            key,
            accounts.clone(),
            bank.clone(),
            self.authority,
        )))
    }

    pub fn distribution(
        &self,
        accounts: &Arc<AccountKeeper>,
        bank: &Arc<BankKeeper>,
        staking: &Arc<StakingKeeper>,
    ) -> Result<Arc<DistributionKeeper>, ConfigError> {
        let key = self.mount(distribution::STORE_KEY)?;
        info!(fee_collector = FEE_COLLECTOR_NAME, "  [distribution] distribution keeper initialized");
        Ok(Arc::new(DistributionKeeper::new(
            key,
            accounts.clone(),
            bank.clone(),
            staking.clone(),
            FEE_COLLECTOR_NAME,
            self.authority,
        )))
    }

    pub fn feegrant(&self, accounts: &Arc<AccountKeeper>) -> Result<Arc<FeeGrantKeeper>, ConfigError> {
        let key = self.mount(feegrant::STORE_KEY)?;
        info!("  [feegrant] fee-grant keeper initialized");
        Ok(Arc::new(FeeGrantKeeper::new(key, accounts.clone())))
    }

    /// Upgrade keeper with a no-op protocol version setter.
    pub fn upgrade(&self, skip_heights: BTreeSet<u64>) -> Result<Arc<UpgradeKeeper>, ConfigError> {
        self.upgrade_with_setter(skip_heights, Arc::new(NoopProtocolVersionSetter))
    }

    pub fn upgrade_with_setter(
        &self,
        skip_heights: BTreeSet<u64>,
        setter: Arc<dyn ProtocolVersionSetter>,
    ) -> Result<Arc<UpgradeKeeper>, ConfigError> {
        let key = self.mount(upgrade::STORE_KEY)?;
        info!(skip_heights = skip_heights.len(), "  [upgrade] upgrade keeper initialized");
        Ok(Arc::new(UpgradeKeeper::new(
            key,
            skip_heights,
            self.authority,
            setter,
        )))
    }

    /// Finalize mounting. Must run once, after every keeper is built.
    pub fn load_latest(&self) -> Result<u64, BootstrapError> {
        let version = self.store.load_latest_version()?;
        info!(version, namespaces = self.store.mounted().len(), "store loaded");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_mount_is_config_error() {
        let init = Initializer::new(PermissionTable::default_base());
        let accounts = init.accounts().unwrap();
        let _bank = init.bank(&accounts).unwrap();
        assert_eq!(
            init.bank(&accounts).err(),
            Some(ConfigError::NamespaceAlreadyMounted(bank::STORE_KEY.into()))
        );
    }

    #[test]
    fn test_mount_after_load_is_config_error() {
        let init = Initializer::new(PermissionTable::default_base());
        let _accounts = init.accounts().unwrap();
        init.load_latest().unwrap();
        assert!(matches!(
            init.upgrade(BTreeSet::new()).err(),
            Some(ConfigError::MountAfterLoad(_))
        ));
    }

    #[test]
    fn test_load_twice_is_config_error() {
        let init = Initializer::new(PermissionTable::default_base());
        init.load_latest().unwrap();
        assert!(matches!(
            init.load_latest(),
            Err(BootstrapError::Config(ConfigError::StoreAlreadyLoaded))
        ));
    }
}
