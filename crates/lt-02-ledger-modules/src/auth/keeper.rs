//! # Account Keeper
//!
//! Registry of user and module accounts. Assigns account numbers and tracks
//! the replay-protection sequence of every account.
//!
//! Module accounts are the keys of the permission table handed in at
//! construction; their addresses are derived from the module name.

use std::collections::{BTreeMap, BTreeSet};

use lt_01_versioned_store::{KvStore, StoreKey};
use serde::{Deserialize, Serialize};
use shared_types::{module_account_addrs, AccountRecord, Address, Capability, PermissionTable};
use tracing::debug;

use crate::context::ExecutionContext;
use crate::errors::ModuleError;

pub const STORE_KEY: &str = "acc";

const ACCOUNT_PREFIX: &[u8] = b"a/";
const NEXT_ACCOUNT_NUMBER_KEY: &[u8] = b"n";

/// An account owned by a module rather than a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccount {
    pub base: AccountRecord,
    pub name: String,
    pub permissions: BTreeSet<Capability>,
}

impl ModuleAccount {
    pub fn address(&self) -> Address {
        self.base.address
    }

    pub fn has_permission(&self, capability: Capability) -> bool {
        self.permissions.contains(&capability)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum StoredAccount {
    Base(AccountRecord),
    Module(ModuleAccount),
}

impl StoredAccount {
    fn record(&self) -> &AccountRecord {
        match self {
            StoredAccount::Base(r) => r,
            StoredAccount::Module(m) => &m.base,
        }
    }

    fn record_mut(&mut self) -> &mut AccountRecord {
        match self {
            StoredAccount::Base(r) => r,
            StoredAccount::Module(m) => &mut m.base,
        }
    }
}

/// Account registry. Has no module dependencies.
pub struct AccountKeeper {
    store_key: StoreKey,
    permissions: PermissionTable,
    module_addresses: BTreeMap<String, Address>,
    authority: Address,
}

impl AccountKeeper {
    /// `permissions` is the already-merged table; it is fixed for the
    /// lifetime of the keeper.
    pub fn new(store_key: StoreKey, permissions: PermissionTable, authority: Address) -> Self {
        let module_addresses = permissions
            .names()
            .map(|name| (name.to_string(), Address::for_module(name)))
            .collect();
        Self {
            store_key,
            permissions,
            module_addresses,
            authority,
        }
    }

    pub fn store_key(&self) -> &StoreKey {
        &self.store_key
    }

    /// Address allowed to change this module's params.
    pub fn authority(&self) -> Address {
        self.authority
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Address of module `name`, if it is a registered module account.
    pub fn module_address(&self, name: &str) -> Option<Address> {
        self.module_addresses.get(name).copied()
    }

    /// Derived addresses of every registered module account.
    pub fn module_account_addrs(&self) -> BTreeSet<Address> {
        module_account_addrs(&self.permissions)
    }

    pub fn is_module_address(&self, address: &Address) -> bool {
        self.module_addresses.values().any(|a| a == address)
    }

    pub fn has_permission(&self, module: &str, capability: Capability) -> bool {
        self.permissions.has_capability(module, capability)
    }

    fn accounts(&self, ctx: &ExecutionContext) -> Result<KvStore, ModuleError> {
        Ok(ctx.kv_store(&self.store_key)?.prefixed(ACCOUNT_PREFIX))
    }

    fn load(&self, ctx: &ExecutionContext, address: &Address) -> Result<Option<StoredAccount>, ModuleError> {
        Ok(self.accounts(ctx)?.get_value(address.as_bytes())?)
    }

    fn save(&self, ctx: &ExecutionContext, account: &StoredAccount) -> Result<(), ModuleError> {
        self.accounts(ctx)?
            .set_value(account.record().address.as_bytes(), account)?;
        Ok(())
    }

    /// Reserve the next account number.
    pub fn next_account_number(&self, ctx: &ExecutionContext) -> Result<u64, ModuleError> {
        let kv = ctx.kv_store(&self.store_key)?;
        let number = kv.get_value::<u64>(NEXT_ACCOUNT_NUMBER_KEY)?.unwrap_or(0);
        kv.set_value(NEXT_ACCOUNT_NUMBER_KEY, &(number + 1))?;
        Ok(number)
    }

    /// Fresh record with the next account number. Not stored.
    pub fn new_account_with_address(
        &self,
        ctx: &ExecutionContext,
        address: Address,
    ) -> Result<AccountRecord, ModuleError> {
        Ok(AccountRecord::new(address, self.next_account_number(ctx)?))
    }

    pub fn get_account(
        &self,
        ctx: &ExecutionContext,
        address: &Address,
    ) -> Result<Option<AccountRecord>, ModuleError> {
        Ok(self.load(ctx, address)?.map(|a| a.record().clone()))
    }

    pub fn has_account(&self, ctx: &ExecutionContext, address: &Address) -> Result<bool, ModuleError> {
        Ok(self.accounts(ctx)?.has(address.as_bytes())?)
    }

    /// Store `record`. Overwrites the base record of a module account too.
    pub fn set_account(&self, ctx: &ExecutionContext, record: AccountRecord) -> Result<(), ModuleError> {
        let stored = match self.load(ctx, &record.address)? {
            Some(StoredAccount::Module(mut m)) => {
                m.base = record;
                StoredAccount::Module(m)
            }
            _ => StoredAccount::Base(record),
        };
        self.save(ctx, &stored)
    }

    /// Existing account, or a newly created one.
    pub fn ensure_account(&self, ctx: &ExecutionContext, address: Address) -> Result<AccountRecord, ModuleError> {
        if let Some(existing) = self.get_account(ctx, &address)? {
            return Ok(existing);
        }
        let record = self.new_account_with_address(ctx, address)?;
        debug!(%address, account_number = record.account_number, "created account");
        self.save(ctx, &StoredAccount::Base(record.clone()))?;
        Ok(record)
    }

    /// Every stored account, ordered by address.
    pub fn all_accounts(&self, ctx: &ExecutionContext) -> Result<Vec<AccountRecord>, ModuleError> {
        Ok(self
            .accounts(ctx)?
            .scan_values::<StoredAccount>(b"")?
            .into_iter()
            .map(|(_, a)| a.record().clone())
            .collect())
    }

    /// Module account `name`, created on first access.
    pub fn get_module_account(&self, ctx: &ExecutionContext, name: &str) -> Result<ModuleAccount, ModuleError> {
        let address = self
            .module_address(name)
            .ok_or_else(|| ModuleError::UnknownModuleAccount(name.to_string()))?;

        let base = match self.load(ctx, &address)? {
            Some(StoredAccount::Module(existing)) => return Ok(existing),
            // Funds sent before the module account existed keep their number
            Some(StoredAccount::Base(record)) => record,
            None => self.new_account_with_address(ctx, address)?,
        };
        let account = ModuleAccount {
            base,
            name: name.to_string(),
            permissions: self.permissions.get(name).cloned().unwrap_or_default(),
        };
        debug!(module = name, %address, "created module account");
        self.save(ctx, &StoredAccount::Module(account.clone()))?;
        Ok(account)
    }

    /// Bump the sequence of `address` and return the new value.
    pub fn increment_sequence(&self, ctx: &ExecutionContext, address: &Address) -> Result<u64, ModuleError> {
        let mut stored = self
            .load(ctx, address)?
            .ok_or(ModuleError::AccountNotFound(*address))?;
        let record = stored.record_mut();
        record.sequence += 1;
        let sequence = record.sequence;
        self.save(ctx, &stored)?;
        Ok(sequence)
    }

    /// Record the public key of `address`. Set on its first signed
    /// transaction.
    pub fn set_public_key(
        &self,
        ctx: &ExecutionContext,
        address: &Address,
        public_key: Vec<u8>,
    ) -> Result<(), ModuleError> {
        let mut stored = self
            .load(ctx, address)?
            .ok_or(ModuleError::AccountNotFound(*address))?;
        stored.record_mut().public_key = Some(public_key);
        self.save(ctx, &stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_context;
    use shared_types::{MINT_MODULE_NAME, GOV_MODULE_NAME};

    fn keeper() -> AccountKeeper {
        AccountKeeper::new(
            StoreKey::new(STORE_KEY),
            PermissionTable::default_base(),
            Address::for_module(GOV_MODULE_NAME),
        )
    }

    #[test]
    fn test_account_numbers_are_sequential() {
        let ctx = test_context(&[STORE_KEY]);
        let k = keeper();
        let a = k.ensure_account(&ctx, Address::derive(b"a")).unwrap();
        let b = k.ensure_account(&ctx, Address::derive(b"b")).unwrap();
        assert_eq!(a.account_number, 0);
        assert_eq!(b.account_number, 1);

        // Idempotent for an existing account
        let again = k.ensure_account(&ctx, Address::derive(b"a")).unwrap();
        assert_eq!(again, a);
    }

    #[test]
    fn test_increment_sequence() {
        let ctx = test_context(&[STORE_KEY]);
        let k = keeper();
        let addr = Address::derive(b"seq");
        assert_eq!(
            k.increment_sequence(&ctx, &addr).unwrap_err(),
            ModuleError::AccountNotFound(addr)
        );
        k.ensure_account(&ctx, addr).unwrap();
        assert_eq!(k.increment_sequence(&ctx, &addr).unwrap(), 1);
        assert_eq!(k.increment_sequence(&ctx, &addr).unwrap(), 2);
        assert_eq!(k.get_account(&ctx, &addr).unwrap().unwrap().sequence, 2);
    }

    #[test]
    fn test_module_account_created_once() {
        let ctx = test_context(&[STORE_KEY]);
        let k = keeper();
        let mint = k.get_module_account(&ctx, MINT_MODULE_NAME).unwrap();
        assert_eq!(mint.address(), Address::for_module(MINT_MODULE_NAME));
        assert!(mint.has_permission(Capability::Minter));
        assert_eq!(k.get_module_account(&ctx, MINT_MODULE_NAME).unwrap(), mint);
    }

    #[test]
    fn test_unknown_module_account() {
        let ctx = test_context(&[STORE_KEY]);
        assert_eq!(
            keeper().get_module_account(&ctx, "nobody").unwrap_err(),
            ModuleError::UnknownModuleAccount("nobody".into())
        );
    }

    #[test]
    fn test_module_addresses_match_table() {
        let k = keeper();
        assert_eq!(k.module_account_addrs().len(), 5);
        assert!(k.is_module_address(&Address::for_module(MINT_MODULE_NAME)));
        assert!(!k.is_module_address(&Address::derive(b"user")));
    }

    #[test]
    fn test_set_public_key() {
        let ctx = test_context(&[STORE_KEY]);
        let k = keeper();
        let addr = Address::derive(b"pk");
        k.ensure_account(&ctx, addr).unwrap();
        k.set_public_key(&ctx, &addr, vec![2; 33]).unwrap();
        assert_eq!(
            k.get_account(&ctx, &addr).unwrap().unwrap().public_key,
            Some(vec![2; 33])
        );
    }

    #[test]
    fn test_operations_before_load_are_config_errors() {
        let ctx = crate::test_utils::unloaded_context(&[STORE_KEY]);
        let err = keeper().get_account(&ctx, &Address::derive(b"x")).unwrap_err();
        assert!(err.is_config());
    }
}
