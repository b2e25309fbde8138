//! # Module Permissions
//!
//! Which module accounts may mint, burn or hold staked funds.
//!
//! A `PermissionTable` is a plain value. Bootstrap starts from
//! [`PermissionTable::default_base`] and merges caller-supplied entries into a
//! fresh copy, so two harness instances in one process never observe each
//! other's entries.
//!
//! Merging only ever adds names. A name that is merged again takes the last
//! capability set supplied, except for the five base modules: once present,
//! their entries are fixed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::Address;

/// Fee collector module account.
pub const FEE_COLLECTOR_NAME: &str = "fee_collector";
/// Distribution module account.
pub const DISTRIBUTION_MODULE_NAME: &str = "distribution";
/// Mint module account.
pub const MINT_MODULE_NAME: &str = "mint";
/// Staking pool holding bonded tokens.
pub const BONDED_POOL_NAME: &str = "bonded_tokens_pool";
/// Staking pool holding unbonded tokens.
pub const NOT_BONDED_POOL_NAME: &str = "not_bonded_tokens_pool";
/// Governance module; its address is the authority for every module.
pub const GOV_MODULE_NAME: &str = "gov";

/// Modules of [`PermissionTable::default_base`].
pub const BASE_MODULE_NAMES: [&str; 5] = [
    FEE_COLLECTOR_NAME,
    DISTRIBUTION_MODULE_NAME,
    MINT_MODULE_NAME,
    BONDED_POOL_NAME,
    NOT_BONDED_POOL_NAME,
];

/// Capability a module account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    /// May create new coins.
    Minter,
    /// May destroy coins it holds.
    Burner,
    /// May hold delegated (staked) coins.
    Staking,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Capability::Minter => "minter",
            Capability::Burner => "burner",
            Capability::Staking => "staking",
        };
        f.write_str(tag)
    }
}

/// Mapping from module name to its capability set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionTable {
    entries: BTreeMap<String, BTreeSet<Capability>>,
}

impl PermissionTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base table every bootstrap starts from.
    ///
    /// | module | capabilities |
    /// |---|---|
    /// | fee collector | none |
    /// | distribution | none |
    /// | mint | minter |
    /// | bonded pool | burner, staking |
    /// | not-bonded pool | burner, staking |
    pub fn default_base() -> Self {
        Self::new()
            .with(FEE_COLLECTOR_NAME, [])
            .with(DISTRIBUTION_MODULE_NAME, [])
            .with(MINT_MODULE_NAME, [Capability::Minter])
            .with(BONDED_POOL_NAME, [Capability::Burner, Capability::Staking])
            .with(NOT_BONDED_POOL_NAME, [Capability::Burner, Capability::Staking])
    }

    /// Builder-style insert, following the same rule as [`merge`](Self::merge).
    pub fn with(
        mut self,
        name: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.insert(name.into(), capabilities.into_iter().collect());
        self
    }

    /// Merge `other` into `self`.
    ///
    /// No name is ever removed. A name already present takes the capability
    /// set from `other`, unless it is a base module, whose entry is kept.
    /// Idempotent; commutative when the two tables share no names.
    pub fn merge(&mut self, other: &PermissionTable) {
        for (name, caps) in &other.entries {
            self.insert(name.clone(), caps.clone());
        }
    }

    fn insert(&mut self, name: String, capabilities: BTreeSet<Capability>) {
        if self.entries.contains_key(&name) && BASE_MODULE_NAMES.contains(&name.as_str()) {
            return;
        }
        self.entries.insert(name, capabilities);
    }

    /// Fresh table holding `self` merged with `other`.
    pub fn merged(&self, other: &PermissionTable) -> PermissionTable {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Capabilities of `name`, if the module is registered.
    pub fn get(&self, name: &str) -> Option<&BTreeSet<Capability>> {
        self.entries.get(name)
    }

    /// True when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True when `name` is registered with `capability`.
    pub fn has_capability(&self, name: &str, capability: Capability) -> bool {
        self.entries
            .get(name)
            .is_some_and(|caps| caps.contains(&capability))
    }

    /// Registered module names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Capability>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no module is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, C: IntoIterator<Item = Capability>> FromIterator<(N, C)> for PermissionTable {
    fn from_iter<T: IntoIterator<Item = (N, C)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(PermissionTable::new(), |table, (name, caps)| table.with(name, caps))
    }
}

/// Addresses of every module account in `table`.
///
/// Balances held at these addresses belong to modules, not users.
pub fn module_account_addrs(table: &PermissionTable) -> BTreeSet<Address> {
    table.names().map(Address::for_module).collect()
}
