//! # Ledger Modules (lt-02)
//!
//! The six state modules of the ledger, each a keeper over its own store
//! namespace:
//!
//! | Module | Namespace | Depends on |
//! |--------|-----------|------------|
//! | accounts | `acc` | - |
//! | bank | `bank` | accounts |
//! | staking | `staking` | accounts, bank |
//! | distribution | `distribution` | accounts, bank, staking |
//! | fee-grant | `feegrant` | accounts |
//! | upgrade | `upgrade` | - |
//!
//! Read paths go through the capability traits in [`ports`]. Keepers hold
//! no state of their own. Every call takes an
//! [`ExecutionContext`] carrying the store, block time and height.
//!
//! ## Usage
//!
//! ```ignore
//! let accounts = Arc::new(AccountKeeper::new(StoreKey::new(auth::STORE_KEY), perms, gov));
//! let bank = Arc::new(BankKeeper::new(StoreKey::new(bank::STORE_KEY), accounts.clone(), blocked, gov));
//!
//! bank.mint_coins(&ctx, MINT_MODULE_NAME, &"100stake".parse()?)?;
//! ```

pub mod auth;
pub mod bank;
pub mod context;
pub mod distribution;
pub mod errors;
pub mod events;
pub mod feegrant;
pub mod msgs;
pub mod ports;
pub mod staking;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod test_utils;

pub use auth::{AccountKeeper, ModuleAccount};
pub use bank::{BankKeeper, MsgSend};
pub use context::ExecutionContext;
pub use distribution::DistributionKeeper;
pub use errors::{ModuleError, ROOT_CODESPACE};
pub use events::{event_types, Event, EventAttribute};
pub use feegrant::{BasicAllowance, FeeGrantKeeper};
pub use msgs::Msg;
pub use ports::{
    AccountQuery, BalanceQuery, DistributionQuery, FeeGrantQuery, StakeQuery, UpgradeQuery,
};
pub use staking::StakingKeeper;
pub use upgrade::{NoopProtocolVersionSetter, ProtocolVersionSetter, UpgradeKeeper};
