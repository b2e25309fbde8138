//! # Ledger Bootstrap (lt-03)
//!
//! Wires the six ledger modules over one in-memory versioned store and
//! returns a ready [`ExecutionContext`](lt_02_ledger_modules::ExecutionContext)
//! plus the [`TestKeepers`].
//!
//! ## Construction Order
//!
//! | Level | Module | Needs |
//! |-------|--------|-------|
//! | 0 | accounts | merged permission table |
//! | 1 | bank | accounts, module account addresses |
//! | 2 | staking | accounts, bank |
//! | 3 | distribution | accounts, bank, staking |
//! | 1 | fee-grant | accounts |
//! | 0 | upgrade | skip heights, version setter |
//!
//! ## Usage
//!
//! ```ignore
//! use lt_03_bootstrap::{bootstrap, BootstrapOptions};
//!
//! let (ctx, keepers) = bootstrap(BootstrapOptions::default());
//! keepers.mint_to_account(&ctx, &alice, &"1000stake".parse()?)?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod initializer;
pub mod keepers;
pub mod sample;

pub use bootstrap::{bootstrap, try_bootstrap};
pub use config::{
    example_timestamp, tokens_from_consensus_power, BootstrapOptions, NetworkConfig,
    DEFAULT_BOND_DENOM, DEFAULT_CHAIN_ID, EXAMPLE_HEIGHT,
};
pub use errors::BootstrapError;
pub use initializer::Initializer;
pub use keepers::TestKeepers;
