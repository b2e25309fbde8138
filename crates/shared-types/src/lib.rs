//! # Shared Types Crate
//!
//! Ledger primitives used by every subsystem of the testkit.
//!
//! ## Contents
//!
//! - **Entities**: `Address`, `Hash`, `AccountRecord`
//! - **Coins**: `Coin`, `Coins` (sorted, zero-free multi-denomination amounts)
//! - **Permissions**: `Capability`, `PermissionTable`, module account names
//! - **Errors**: `ConfigError` (harness-setup bugs) and `CoinsError`
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: module names and the default permission
//!   table are defined once, here.
//! - **No global state**: permission tables are plain values merged into a
//!   fresh table per bootstrap.

pub mod coins;
pub mod entities;
pub mod errors;
pub mod permissions;

pub use coins::{Coin, Coins};
pub use entities::*;
pub use errors::*;
pub use permissions::*;
