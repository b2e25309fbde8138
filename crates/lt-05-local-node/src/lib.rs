//! # Local Node (lt-05)
//!
//! An in-process validator for the ledger testkit. [`LocalNode`] boots a
//! ledger with `lt-03`, creates genesis validators, and then serves the
//! pipeline's [`QueryClient`](lt_04_tx_pipeline::QueryClient) and
//! [`TxSubmitter`](lt_04_tx_pipeline::TxSubmitter) ports, so a
//! [`TestSuite`](lt_04_tx_pipeline::TestSuite) can run against it exactly as
//! it would against a remote node.
//!
//! ## Transaction Flow
//!
//! ```text
//! bytes ──► decode ──► AnteHandler ──► mempool ──► produce_block
//!            (2)      (fee, sig, seq)                 │
//!                                                     ├─ begin_block (fees, upgrades)
//!                                                     ├─ deliver msgs (all or nothing)
//!                                                     └─ commit store
//! ```
//!
//! Rejections come back as [`TxResponse`](lt_04_tx_pipeline::TxResponse)s
//! with the codes in [`codes`]; only infrastructure failures are errors.

pub mod ante;
pub mod errors;
pub mod genesis;
pub mod node;
pub mod rejection;

pub use ante::{AnteHandler, AnteOutcome, SIG_VERIFY_COST_SECP256K1, TX_SIZE_COST_PER_BYTE};
pub use errors::NodeError;
pub use genesis::GENESIS_COMMISSION_BPS;
pub use node::{BlockResult, LocalNode};
pub use rejection::{codes, Rejection};
