//! # Transaction Pipeline
//!
//! Drives a validator node from tests:
//!
//! ```text
//! AccountResolver ──► TxBuilder (sign-doc, sign, encode) ──► Broadcaster
//!        ▲                                                       │
//!        └──────────────── QueryClient          TxSubmitter ◄────┘
//! ```
//!
//! ## Modules
//!
//! - `domain`: envelope, sign documents, wire encodings, broadcast modes,
//!   responses and errors
//! - `ports`: async `QueryClient` and `TxSubmitter`
//! - `service`: resolver, builder, broadcaster
//! - `adapters`: JSON-RPC client for a remote node
//! - `suite`: `TestSuite`, the one-stop handle for tests
//!
//! ## Errors
//!
//! A node that rejects a transaction answers with a [`TxResponse`] whose
//! `code` is non-zero. `Err` values are reserved for transport failures,
//! missing accounts and misconfiguration.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod suite;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::JsonRpcNodeClient;
pub use domain::{
    sign_bytes, tx_hash, AuthInfo, BroadcastError, BroadcastMode, BuildError, CodecError, Fee,
    QueryError, SignMode, SignerData, SignerInfo, TransportError, Tx, TxBody, TxEncoding,
    TxResponse, OK_CODE,
};
pub use ports::{NodeInfo, QueryClient, TxSubmitter};
pub use service::{AccountResolver, Broadcaster, TxBuilder, TxGenInfo, DEFAULT_GAS_LIMIT};
pub use suite::TestSuite;
