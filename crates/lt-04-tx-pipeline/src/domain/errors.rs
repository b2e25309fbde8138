//! Pipeline error types.
//!
//! Transport failures and node rejections never share a variant: a rejected
//! transaction comes back as a [`TxResponse`](super::TxResponse) with a
//! non-zero code, while these errors mean the request itself failed.

use std::convert::Infallible;

use shared_types::{Address, ConfigError};
use thiserror::Error;

/// Wire encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("bincode: {0}")]
    Bincode(String),

    #[error("json: {0}")]
    Json(String),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        CodecError::Bincode(err.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}

/// The node could not be reached or answered with something unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

/// Query channel failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The account has never received funds.
    #[error("account {0} not found")]
    NotFound(Address),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Envelope construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cannot resolve signer: {0}")]
    Query(#[from] QueryError),

    #[error("cannot encode transaction: {0}")]
    Codec(#[from] CodecError),

    #[error("transaction has no messages")]
    NoMessages,

    #[error("message signer {signer} does not match signing account {account}")]
    SignerMismatch { signer: Address, account: Address },

    #[error("no validator identity configured")]
    NoValidator,
}

/// Broadcast failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// Raised before anything is sent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<Infallible> for BroadcastError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
