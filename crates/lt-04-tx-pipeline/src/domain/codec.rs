//! Wire encodings for [`Tx`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::CodecError;
use super::tx::Tx;

/// How signed transactions are serialized for broadcast. Builder and node
/// must agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxEncoding {
    #[default]
    Bincode,
    Json,
}

impl TxEncoding {
    pub fn encode(&self, tx: &Tx) -> Result<Vec<u8>, CodecError> {
        match self {
            TxEncoding::Bincode => Ok(bincode::serialize(tx)?),
            TxEncoding::Json => Ok(serde_json::to_vec(tx)?),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Tx, CodecError> {
        match self {
            TxEncoding::Bincode => Ok(bincode::deserialize(bytes)?),
            TxEncoding::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }
}

impl fmt::Display for TxEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxEncoding::Bincode => f.write_str("bincode"),
            TxEncoding::Json => f.write_str("json"),
        }
    }
}

impl FromStr for TxEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bincode" | "binary" => Ok(TxEncoding::Bincode),
            "json" => Ok(TxEncoding::Json),
            other => Err(format!("unknown tx encoding {other:?}")),
        }
    }
}
