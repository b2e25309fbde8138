//! Broadcast modes and node acknowledgements.

use std::fmt;
use std::str::FromStr;

use lt_02_ledger_modules::Event;
use serde::{Deserialize, Serialize};
use shared_types::ConfigError;

/// Delivery guarantee requested from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Return after the node's admission check.
    Sync,
    /// Return once the node has received the bytes.
    Async,
    /// Return after the transaction is included in a committed block.
    Commit,
}

impl BroadcastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastMode::Sync => "sync",
            BroadcastMode::Async => "async",
            BroadcastMode::Commit => "commit",
        }
    }
}

impl fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric selector: 0 sync, 1 async, 2 commit.
impl TryFrom<i32> for BroadcastMode {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BroadcastMode::Sync),
            1 => Ok(BroadcastMode::Async),
            2 => Ok(BroadcastMode::Commit),
            other => Err(ConfigError::UnsupportedBroadcastMode(other.to_string())),
        }
    }
}

impl FromStr for BroadcastMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(BroadcastMode::Sync),
            "async" => Ok(BroadcastMode::Async),
            "commit" => Ok(BroadcastMode::Commit),
            other => Err(ConfigError::UnsupportedBroadcastMode(other.to_string())),
        }
    }
}

/// Code reported for an accepted transaction.
pub const OK_CODE: u32 = 0;

/// What the node said about a submitted transaction.
///
/// A non-zero `code` is a rejection. `height` is zero unless the
/// transaction was committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub txhash: String,
    pub height: u64,
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub events: Vec<Event>,
}

impl TxResponse {
    /// Acknowledgement that only confirms receipt.
    pub fn accepted(txhash: impl Into<String>) -> Self {
        Self {
            txhash: txhash.into(),
            ..Self::default()
        }
    }

    pub fn rejected(
        txhash: impl Into<String>,
        codespace: impl Into<String>,
        code: u32,
        log: impl Into<String>,
    ) -> Self {
        Self {
            txhash: txhash.into(),
            codespace: codespace.into(),
            code,
            log: log.into(),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == OK_CODE
    }

    /// Events of type `kind`, in emission order.
    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}
