//! Outbound Ports (Driven Ports)
//!
//! What the pipeline needs from a running node. The in-process local node
//! and the JSON-RPC client both implement these.

use async_trait::async_trait;
use lt_02_ledger_modules::staking::{Delegation, Validator};
use serde::{Deserialize, Serialize};
use shared_types::{AccountRecord, Address, Coins};

use crate::domain::{QueryError, TransportError, TxResponse};

/// Chain identity and tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub chain_id: String,
    pub latest_height: u64,
}

/// Read-only query channel.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn node_info(&self) -> Result<NodeInfo, QueryError>;

    /// Fails with [`QueryError::NotFound`] for an address with no account.
    async fn account(&self, address: &Address) -> Result<AccountRecord, QueryError>;

    async fn all_balances(&self, address: &Address) -> Result<Coins, QueryError>;

    async fn validators(&self) -> Result<Vec<Validator>, QueryError>;

    async fn delegations(&self, delegator: &Address) -> Result<Vec<Delegation>, QueryError>;

    /// Rewards `delegator` could withdraw from `validator` right now.
    async fn delegation_rewards(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, QueryError>;

    async fn community_pool(&self) -> Result<Coins, QueryError>;
}

/// Transaction submission.
///
/// A rejected transaction is an `Ok` response with a non-zero code;
/// `Err` means the bytes may never have reached the node.
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError>;

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError>;

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError>;
}
