//! Scripted node for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use lt_02_ledger_modules::staking::{Delegation, Validator};
use parking_lot::Mutex;
use shared_types::{AccountRecord, Address, Coins};

use crate::domain::{tx_hash, BroadcastMode, QueryError, TransportError, TxResponse};
use crate::ports::{NodeInfo, QueryClient, TxSubmitter};

pub(crate) const MOCK_CHAIN_ID: &str = "mock-chain";

/// Answers queries from a fixed account table and records every
/// submission.
#[derive(Default)]
pub(crate) struct MockNode {
    accounts: Mutex<HashMap<Address, AccountRecord>>,
    submitted: Mutex<Vec<(BroadcastMode, Vec<u8>)>>,
    offline: Mutex<bool>,
}

impl MockNode {
    pub fn with_account(self, record: AccountRecord) -> Self {
        self.accounts.lock().insert(record.address, record);
        self
    }

    pub fn go_offline(&self) {
        *self.offline.lock() = true;
    }

    pub fn submitted(&self) -> Vec<(BroadcastMode, Vec<u8>)> {
        self.submitted.lock().clone()
    }

    fn check_online(&self) -> Result<(), TransportError> {
        if *self.offline.lock() {
            return Err(TransportError("connection refused".into()));
        }
        Ok(())
    }

    fn record(&self, mode: BroadcastMode, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.check_online()?;
        self.submitted.lock().push((mode, tx_bytes.to_vec()));
        let mut response = TxResponse::accepted(tx_hash(tx_bytes));
        if mode == BroadcastMode::Commit {
            response.height = 1;
        }
        Ok(response)
    }
}

#[async_trait]
impl QueryClient for MockNode {
    async fn node_info(&self) -> Result<NodeInfo, QueryError> {
        self.check_online()?;
        Ok(NodeInfo {
            chain_id: MOCK_CHAIN_ID.into(),
            latest_height: 1,
        })
    }

    async fn account(&self, address: &Address) -> Result<AccountRecord, QueryError> {
        self.check_online()?;
        self.accounts
            .lock()
            .get(address)
            .cloned()
            .ok_or(QueryError::NotFound(*address))
    }

    async fn all_balances(&self, _address: &Address) -> Result<Coins, QueryError> {
        self.check_online()?;
        Ok(Coins::empty())
    }

    async fn validators(&self) -> Result<Vec<Validator>, QueryError> {
        self.check_online()?;
        Ok(Vec::new())
    }

    async fn delegations(&self, _delegator: &Address) -> Result<Vec<Delegation>, QueryError> {
        self.check_online()?;
        Ok(Vec::new())
    }

    async fn delegation_rewards(
        &self,
        _delegator: &Address,
        _validator: &Address,
    ) -> Result<Coins, QueryError> {
        self.check_online()?;
        Ok(Coins::empty())
    }

    async fn community_pool(&self) -> Result<Coins, QueryError> {
        self.check_online()?;
        Ok(Coins::empty())
    }
}

#[async_trait]
impl TxSubmitter for MockNode {
    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.record(BroadcastMode::Sync, tx_bytes)
    }

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.record(BroadcastMode::Async, tx_bytes)
    }

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.record(BroadcastMode::Commit, tx_bytes)
    }
}
