//! Shared setup for the integration tests and benchmarks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lt_02_ledger_modules::staking::{Delegation, Validator};
use lt_02_ledger_modules::{Msg, MsgSend};
use lt_03_bootstrap::NetworkConfig;
use lt_04_tx_pipeline::{
    NodeInfo, QueryClient, QueryError, TestSuite, TransportError, TxEncoding, TxGenInfo,
    TxResponse, TxSubmitter,
};
use lt_05_local_node::LocalNode;
use shared_crypto::Identity;
use shared_types::{AccountRecord, Address, Coins};

/// Fee that covers the default gas limit at the default gas price.
pub const DEFAULT_FEE: u128 = 2;

/// A started local node and a suite connected to it.
pub struct LocalNetwork {
    pub node: Arc<LocalNode>,
    pub suite: TestSuite,
}

impl LocalNetwork {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(NetworkConfig::default(), TxEncoding::default()).await
    }

    /// Node and suite agree on `encoding`.
    pub async fn start_with(config: NetworkConfig, encoding: TxEncoding) -> anyhow::Result<Self> {
        lt_telemetry::init_test_tracing();
        let node = Arc::new(
            LocalNode::start(config)
                .context("local node failed to start")?
                .with_encoding(encoding),
        );
        let validator = node
            .validators()
            .first()
            .cloned()
            .context("node has no genesis validator")?;
        let suite = TestSuite::connect(node.clone())
            .await?
            .with_encoding(encoding)
            .with_validator(validator);
        Ok(Self { node, suite })
    }

    /// Fresh identity holding `amount`.
    pub fn funded(&self, amount: &str) -> anyhow::Result<Identity> {
        let identity = Identity::generate();
        let coins: Coins = amount.parse()?;
        self.node.fund_account(&identity.address(), &coins)?;
        Ok(identity)
    }

    pub fn validator(&self) -> Address {
        self.node.validators()[0].address()
    }

    pub async fn balance(&self, address: &Address, denom: &str) -> anyhow::Result<u128> {
        Ok(self.suite.get_balances(address).await?.amount_of(denom))
    }
}

/// `TxGenInfo` for `account` paying [`DEFAULT_FEE`].
pub fn gen_info(account: &Identity) -> TxGenInfo {
    TxGenInfo::new(account.clone()).with_fee(Coins::single("stake", DEFAULT_FEE))
}

pub fn send(from: &Identity, to: Address, amount: u128) -> Msg {
    MsgSend {
        from_address: from.address(),
        to_address: to,
        amount: Coins::single("stake", amount),
    }
    .into()
}

/// Forwards to a [`LocalNode`] and counts submissions.
pub struct CountingNode {
    inner: Arc<LocalNode>,
    submissions: AtomicUsize,
}

impl CountingNode {
    pub fn new(inner: Arc<LocalNode>) -> Self {
        Self {
            inner,
            submissions: AtomicUsize::new(0),
        }
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.submissions.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueryClient for CountingNode {
    async fn node_info(&self) -> Result<NodeInfo, QueryError> {
        self.inner.node_info().await
    }

    async fn account(&self, address: &Address) -> Result<AccountRecord, QueryError> {
        self.inner.account(address).await
    }

    async fn all_balances(&self, address: &Address) -> Result<Coins, QueryError> {
        self.inner.all_balances(address).await
    }

    async fn validators(&self) -> Result<Vec<Validator>, QueryError> {
        QueryClient::validators(self.inner.as_ref()).await
    }

    async fn delegations(&self, delegator: &Address) -> Result<Vec<Delegation>, QueryError> {
        self.inner.delegations(delegator).await
    }

    async fn delegation_rewards(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, QueryError> {
        self.inner.delegation_rewards(delegator, validator).await
    }

    async fn community_pool(&self) -> Result<Coins, QueryError> {
        self.inner.community_pool().await
    }
}

#[async_trait]
impl TxSubmitter for CountingNode {
    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.record();
        self.inner.broadcast_tx_sync(tx_bytes).await
    }

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.record();
        self.inner.broadcast_tx_async(tx_bytes).await
    }

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.record();
        self.inner.broadcast_tx_commit(tx_bytes).await
    }
}
