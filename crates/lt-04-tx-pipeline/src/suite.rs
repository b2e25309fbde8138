//! # Test Suite
//!
//! One handle for tests that drive a node: account and balance queries,
//! transaction bytes for user or validator accounts, and broadcast.

use std::sync::Arc;

use lt_02_ledger_modules::staking::{Delegation, Validator};
use lt_02_ledger_modules::Msg;
use shared_crypto::Identity;
use shared_types::{AccountRecord, Address, Coin, Coins};
use tracing::info;

use crate::domain::{
    BroadcastError, BroadcastMode, BuildError, QueryError, SignMode, TxEncoding, TxResponse,
};
use crate::ports::{NodeInfo, QueryClient, TxSubmitter};
use crate::service::{AccountResolver, Broadcaster, TxBuilder, TxGenInfo};

pub struct TestSuite {
    query: Arc<dyn QueryClient>,
    resolver: AccountResolver,
    builder: TxBuilder,
    broadcaster: Broadcaster,
    validator: Option<Identity>,
}

impl TestSuite {
    pub fn new(query: Arc<dyn QueryClient>, submitter: Arc<dyn TxSubmitter>, chain_id: impl Into<String>) -> Self {
        let resolver = AccountResolver::new(query.clone());
        Self {
            builder: TxBuilder::new(resolver.clone(), chain_id),
            resolver,
            broadcaster: Broadcaster::new(submitter),
            query,
            validator: None,
        }
    }

    /// Suite over a node serving both ports. The chain id is read from the
    /// node.
    pub async fn connect<N>(node: Arc<N>) -> Result<Self, QueryError>
    where
        N: QueryClient + TxSubmitter + 'static,
    {
        let info = node.node_info().await?;
        info!(chain_id = %info.chain_id, height = info.latest_height, "test suite connected");
        Ok(Self::new(node.clone(), node, info.chain_id))
    }

    /// Identity used by [`create_validator_tx_bytes`](Self::create_validator_tx_bytes).
    pub fn with_validator(mut self, validator: Identity) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_sign_mode(mut self, mode: SignMode) -> Self {
        self.builder = self.builder.with_sign_mode(mode);
        self
    }

    pub fn with_encoding(mut self, encoding: TxEncoding) -> Self {
        self.builder = self.builder.with_encoding(encoding);
        self
    }

    pub fn chain_id(&self) -> &str {
        self.builder.chain_id()
    }

    pub fn builder(&self) -> &TxBuilder {
        &self.builder
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn validator(&self) -> Option<&Identity> {
        self.validator.as_ref()
    }

    pub async fn get_account(&self, address: &Address) -> Result<AccountRecord, QueryError> {
        self.resolver.resolve(address).await
    }

    pub async fn get_balances(&self, address: &Address) -> Result<Coins, QueryError> {
        self.query.all_balances(address).await
    }

    pub async fn node_info(&self) -> Result<NodeInfo, QueryError> {
        self.query.node_info().await
    }

    pub async fn validators(&self) -> Result<Vec<Validator>, QueryError> {
        self.query.validators().await
    }

    pub async fn delegations(&self, delegator: &Address) -> Result<Vec<Delegation>, QueryError> {
        self.query.delegations(delegator).await
    }

    pub async fn delegation_rewards(&self, delegator: &Address, validator: &Address) -> Result<Coins, QueryError> {
        self.query.delegation_rewards(delegator, validator).await
    }

    pub async fn community_pool(&self) -> Result<Coins, QueryError> {
        self.query.community_pool().await
    }

    /// Signed wire bytes for `msgs` from `info.account`.
    pub async fn create_tx_bytes(&self, info: &TxGenInfo, msgs: Vec<Msg>) -> Result<Vec<u8>, BuildError> {
        self.builder.create_tx_bytes(info, msgs).await
    }

    /// Signed wire bytes from the validator account, always in direct mode.
    pub async fn create_validator_tx_bytes(
        &self,
        fee: Coin,
        gas_limit: u64,
        msgs: Vec<Msg>,
    ) -> Result<Vec<u8>, BuildError> {
        let validator = self.validator.clone().ok_or(BuildError::NoValidator)?;
        let info = TxGenInfo::new(validator)
            .with_fee(Coins::from(fee))
            .with_gas_limit(gas_limit);
        self.builder
            .clone()
            .with_sign_mode(SignMode::Direct)
            .create_tx_bytes(&info, msgs)
            .await
    }

    /// Broadcast under `mode`, given as a [`BroadcastMode`] or a numeric
    /// selector. An unknown selector is a configuration error and nothing
    /// is sent.
    pub async fn broadcast_tx<M>(&self, tx_bytes: &[u8], mode: M) -> Result<TxResponse, BroadcastError>
    where
        M: TryInto<BroadcastMode>,
        BroadcastError: From<M::Error>,
    {
        let mode = mode.try_into()?;
        self.broadcaster.broadcast(tx_bytes, mode).await
    }

    /// Broadcast and wait for the block that includes the transaction.
    pub async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, BroadcastError> {
        self.broadcaster.broadcast(tx_bytes, BroadcastMode::Commit).await
    }
}
