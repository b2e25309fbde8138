//! # Local Node
//!
//! A single-validator chain in the test process. Submissions follow the
//! usual node life cycle:
//!
//! ```text
//! sync   ── admission check ──► mempool ─┐
//! async  ───────────────────► mempool ───┤
//! commit ── admission check ──► mempool ─┴─► produce_block ──► deliver ──► commit store
//! ```
//!
//! Admission effects (fee, sequence) of a checked transaction stay applied
//! while it waits in the mempool, so a second transaction with the same
//! sequence is refused before the first is even included. Unchecked
//! (async) transactions are admitted at delivery instead.
//!
//! A failed message rolls back every message of its transaction; the fee
//! and sequence increment remain.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lt_02_ledger_modules::staking::{Delegation, Validator};
use lt_02_ledger_modules::upgrade::PlanStatus;
use lt_02_ledger_modules::{event_types, Event, ExecutionContext, ModuleError};
use lt_03_bootstrap::{try_bootstrap, BootstrapOptions, NetworkConfig, TestKeepers};
use lt_04_tx_pipeline::{
    tx_hash, NodeInfo, QueryClient, QueryError, TransportError, Tx, TxEncoding, TxResponse,
    TxSubmitter,
};
use parking_lot::RwLock;
use shared_crypto::Identity;
use shared_types::{AccountRecord, Address, Coins};
use tracing::{debug, info, instrument, warn};

use crate::ante::{AnteHandler, AnteOutcome};
use crate::errors::NodeError;
use crate::genesis;
use crate::rejection::Rejection;

/// A transaction waiting for the next block.
struct PendingTx {
    hash: String,
    bytes: Vec<u8>,
    /// Present when the admission check already ran and its effects are
    /// applied.
    admitted: Option<(Tx, AnteOutcome)>,
}

struct ChainState {
    ctx: ExecutionContext,
    keepers: TestKeepers,
    mempool: Vec<PendingTx>,
}

/// Outcome of one produced block.
#[derive(Debug, Clone)]
pub struct BlockResult {
    pub height: u64,
    pub time: DateTime<Utc>,
    pub upgrade: PlanStatus,
    pub txs: Vec<TxResponse>,
    pub app_hash: String,
}

pub struct LocalNode {
    config: NetworkConfig,
    encoding: TxEncoding,
    validators: Vec<Identity>,
    state: RwLock<ChainState>,
}

impl LocalNode {
    /// Bootstrap a ledger, run genesis and commit it.
    #[instrument(name = "local_node_start", skip(config), fields(chain_id = %config.chain_id))]
    pub fn start(config: NetworkConfig) -> Result<Self, NodeError> {
        Self::start_with(config, BootstrapOptions::default())
    }

    /// Like [`start`](Self::start) with extra bootstrap options.
    pub fn start_with(config: NetworkConfig, options: BootstrapOptions) -> Result<Self, NodeError> {
        config.validate()?;

        info!("Phase 1: bootstrapping ledger");
        let (ctx, keepers) = try_bootstrap(options)?;
        let ctx = ctx.with_chain_id(config.chain_id.clone());

        info!(validators = config.num_validators, "Phase 2: genesis");
        let validators = genesis::init_validators(&ctx, &keepers, &config)?;

        info!("Phase 3: committing genesis");
        let commit = ctx.store().commit()?;
        info!(
            height = ctx.block_height(),
            app_hash = %commit.app_hash_hex(),
            "local node ready"
        );

        Ok(Self {
            config,
            encoding: TxEncoding::default(),
            validators,
            state: RwLock::new(ChainState {
                ctx,
                keepers,
                mempool: Vec::new(),
            }),
        })
    }

    /// Wire encoding accepted by this node.
    pub fn with_encoding(mut self, encoding: TxEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn encoding(&self) -> TxEncoding {
        self.encoding
    }

    pub fn chain_id(&self) -> &str {
        &self.config.chain_id
    }

    /// Genesis validator identities, in creation order.
    pub fn validators(&self) -> &[Identity] {
        &self.validators
    }

    pub fn height(&self) -> u64 {
        self.state.read().ctx.block_height()
    }

    pub fn block_time(&self) -> DateTime<Utc> {
        self.state.read().ctx.block_time()
    }

    pub fn mempool_len(&self) -> usize {
        self.state.read().mempool.len()
    }

    /// Read the ledger directly, bypassing the query port.
    pub fn inspect<R>(&self, f: impl FnOnce(&ExecutionContext, &TestKeepers) -> R) -> R {
        let state = self.state.read();
        f(&state.ctx, &state.keepers)
    }

    /// Mint `amount` into `address`. Visible immediately; committed with
    /// the next block.
    pub fn fund_account(&self, address: &Address, amount: &Coins) -> Result<(), NodeError> {
        let state = self.state.write();
        state.keepers.mint_to_account(&state.ctx, address, amount)?;
        Ok(())
    }

    /// Admission-check `tx_bytes` and queue it on success.
    pub fn check_tx(&self, tx_bytes: &[u8]) -> TxResponse {
        let mut state = self.state.write();
        self.check_locked(&mut state, tx_bytes)
    }

    /// Queue `tx_bytes` without checking it.
    pub fn submit_unchecked(&self, tx_bytes: &[u8]) -> TxResponse {
        let hash = tx_hash(tx_bytes);
        self.state.write().mempool.push(PendingTx {
            hash: hash.clone(),
            bytes: tx_bytes.to_vec(),
            admitted: None,
        });
        debug!(txhash = %hash, "queued unchecked");
        TxResponse::accepted(hash)
    }

    /// Admission-check, then produce a block. Returns the delivery result,
    /// or the admission rejection if the transaction never got in.
    pub fn check_and_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, NodeError> {
        let mut state = self.state.write();
        let checked = self.check_locked(&mut state, tx_bytes);
        if !checked.is_ok() {
            return Ok(checked);
        }
        let block = self.produce_locked(&mut state)?;
        let hash = checked.txhash;
        Ok(block
            .txs
            .into_iter()
            .rev()
            .find(|r| r.txhash == hash)
            .unwrap_or_else(|| TxResponse::accepted(hash)))
    }

    /// Advance one block: begin-block hooks, deliver the mempool, commit.
    pub fn produce_block(&self) -> Result<BlockResult, NodeError> {
        let mut state = self.state.write();
        self.produce_locked(&mut state)
    }

    fn check_locked(&self, state: &mut ChainState, tx_bytes: &[u8]) -> TxResponse {
        let hash = tx_hash(tx_bytes);
        let checkpoint = state.ctx.store().checkpoint();
        let admitted = self
            .encoding
            .decode(tx_bytes)
            .map_err(Rejection::from)
            .and_then(|tx| {
                AnteHandler::new(&state.keepers, &self.config)
                    .run(&state.ctx, &tx, tx_bytes.len())
                    .map(|outcome| (tx, outcome))
            });

        match admitted {
            Ok((tx, outcome)) => {
                let mut response = TxResponse::accepted(hash.clone());
                response.gas_wanted = tx.auth_info.fee.gas_limit;
                response.gas_used = outcome.gas_used;
                state.mempool.push(PendingTx {
                    hash,
                    bytes: tx_bytes.to_vec(),
                    admitted: Some((tx, outcome)),
                });
                response
            }
            Err(rejection) => {
                state.ctx.store().rollback(checkpoint);
                warn!(txhash = %hash, code = rejection.code, log = %rejection.log, "check rejected");
                rejection.into_response(hash)
            }
        }
    }

    #[instrument(skip_all, fields(height = state.ctx.block_height() + 1))]
    fn produce_locked(&self, state: &mut ChainState) -> Result<BlockResult, NodeError> {
        let height = state.ctx.block_height() + 1;
        let interval = Duration::seconds(i64::try_from(self.config.timeout_commit_secs).unwrap_or(i64::MAX));
        let ctx = state
            .ctx
            .with_block_height(height)
            .with_block_time(state.ctx.block_time() + interval);

        let upgrade = state
            .keepers
            .begin_block(&ctx)
            .map_err(|source| NodeError::Block { height, source })?;

        let pending = std::mem::take(&mut state.mempool);
        let mut txs = Vec::with_capacity(pending.len());
        for tx in pending {
            txs.push(self.deliver(&ctx, &state.keepers, tx));
        }

        let commit = ctx.store().commit()?;
        state.ctx = ctx;
        info!(
            height,
            txs = txs.len(),
            app_hash = %commit.app_hash_hex(),
            "block committed"
        );
        Ok(BlockResult {
            height,
            time: state.ctx.block_time(),
            upgrade,
            txs,
            app_hash: commit.app_hash_hex(),
        })
    }

    fn deliver(&self, ctx: &ExecutionContext, keepers: &TestKeepers, pending: PendingTx) -> TxResponse {
        let height = ctx.block_height();
        let (tx, ante) = match pending.admitted {
            Some(admitted) => admitted,
            None => {
                let checkpoint = ctx.store().checkpoint();
                let admitted = self
                    .encoding
                    .decode(&pending.bytes)
                    .map_err(Rejection::from)
                    .and_then(|tx| {
                        AnteHandler::new(keepers, &self.config)
                            .run(ctx, &tx, pending.bytes.len())
                            .map(|outcome| (tx, outcome))
                    });
                match admitted {
                    Ok(admitted) => admitted,
                    Err(rejection) => {
                        ctx.store().rollback(checkpoint);
                        let mut response = rejection.into_response(pending.hash);
                        response.height = height;
                        return response;
                    }
                }
            }
        };

        let mut response = TxResponse::accepted(pending.hash);
        response.height = height;
        response.gas_wanted = tx.auth_info.fee.gas_limit;
        response.gas_used = ante.gas_used;
        response.events = ante.events;

        let checkpoint = ctx.store().checkpoint();
        match run_msgs(ctx, keepers, &tx) {
            Ok(events) => {
                response.events.extend(events);
                debug!(txhash = %response.txhash, height, "delivered");
            }
            Err(rejection) => {
                ctx.store().rollback(checkpoint);
                warn!(txhash = %response.txhash, code = rejection.code, log = %rejection.log, "delivery failed");
                response.code = rejection.code;
                response.codespace = rejection.codespace;
                response.log = rejection.log;
            }
        }
        response
    }
}

/// Execute every message in order. The first failure aborts the batch.
fn run_msgs(ctx: &ExecutionContext, keepers: &TestKeepers, tx: &Tx) -> Result<Vec<Event>, Rejection> {
    let mut events = Vec::new();
    for (index, msg) in tx.body.messages.iter().enumerate() {
        events.push(
            Event::new(event_types::MESSAGE)
                .attr("action", msg.type_url())
                .attr("module", msg.route())
                .attr("sender", msg.signer()),
        );
        let emitted = keepers.deliver_msg(ctx, msg).map_err(|e| {
            Rejection::from_module(&e, &format!("failed to execute message; message index: {index}"))
        })?;
        events.extend(emitted);
    }
    Ok(events)
}

fn query_failed(err: ModuleError) -> QueryError {
    QueryError::Transport(TransportError(format!("query failed: {err}")))
}

#[async_trait]
impl QueryClient for LocalNode {
    async fn node_info(&self) -> Result<NodeInfo, QueryError> {
        Ok(NodeInfo {
            chain_id: self.config.chain_id.clone(),
            latest_height: self.height(),
        })
    }

    async fn account(&self, address: &Address) -> Result<AccountRecord, QueryError> {
        self.inspect(|ctx, keepers| keepers.account_query().account(ctx, address))
            .map_err(query_failed)?
            .ok_or(QueryError::NotFound(*address))
    }

    async fn all_balances(&self, address: &Address) -> Result<Coins, QueryError> {
        self.inspect(|ctx, keepers| keepers.balance_query().balances_of(ctx, address))
            .map_err(query_failed)
    }

    async fn validators(&self) -> Result<Vec<Validator>, QueryError> {
        self.inspect(|ctx, keepers| keepers.stake_query().all_validators(ctx))
            .map_err(query_failed)
    }

    async fn delegations(&self, delegator: &Address) -> Result<Vec<Delegation>, QueryError> {
        self.inspect(|ctx, keepers| keepers.stake_query().delegations_of(ctx, delegator))
            .map_err(query_failed)
    }

    async fn delegation_rewards(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, QueryError> {
        self.inspect(|ctx, keepers| {
            keepers
                .distribution_query()
                .pending_rewards(ctx, delegator, validator)
        })
        .map_err(query_failed)
    }

    async fn community_pool(&self) -> Result<Coins, QueryError> {
        self.inspect(|ctx, keepers| keepers.distribution_query().community_pool(ctx))
            .map_err(query_failed)
    }
}

#[async_trait]
impl TxSubmitter for LocalNode {
    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        Ok(self.check_tx(tx_bytes))
    }

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        Ok(self.submit_unchecked(tx_bytes))
    }

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.check_and_commit(tx_bytes)
            .map_err(|e| TransportError(format!("node failed to commit: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rejection::codes;
    use lt_02_ledger_modules::{Msg, MsgSend};
    use lt_04_tx_pipeline::{BroadcastMode, TestSuite, TxGenInfo};
    use std::sync::Arc;

    struct Harness {
        node: Arc<LocalNode>,
        suite: TestSuite,
        alice: Identity,
        bob: Address,
    }

    impl Harness {
        async fn new() -> Self {
            lt_telemetry::init_test_tracing();
            let node = Arc::new(LocalNode::start(NetworkConfig::default()).unwrap());
            let alice = Identity::generate();
            node.fund_account(&alice.address(), &"1000stake".parse().unwrap())
                .unwrap();
            let suite = TestSuite::connect(node.clone()).await.unwrap();
            Self {
                node,
                suite,
                alice,
                bob: Address::derive(b"bob"),
            }
        }

        fn send(&self, amount: u128) -> Vec<Msg> {
            vec![MsgSend {
                from_address: self.alice.address(),
                to_address: self.bob,
                amount: Coins::single("stake", amount),
            }
            .into()]
        }

        fn info(&self) -> TxGenInfo {
            TxGenInfo::new(self.alice.clone()).with_fee(Coins::single("stake", 2))
        }

        async fn balance(&self, address: &Address) -> u128 {
            self.suite
                .get_balances(address)
                .await
                .unwrap()
                .amount_of("stake")
        }
    }

    #[tokio::test]
    async fn test_genesis_validators_are_bonded() {
        let h = Harness::new().await;
        let validators = h.suite.validators().await.unwrap();
        assert_eq!(validators.len(), 1);
        assert!(validators[0].is_bonded());
        assert_eq!(validators[0].operator_address, h.node.validators()[0].address());

        let account = h.suite.get_account(&h.node.validators()[0].address()).await.unwrap();
        assert_eq!(account.sequence, 1);
        assert!(account.public_key.is_some());

        let info = h.suite.node_info().await.unwrap();
        assert_eq!(info.chain_id, h.node.chain_id());
    }

    #[tokio::test]
    async fn test_sync_then_block_delivers() {
        let h = Harness::new().await;
        let bytes = h.suite.create_tx_bytes(&h.info(), h.send(100)).await.unwrap();

        let checked = h.suite.broadcast_tx(&bytes, BroadcastMode::Sync).await.unwrap();
        assert!(checked.is_ok(), "{}", checked.log);
        assert_eq!(h.node.mempool_len(), 1);
        // fee is taken at admission
        assert_eq!(h.balance(&h.alice.address()).await, 998);
        assert_eq!(h.balance(&h.bob).await, 0);

        let start = h.node.height();
        let block = h.node.produce_block().unwrap();
        assert_eq!(block.height, start + 1);
        assert_eq!(block.txs.len(), 1);
        assert!(block.txs[0].is_ok(), "{}", block.txs[0].log);
        assert!(block.txs[0].events_of(event_types::MESSAGE).next().is_some());
        assert_eq!(h.node.mempool_len(), 0);
        assert_eq!(h.balance(&h.alice.address()).await, 898);
        assert_eq!(h.balance(&h.bob).await, 100);
    }

    #[tokio::test]
    async fn test_commit_advances_clock() {
        let h = Harness::new().await;
        let before = h.node.block_time();
        let bytes = h.suite.create_tx_bytes(&h.info(), h.send(1)).await.unwrap();
        let response = h.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert!(response.is_ok(), "{}", response.log);
        assert_eq!(response.height, h.node.height());
        assert_eq!(
            h.node.block_time() - before,
            Duration::seconds(h.node.config().timeout_commit_secs as i64)
        );
    }

    #[tokio::test]
    async fn test_same_sequence_twice_is_rejected() {
        let h = Harness::new().await;
        let first = h.suite.create_tx_bytes(&h.info(), h.send(1)).await.unwrap();
        let second = h
            .suite
            .create_tx_bytes(&h.info().with_sequence(0).with_memo("again"), h.send(2))
            .await
            .unwrap();

        assert!(h.node.check_tx(&first).is_ok());
        let rejected = h.node.check_tx(&second);
        assert_eq!(rejected.code, codes::WRONG_SEQUENCE);
        assert_eq!(h.node.mempool_len(), 1);
        // the refused tx paid nothing
        assert_eq!(h.balance(&h.alice.address()).await, 998);
    }

    #[tokio::test]
    async fn test_async_is_admitted_at_delivery() {
        let h = Harness::new().await;
        let bytes = h.suite.create_tx_bytes(&h.info(), h.send(10)).await.unwrap();
        let queued = h.suite.broadcast_tx(&bytes, BroadcastMode::Async).await.unwrap();
        assert!(queued.is_ok());
        assert_eq!(h.balance(&h.alice.address()).await, 1000);

        let block = h.node.produce_block().unwrap();
        assert!(block.txs[0].is_ok(), "{}", block.txs[0].log);
        assert_eq!(h.balance(&h.alice.address()).await, 988);
    }

    #[tokio::test]
    async fn test_async_garbage_fails_in_block() {
        let h = Harness::new().await;
        h.node.submit_unchecked(b"not a tx");
        let block = h.node.produce_block().unwrap();
        assert_eq!(block.txs[0].code, codes::TX_DECODE);
        assert_eq!(block.txs[0].height, block.height);
    }

    #[tokio::test]
    async fn test_failed_message_keeps_fee_and_sequence() {
        let h = Harness::new().await;
        let mut msgs = h.send(5);
        msgs.extend(h.send(5_000));
        let bytes = h.suite.create_tx_bytes(&h.info(), msgs).await.unwrap();

        let response = h.suite.broadcast_tx_commit(&bytes).await.unwrap();
        assert_eq!(response.code, 5);
        assert!(response.log.contains("message index: 1"), "{}", response.log);

        // first send rolled back with the second
        assert_eq!(h.balance(&h.bob).await, 0);
        assert_eq!(h.balance(&h.alice.address()).await, 998);
        assert_eq!(h.suite.get_account(&h.alice.address()).await.unwrap().sequence, 1);
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let h = Harness::new().await;
        let ghost = Address::derive(b"ghost");
        assert_eq!(
            h.suite.get_account(&ghost).await.unwrap_err(),
            QueryError::NotFound(ghost)
        );
    }

    #[tokio::test]
    async fn test_fees_reach_validator_after_block() {
        let h = Harness::new().await;
        let validator = h.node.validators()[0].address();
        let bytes = h.suite.create_tx_bytes(&h.info(), h.send(1)).await.unwrap();
        h.suite.broadcast_tx_commit(&bytes).await.unwrap();
        // fees collected at admission are allocated by the block's begin hook

        // 2% of 2stake rounds to zero; the self-delegation holds every share
        let rewards = h.suite.delegation_rewards(&validator, &validator).await.unwrap();
        let pool = h.suite.community_pool().await.unwrap();
        assert_eq!(rewards, Coins::single("stake", 2));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let config = NetworkConfig {
            num_validators: 0,
            ..NetworkConfig::default()
        };
        assert!(matches!(LocalNode::start(config), Err(NodeError::Config(_))));
    }
}
