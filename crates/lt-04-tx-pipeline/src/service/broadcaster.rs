//! Broadcaster: hands encoded transactions to the node.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::{tx_hash, BroadcastError, BroadcastMode, TxResponse};
use crate::ports::TxSubmitter;

#[derive(Clone)]
pub struct Broadcaster {
    submitter: Arc<dyn TxSubmitter>,
}

impl Broadcaster {
    pub fn new(submitter: Arc<dyn TxSubmitter>) -> Self {
        Self { submitter }
    }

    /// Submit `tx_bytes` under `mode`.
    ///
    /// A node rejection is returned as a response with a non-zero code.
    /// No retries.
    #[instrument(skip_all, fields(mode = %mode, txhash = %tx_hash(tx_bytes)))]
    pub async fn broadcast(&self, tx_bytes: &[u8], mode: BroadcastMode) -> Result<TxResponse, BroadcastError> {
        let response = match mode {
            BroadcastMode::Sync => self.submitter.broadcast_tx_sync(tx_bytes).await?,
            BroadcastMode::Async => self.submitter.broadcast_tx_async(tx_bytes).await?,
            BroadcastMode::Commit => self.submitter.broadcast_tx_commit(tx_bytes).await?,
        };
        if response.is_ok() {
            info!(height = response.height, events = response.events.len(), "broadcast accepted");
        } else {
            warn!(
                code = response.code,
                codespace = %response.codespace,
                log = %response.log,
                "broadcast rejected"
            );
        }
        Ok(response)
    }

    /// Submit with a numeric mode selector. An unknown selector fails with
    /// a configuration error and nothing is sent.
    pub async fn broadcast_with_selector(&self, tx_bytes: &[u8], mode: i32) -> Result<TxResponse, BroadcastError> {
        let mode = BroadcastMode::try_from(mode)?;
        self.broadcast(tx_bytes, mode).await
    }

    /// Submit with a named mode (`"sync"`, `"async"`, `"commit"`).
    pub async fn broadcast_with_name(&self, tx_bytes: &[u8], mode: &str) -> Result<TxResponse, BroadcastError> {
        let mode: BroadcastMode = mode.parse()?;
        self.broadcast(tx_bytes, mode).await
    }
}
