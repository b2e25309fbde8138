//! # JSON-RPC Node Client
//!
//! Implements the query and submission ports against a remote node over
//! HTTP JSON-RPC 2.0. Transaction bytes travel base64-encoded; addresses as
//! `0x`-prefixed hex.
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `status` | none | `NodeInfo` |
//! | `query_account` | `address` | `AccountRecord` |
//! | `query_balances` | `address` | `Coins` |
//! | `query_validators` | none | `Vec<Validator>` |
//! | `query_delegations` | `delegator` | `Vec<Delegation>` |
//! | `query_delegation_rewards` | `delegator`, `validator` | `Coins` |
//! | `query_community_pool` | none | `Coins` |
//! | `broadcast_tx_{sync,async,commit}` | `tx` | `TxResponse` |

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lt_02_ledger_modules::staking::{Delegation, Validator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{AccountRecord, Address, Coins};
use tracing::debug;

use crate::domain::{QueryError, TransportError, TxResponse};
use crate::ports::{NodeInfo, QueryClient, TxSubmitter};

/// Error code a node returns for an unknown account.
pub const NOT_FOUND_CODE: i32 = -32004;

#[derive(Debug, Serialize, Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    id: u64,
    method: String,
    params: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcResponse<T> {
    jsonrpc: String,
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

enum CallError {
    Rpc(RpcError),
    Transport(TransportError),
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        CallError::Transport(err.into())
    }
}

impl CallError {
    fn into_transport(self) -> TransportError {
        match self {
            CallError::Transport(err) => err,
            CallError::Rpc(err) => TransportError(format!("rpc error {}: {}", err.code, err.message)),
        }
    }

    fn into_query(self, address: &Address) -> QueryError {
        match self {
            CallError::Rpc(err) if err.code == NOT_FOUND_CODE => QueryError::NotFound(*address),
            other => QueryError::Transport(other.into_transport()),
        }
    }
}

pub struct JsonRpcNodeClient {
    url: String,
    client: reqwest::Client,
    request_id: AtomicU64,
}

impl JsonRpcNodeClient {
    /// Client for the node at `url`. Requests use the transport's default
    /// timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    fn request(&self, method: &str, params: Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: self.next_id(),
            method: method.to_string(),
            params,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, CallError> {
        let request = self.request(method, params);
        debug!(method, id = request.id, "rpc request");

        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(CallError::Rpc(error));
        }
        response
            .result
            .ok_or_else(|| CallError::Transport(TransportError("rpc response missing result".into())))
    }

    async fn query<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, QueryError> {
        self.call(method, params)
            .await
            .map_err(|e| QueryError::Transport(e.into_transport()))
    }

    async fn submit(&self, method: &str, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.call(method, json!({ "tx": BASE64.encode(tx_bytes) }))
            .await
            .map_err(CallError::into_transport)
    }
}

#[async_trait]
impl QueryClient for JsonRpcNodeClient {
    async fn node_info(&self) -> Result<NodeInfo, QueryError> {
        self.query("status", json!({})).await
    }

    async fn account(&self, address: &Address) -> Result<AccountRecord, QueryError> {
        self.call("query_account", json!({ "address": address.to_string() }))
            .await
            .map_err(|e| e.into_query(address))
    }

    async fn all_balances(&self, address: &Address) -> Result<Coins, QueryError> {
        self.query("query_balances", json!({ "address": address.to_string() }))
            .await
    }

    async fn validators(&self) -> Result<Vec<Validator>, QueryError> {
        self.query("query_validators", json!({})).await
    }

    async fn delegations(&self, delegator: &Address) -> Result<Vec<Delegation>, QueryError> {
        self.query("query_delegations", json!({ "delegator": delegator.to_string() }))
            .await
    }

    async fn delegation_rewards(
        &self,
        delegator: &Address,
        validator: &Address,
    ) -> Result<Coins, QueryError> {
        self.query(
            "query_delegation_rewards",
            json!({
                "delegator": delegator.to_string(),
                "validator": validator.to_string(),
            }),
        )
        .await
    }

    async fn community_pool(&self) -> Result<Coins, QueryError> {
        self.query("query_community_pool", json!({})).await
    }
}

#[async_trait]
impl TxSubmitter for JsonRpcNodeClient {
    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.submit("broadcast_tx_sync", tx_bytes).await
    }

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.submit("broadcast_tx_async", tx_bytes).await
    }

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<TxResponse, TransportError> {
        self.submit("broadcast_tx_commit", tx_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_increase() {
        let client = JsonRpcNodeClient::new("http://localhost:26657");
        let a = client.request("status", json!({}));
        let b = client.request("status", json!({}));
        assert_eq!(a.jsonrpc, "2.0");
        assert!(b.id > a.id);
    }

    #[test]
    fn test_not_found_code_maps_to_not_found() {
        let addr = Address::derive(b"ghost");
        let err = CallError::Rpc(RpcError {
            code: NOT_FOUND_CODE,
            message: "account not found".into(),
        });
        assert_eq!(err.into_query(&addr), QueryError::NotFound(addr));

        let other = CallError::Rpc(RpcError {
            code: -32603,
            message: "internal".into(),
        });
        assert!(matches!(other.into_query(&addr), QueryError::Transport(_)));
    }

    #[test]
    fn test_error_response_parses() {
        let raw = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32004,"message":"nope"}}"#;
        let parsed: RpcResponse<AccountRecord> = serde_json::from_str(raw).unwrap();
        assert!(parsed.result.is_none());
        assert_eq!(parsed.error.unwrap().code, NOT_FOUND_CODE);
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let client = JsonRpcNodeClient::new("http://127.0.0.1:1");
        let addr = Address::derive(b"x");
        assert!(matches!(
            client.account(&addr).await,
            Err(QueryError::Transport(_))
        ));
        assert!(client.broadcast_tx_sync(b"tx").await.is_err());
    }
}
