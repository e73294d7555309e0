//! A [`TransactionMonitor`] that polls a JSON-RPC node for receipts.
//!
//! Each watched hash gets its own tokio task that calls
//! `eth_getTransactionReceipt` every poll interval until a receipt appears.
//! Unsubscribing aborts the task and drops the callback.

use std::time::Duration;

use serde_json::{json, Value};
use synthstake_types::TxHash;
use tokio::runtime::Handle;

use crate::error::ChainError;
use crate::monitor::{SettleCallback, Subscription, TransactionMonitor, TxOutcome, WatchRegistry};

// ── RpcClient ───────────────────────────────────────────────────────────

/// Minimal JSON-RPC client for the calls the monitor needs.
#[derive(Clone)]
struct RpcClient {
    http: reqwest::Client,
    node_url: String,
}

impl RpcClient {
    fn new(node_url: String) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Rpc(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, node_url })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Rpc(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(ChainError::Rpc(format!("node error: {message}")));
        }

        Ok(json.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn receipt(&self, hash: &TxHash) -> Result<Option<TxOutcome>, ChainError> {
        let result = self
            .call("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        parse_receipt(&result)
    }
}

/// Interpret an `eth_getTransactionReceipt` result.
///
/// `null` means not mined yet. Status `0x1` is success, `0x0` a revert.
fn parse_receipt(result: &Value) -> Result<Option<TxOutcome>, ChainError> {
    if result.is_null() {
        return Ok(None);
    }
    let status = result
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::InvalidResponse("receipt has no status".into()))?;
    match status {
        "0x1" => Ok(Some(TxOutcome::Confirmed)),
        "0x0" => Ok(Some(TxOutcome::Reverted {
            reason: "transaction reverted".to_string(),
        })),
        other => Err(ChainError::InvalidResponse(format!(
            "unexpected receipt status {other}"
        ))),
    }
}

// ── RpcReceiptMonitor ───────────────────────────────────────────────────

/// Receipt-polling monitor backed by a node's JSON-RPC endpoint.
pub struct RpcReceiptMonitor {
    client: RpcClient,
    poll_interval: Duration,
    registry: WatchRegistry,
    runtime: Handle,
}

impl RpcReceiptMonitor {
    /// Create a monitor targeting `node_url`.
    ///
    /// Must be called from within a tokio runtime; polling tasks are spawned
    /// on that runtime. `poll_interval` must be non-zero.
    pub fn new(node_url: impl Into<String>, poll_interval: Duration) -> Result<Self, ChainError> {
        if poll_interval.is_zero() {
            return Err(ChainError::Config("receipt poll interval must be non-zero".into()));
        }
        let runtime = Handle::try_current().map_err(|_| ChainError::NoRuntime)?;
        Ok(Self {
            client: RpcClient::new(node_url.into())?,
            poll_interval,
            registry: WatchRegistry::new(),
            runtime,
        })
    }

    pub fn node_url(&self) -> &str {
        &self.client.node_url
    }

    /// Number of hashes still being polled.
    pub fn watching(&self) -> usize {
        self.registry.len()
    }
}

impl TransactionMonitor for RpcReceiptMonitor {
    fn watch(&self, hash: TxHash, on_settled: SettleCallback) -> Subscription {
        let id = self.registry.insert(hash, on_settled);
        let client = self.client.clone();
        let registry = self.registry.clone();
        let poll_interval = self.poll_interval;

        let task = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                match client.receipt(&hash).await {
                    Ok(Some(outcome)) => {
                        tracing::info!(%hash, ?outcome, "transaction settled");
                        registry.settle(hash, outcome);
                        break;
                    }
                    Ok(None) => {
                        tracing::trace!(%hash, "receipt not available yet");
                    }
                    Err(e) => {
                        tracing::warn!(%hash, error = %e, "receipt poll failed");
                    }
                }
            }
        });

        let registry = self.registry.clone();
        let abort = task.abort_handle();
        Subscription::new(move || {
            registry.cancel(id);
            abort.abort();
        })
    }
}
