//! JSON-RPC wallet provider with primary → fallback failover and circuit breaker.
//!
//! Talks to a node that manages accounts itself (`eth_accounts`,
//! `eth_sendTransaction`), e.g. a dev node with unlocked accounts or a
//! signing proxy.

use crate::config::Config;
use crate::metrics::METRICS;
use crate::provider::{ProviderError, TxHash, TxReceipt, TxRequest, WalletProvider};
use alloy_primitives::{Address, Bytes, U64};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;
const HTTP_TIMEOUT_SECS: u64 = 30;

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

/// Why a single POST failed. Only transport failures trigger failover;
/// an error object from the node means the endpoint is healthy.
enum Failure {
    Transport(String),
    Rpc(ProviderError),
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    fn into_provider_error(self) -> ProviderError {
        // Revert data is either a hex string or nested one level down.
        let data = match &self.data {
            Some(Value::String(s)) => s.parse::<Bytes>().ok(),
            Some(Value::Object(obj)) => obj
                .get("data")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Bytes>().ok()),
            _ => None,
        };
        let err = ProviderError::new(Some(self.code), self.message);
        match data {
            Some(data) => err.with_data(data),
            None => err,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptView {
    transaction_hash: TxHash,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    block_number: Option<U64>,
}

/// HTTP JSON-RPC provider.
pub struct JsonRpcProvider {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: Option<String>,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
    next_id: AtomicU64,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcProvider {
    pub fn new(primary_url: &str, fallback_url: Option<&str>) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| crate::Error::Rpc(format!("failed to build HTTP client: {e}")))?;
        info!(
            primary = primary_url,
            fallback = fallback_url.unwrap_or("none"),
            "RPC provider initialized"
        );
        Ok(Self {
            http,
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.map(str::to_string),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(300),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, crate::Error> {
        Ok(
            Self::new(&config.rpc_url, config.fallback_rpc_url.as_deref())?
                .with_receipt_polling(config.receipt_poll_interval(), config.receipt_timeout()),
        )
    }

    pub fn with_receipt_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    // --- Transport ---

    async fn post(&self, url: &str, method: &str, params: &Value) -> Result<Value, Failure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Failure::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Failure::Transport(format!("HTTP {}", resp.status())));
        }
        let resp: RpcResponse = resp
            .json()
            .await
            .map_err(|e| Failure::Transport(format!("invalid JSON-RPC response: {e}")))?;
        if let Some(err) = resp.error {
            return Err(Failure::Rpc(err.into_provider_error()));
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }

    /// Idempotent request: active endpoint first, the other one on transport failure.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let active = self.active_url();
        let err = match self.post(active, method, &params).await {
            Ok(v) => {
                self.record_success(active);
                return Ok(v);
            }
            Err(Failure::Rpc(e)) => {
                self.record_success(active);
                return Err(e);
            }
            Err(Failure::Transport(e)) => {
                self.record_failure(active);
                e
            }
        };

        let Some(other) = self.other_url(active) else {
            return Err(ProviderError::transport(format!("{method} failed: {err}")));
        };
        warn!(method, error = %err, fallback = other, "RPC request failed, trying other endpoint");
        match self.post(other, method, &params).await {
            Ok(v) => {
                self.record_success(other);
                Ok(v)
            }
            Err(Failure::Rpc(e)) => Err(e),
            Err(Failure::Transport(e2)) => {
                self.record_failure(other);
                Err(ProviderError::transport(format!(
                    "{method} failed on both RPCs: first={err}, second={e2}"
                )))
            }
        }
    }

    /// Non-idempotent request (transaction submission): active endpoint only.
    async fn request_once(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let active = self.active_url();
        match self.post(active, method, &params).await {
            Ok(v) => {
                self.record_success(active);
                Ok(v)
            }
            Err(Failure::Rpc(e)) => {
                self.record_success(active);
                Err(e)
            }
            Err(Failure::Transport(e)) => {
                self.record_failure(active);
                Err(ProviderError::transport(format!("{method} failed: {e}")))
            }
        }
    }

    // --- Failover / circuit breaker ---

    fn other_url(&self, url: &str) -> Option<&str> {
        let fallback = self.fallback_url.as_deref()?;
        if url == self.primary_url {
            Some(fallback)
        } else {
            Some(&self.primary_url)
        }
    }

    fn record_success(&self, url: &str) {
        if url != self.primary_url {
            return;
        }
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    fn record_failure(&self, url: &str) {
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        if url != self.primary_url {
            return;
        }
        let Some(fallback) = self.fallback_url.as_deref() else {
            return;
        };
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = %fallback,
                "Circuit breaker opened — routing to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    /// Currently active RPC URL.
    pub fn active_url(&self) -> &str {
        match self.fallback_url.as_deref() {
            Some(fallback) if self.is_circuit_open() => fallback,
            _ => &self.primary_url,
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::new(None, format!("unexpected {method} result: {e}")))
}

impl WalletProvider for JsonRpcProvider {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let v = self.request("eth_accounts", json!([])).await?;
        decode("eth_accounts", v)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        match self.request_once("eth_requestAccounts", json!([])).await {
            Ok(v) => decode("eth_requestAccounts", v),
            // Plain nodes have no authorization step; unlocked accounts are authorized.
            Err(e) if e.code == Some(ProviderError::METHOD_NOT_FOUND) => {
                debug!("eth_requestAccounts unsupported, using eth_accounts");
                self.accounts().await
            }
            Err(e) => Err(e),
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let v = self
            .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        decode("eth_call", v)
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, ProviderError> {
        let params = json!([{
            "from": tx.from,
            "to": tx.to,
            "data": tx.data,
            "value": tx.value,
            "gas": U64::from(tx.gas),
        }]);
        let v = self.request_once("eth_sendTransaction", params).await?;
        decode("eth_sendTransaction", v)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ProviderError> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            let v = self
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !v.is_null() {
                let receipt: ReceiptView = decode("eth_getTransactionReceipt", v)?;
                return Ok(TxReceipt {
                    tx_hash: receipt.transaction_hash,
                    // Pre-Byzantium receipts carry no status.
                    success: receipt.status.map_or(true, |s| s == U64::from(1)),
                    block_number: receipt.block_number.map(|n| n.to::<u64>()),
                });
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ProviderError::new(
                    None,
                    format!("timed out waiting for receipt of {tx_hash}"),
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
