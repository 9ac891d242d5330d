// =============================================================================
// Integration test helpers: in-process JSON-RPC node
// =============================================================================
// A minimal Ethereum node speaking just enough JSON-RPC for the collection
// client: unlocked accounts, the collection's view functions, mint
// submission and receipt polling.

use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::Result;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use collection_client::{ClientConfig, CollectionClient, JsonRpcProvider, View};
use collection_types::abi;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CONTRACT: Address = Address::new([0x11; 20]);
pub const MINTER: Address = Address::new([0xaa; 20]);

/// `milli` thousandths of an ether, in wei.
pub fn ether_milli(milli: u64) -> U256 {
    U256::from(milli) * U256::from(10u64).pow(U256::from(15u8))
}

struct Pending {
    quantity: u64,
    value: U256,
}

pub struct NodeState {
    pub accounts: Vec<Address>,
    /// `false` answers `eth_requestAccounts` with method-not-found, like a plain node.
    pub supports_request_accounts: bool,
    pub total_supply: u64,
    pub max_supply: u64,
    pub price: U256,
    /// Every `eth_call` of this selector answers with an RPC error.
    pub failing_call: Option<&'static str>,
    /// `eth_sendTransaction` fails with an `execution reverted` carrying this data.
    pub revert_mint_with: Option<Bytes>,
    /// `eth_sendTransaction` fails with code 4001.
    pub reject_sends: bool,
    /// Receipt polls answered with `null` before the transaction settles.
    pub pending_polls: u32,
    pub methods: Vec<String>,
    pub sent: Vec<Value>,
    pending: HashMap<B256, Pending>,
    next_tx: u8,
}

impl NodeState {
    pub fn new(total_supply: u64, max_supply: u64, price: U256) -> Self {
        Self {
            accounts: vec![MINTER],
            supports_request_accounts: false,
            total_supply,
            max_supply,
            price,
            failing_call: None,
            revert_mint_with: None,
            reject_sends: false,
            pending_polls: 0,
            methods: Vec::new(),
            sent: Vec::new(),
            pending: HashMap::new(),
            next_tx: 1,
        }
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods.iter().filter(|m| *m == method).count()
    }
}

pub type SharedNode = Arc<Mutex<NodeState>>;

pub struct FakeNode {
    pub url: String,
    pub state: SharedNode,
}

impl FakeNode {
    pub fn state(&self) -> std::sync::MutexGuard<'_, NodeState> {
        self.state.lock().unwrap()
    }

    /// Provider against this node alone, polling receipts quickly.
    pub fn provider(&self) -> Result<JsonRpcProvider> {
        Ok(JsonRpcProvider::new(&self.url, None)?.with_receipt_polling(
            Duration::from_millis(10),
            Duration::from_secs(5),
        ))
    }
}

/// Serve `state` on an ephemeral local port.
pub async fn spawn_node(state: NodeState) -> Result<FakeNode> {
    let state = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/", post(rpc))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(FakeNode { url, state })
}

/// Client for `view` against `node`, already loaded.
pub async fn setup_client(node: &FakeNode, view: View) -> Result<CollectionClient<JsonRpcProvider>> {
    let mut client = CollectionClient::new(ClientConfig::new(CONTRACT), view, Some(node.provider()?));
    client.load().await;
    Ok(client)
}

async fn rpc(State(state): State<SharedNode>, Json(request): Json<Value>) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request.get("params").cloned().unwrap_or_else(|| json!([]));

    let mut node = state.lock().unwrap();
    node.methods.push(method.clone());
    let outcome = match method.as_str() {
        "eth_accounts" => Ok(json!(node.accounts)),
        "eth_requestAccounts" if node.supports_request_accounts => Ok(json!(node.accounts)),
        "eth_call" => eth_call(&node, &params[0]),
        "eth_sendTransaction" => send_transaction(&mut node, &params[0]),
        "eth_getTransactionReceipt" => receipt(&mut node, &params[0]),
        _ => Err(json!({ "code": -32601, "message": format!("the method {method} does not exist") })),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    })
}

fn word(value: U256) -> Value {
    json!(Bytes::from(value.to_be_bytes::<32>().to_vec()))
}

fn eth_call(node: &NodeState, call: &Value) -> Result<Value, Value> {
    let data: Bytes = serde_json::from_value(call["data"].clone())
        .map_err(|e| json!({ "code": -32602, "message": e.to_string() }))?;
    if data.len() < 4 {
        return Err(json!({ "code": -32602, "message": "missing selector" }));
    }
    let sel = &data[..4];
    let is = |sig: &str| sel == abi::selector(sig).as_slice();

    if node.failing_call.is_some_and(|sig| is(sig)) {
        return Err(json!({ "code": -32000, "message": "header not found" }));
    }
    let remaining = node.max_supply.saturating_sub(node.total_supply);
    let value = if is(abi::TOTAL_SUPPLY) {
        U256::from(node.total_supply)
    } else if is(abi::MAX_SUPPLY) {
        U256::from(node.max_supply)
    } else if is(abi::MINT_PRICE) {
        node.price
    } else if is(abi::REMAINING_SUPPLY) {
        U256::from(remaining)
    } else if is(abi::MINTING_AVAILABLE) {
        U256::from(u8::from(remaining > 0))
    } else {
        return Err(json!({ "code": 3, "message": "execution reverted" }));
    };
    Ok(word(value))
}

fn send_transaction(node: &mut NodeState, tx: &Value) -> Result<Value, Value> {
    node.sent.push(tx.clone());
    if node.reject_sends {
        return Err(json!({ "code": 4001, "message": "User denied transaction signature." }));
    }
    if let Some(data) = &node.revert_mint_with {
        return Err(json!({ "code": 3, "message": "execution reverted", "data": data }));
    }
    let data: Bytes = serde_json::from_value(tx["data"].clone())
        .map_err(|e| json!({ "code": -32602, "message": e.to_string() }))?;
    let value: U256 = serde_json::from_value(tx["value"].clone())
        .map_err(|e| json!({ "code": -32602, "message": e.to_string() }))?;
    let quantity = abi::decode_u64(data.get(4..).unwrap_or_default())
        .map_err(|e| json!({ "code": -32602, "message": e.to_string() }))?;

    let tx_hash = B256::repeat_byte(node.next_tx);
    node.next_tx = node.next_tx.wrapping_add(1);
    node.pending.insert(tx_hash, Pending { quantity, value });
    Ok(json!(tx_hash))
}

fn receipt(node: &mut NodeState, hash: &Value) -> Result<Value, Value> {
    let tx_hash: B256 = serde_json::from_value(hash.clone())
        .map_err(|e| json!({ "code": -32602, "message": e.to_string() }))?;
    if node.pending_polls > 0 {
        node.pending_polls -= 1;
        return Ok(Value::Null);
    }
    let Some(tx) = node.pending.remove(&tx_hash) else {
        return Ok(Value::Null);
    };
    let owed = node.price * U256::from(tx.quantity);
    let fits = node.total_supply + tx.quantity <= node.max_supply;
    let success = tx.value == owed && fits;
    if success {
        node.total_supply += tx.quantity;
    }
    Ok(json!({
        "transactionHash": tx_hash,
        "status": if success { "0x1" } else { "0x0" },
        "blockNumber": "0x10",
    }))
}
