//! Wallet provider capability.
//!
//! Everything the workflow needs from a wallet (browser extension or a node
//! with unlocked accounts) goes through [`WalletProvider`], so the workflow
//! runs the same against [`crate::JsonRpcProvider`] and in-memory fakes.

use alloy_primitives::{Address, Bytes, B256, U256};
use collection_types::abi;
use std::fmt;

pub type TxHash = B256;

/// A payable contract call to be signed and submitted by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    /// Exact payment in base units.
    pub value: U256,
    pub gas: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// `false` when the transaction was mined but reverted.
    pub success: bool,
    pub block_number: Option<u64>,
}

/// Capability interface over the wallet.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Already-authorized accounts (`eth_accounts`). Never prompts.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Interactive authorization (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Read-only contract call (`eth_call` at latest block).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Sign and submit; resolves to the hash once the wallet accepted it.
    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, ProviderError>;

    /// Block until the transaction is mined.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ProviderError>;
}

/// Failure reported by the provider or its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// EIP-1193 / JSON-RPC error code, if the provider returned one.
    pub code: Option<i64>,
    pub message: String,
    /// Revert data attached to execution errors.
    pub data: Option<Bytes>,
}

impl ProviderError {
    /// EIP-1193: the user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// JSON-RPC: method not found.
    pub const METHOD_NOT_FOUND: i64 = -32601;

    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(Self::USER_REJECTED)
    }

    /// `true` if the message or the decoded revert data contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        if self.message.contains(needle) {
            return true;
        }
        self.data
            .as_ref()
            .and_then(|d| abi::decode_revert(d))
            .is_some_and(|reason| reason.contains(needle))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "provider error {code}: {}", self.message),
            None => write!(f, "provider error: {}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<collection_types::AbiError> for ProviderError {
    fn from(e: collection_types::AbiError) -> Self {
        Self::new(None, format!("invalid contract response: {e}"))
    }
}

// --- In-memory wallet for workflow tests ---
