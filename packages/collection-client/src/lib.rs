//! # Collection Client
//!
//! Reads collection statistics from a deployed NFT contract and submits
//! payable `mint` transactions through a wallet provider.
//!
//! ## Quick Start
//! ```bash
//! COLLECTION_CONTRACT_ADDRESS=0x... cargo run --bin collection-client -- home
//! ```
//!
//! ## Pieces
//! - [`WalletProvider`] - capability interface over the wallet/node
//! - [`JsonRpcProvider`] - HTTP JSON-RPC provider with failover
//! - [`CollectionClient`] - connection, refresh and mint workflow

mod client;
pub mod config;
pub mod contract;
mod error;
pub mod metrics;
pub mod provider;
pub mod rpc;
mod state;

pub use client::CollectionClient;
pub use config::{ClientConfig, Config};
pub use error::{ClientError, Error, ErrorKind};
pub use provider::{ProviderError, TxHash, TxReceipt, TxRequest, WalletProvider};
pub use rpc::JsonRpcProvider;
pub use state::{CollectionState, MintPhase, MintRequest, View, WalletConnection};
