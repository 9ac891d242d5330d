//! JSON-RPC provider against an in-process node.
//!
//! Covers what the unit tests cannot: real HTTP round trips, error objects
//! with revert data, receipt polling, and failover onto a live fallback.

use alloy_primitives::{Bytes, B256, U256};
use anyhow::Result;
use collection_client::contract::CollectionContract;
use collection_client::{JsonRpcProvider, ProviderError, TxRequest, WalletProvider};
use collection_types::abi;
use std::time::Duration;

use crate::utils::{ether_milli, spawn_node, NodeState, CONTRACT, MINTER};

// Nothing listens on port 1; connections are refused immediately.
const DEAD_PRIMARY: &str = "http://127.0.0.1:1";

fn mint_request(quantity: u32, unit_price: U256) -> TxRequest {
    CollectionContract::new(CONTRACT)
        .mint_tx(MINTER, quantity, unit_price, 300_000)
        .unwrap()
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_contract_reads_over_http() -> Result<()> {
    let node = spawn_node(NodeState::new(42, 1000, ether_milli(110))).await?;
    let provider = node.provider()?;
    let contract = CollectionContract::new(CONTRACT);

    assert_eq!(contract.total_supply(&provider).await?, 42);
    assert_eq!(contract.max_supply(&provider).await?, 1000);
    assert_eq!(contract.mint_price(&provider).await?, ether_milli(110));
    assert_eq!(contract.remaining_supply(&provider).await?, 958);
    assert!(contract.is_minting_available(&provider).await?);
    assert_eq!(node.state().count("eth_call"), 5);
    Ok(())
}

#[tokio::test]
async fn test_minting_unavailable_when_sold_out() -> Result<()> {
    let node = spawn_node(NodeState::new(1000, 1000, ether_milli(110))).await?;
    let provider = node.provider()?;
    assert!(!CollectionContract::new(CONTRACT).is_minting_available(&provider).await?);
    Ok(())
}

#[tokio::test]
async fn test_node_error_object_is_not_a_transport_failure() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.failing_call = Some(abi::TOTAL_SUPPLY);
    let node = spawn_node(state).await?;
    let provider = node.provider()?;

    let err = CollectionContract::new(CONTRACT)
        .total_supply(&provider)
        .await
        .unwrap_err();
    assert_eq!(err.code, Some(-32000));
    assert_eq!(err.message, "header not found");
    assert!(!provider.is_circuit_open());
    Ok(())
}

// ── Accounts ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_accounts_falls_back_to_eth_accounts() -> Result<()> {
    let node = spawn_node(NodeState::new(0, 1000, ether_milli(110))).await?;
    let provider = node.provider()?;

    assert_eq!(provider.request_accounts().await?, vec![MINTER]);
    let state = node.state();
    assert_eq!(state.count("eth_requestAccounts"), 1);
    assert_eq!(state.count("eth_accounts"), 1);
    Ok(())
}

#[tokio::test]
async fn test_request_accounts_when_supported() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.supports_request_accounts = true;
    let node = spawn_node(state).await?;
    let provider = node.provider()?;

    assert_eq!(provider.request_accounts().await?, vec![MINTER]);
    assert_eq!(node.state().count("eth_accounts"), 0);
    Ok(())
}

#[tokio::test]
async fn test_no_unlocked_accounts() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.accounts.clear();
    let node = spawn_node(state).await?;
    assert!(node.provider()?.accounts().await?.is_empty());
    Ok(())
}

// ── Transactions ────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_encodes_mint_call() -> Result<()> {
    let node = spawn_node(NodeState::new(0, 1000, ether_milli(110))).await?;
    let provider = node.provider()?;

    let tx_hash = provider
        .send_transaction(mint_request(2, ether_milli(110)))
        .await?;
    assert_eq!(tx_hash, B256::repeat_byte(1));

    let state = node.state();
    let sent = &state.sent[0];
    let data: Bytes = serde_json::from_value(sent["data"].clone())?;
    assert_eq!(data, abi::encode_call_uint(abi::MINT, U256::from(2u8)));
    let value: U256 = serde_json::from_value(sent["value"].clone())?;
    assert_eq!(value, ether_milli(220));
    assert_eq!(sent["gas"], "0x927c0");
    Ok(())
}

#[tokio::test]
async fn test_receipt_polled_until_mined() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.pending_polls = 3;
    let node = spawn_node(state).await?;
    let provider = node.provider()?;

    let tx_hash = provider
        .send_transaction(mint_request(1, ether_milli(110)))
        .await?;
    let receipt = provider.wait_for_receipt(tx_hash).await?;
    assert!(receipt.success);
    assert_eq!(receipt.tx_hash, tx_hash);
    assert_eq!(receipt.block_number, Some(16));
    assert_eq!(node.state().count("eth_getTransactionReceipt"), 4);
    assert_eq!(node.state().total_supply, 1);
    Ok(())
}

#[tokio::test]
async fn test_underpaid_mint_has_failed_status() -> Result<()> {
    let node = spawn_node(NodeState::new(0, 1000, ether_milli(110))).await?;
    let provider = node.provider()?;

    let tx_hash = provider
        .send_transaction(mint_request(2, ether_milli(100)))
        .await?;
    let receipt = provider.wait_for_receipt(tx_hash).await?;
    assert!(!receipt.success);
    assert_eq!(node.state().total_supply, 0);
    Ok(())
}

#[tokio::test]
async fn test_receipt_timeout() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.pending_polls = u32::MAX;
    let node = spawn_node(state).await?;
    let provider = JsonRpcProvider::new(&node.url, None)?
        .with_receipt_polling(Duration::from_millis(10), Duration::from_millis(50));

    let tx_hash = provider
        .send_transaction(mint_request(1, ether_milli(110)))
        .await?;
    let err = provider.wait_for_receipt(tx_hash).await.unwrap_err();
    assert!(err.message.contains("timed out waiting for receipt"));
    assert!(err.code.is_none());
    Ok(())
}

#[tokio::test]
async fn test_revert_data_survives_the_round_trip() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.revert_mint_with = Some(Bytes::copy_from_slice(
        abi::selector(abi::MAX_SUPPLY_EXCEEDED).as_slice(),
    ));
    let node = spawn_node(state).await?;

    let err = node
        .provider()?
        .send_transaction(mint_request(1, ether_milli(110)))
        .await
        .unwrap_err();
    assert_eq!(err.code, Some(3));
    assert!(err.mentions("MaxSupplyExceeded"));
    assert!(!err.is_user_rejection());
    Ok(())
}

#[tokio::test]
async fn test_user_rejection_code() -> Result<()> {
    let mut state = NodeState::new(0, 1000, ether_milli(110));
    state.reject_sends = true;
    let node = spawn_node(state).await?;

    let err = node
        .provider()?
        .send_transaction(mint_request(1, ether_milli(110)))
        .await
        .unwrap_err();
    assert_eq!(err.code, Some(ProviderError::USER_REJECTED));
    assert!(err.is_user_rejection());
    Ok(())
}

// ── Failover ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reads_fail_over_to_live_fallback() -> Result<()> {
    let node = spawn_node(NodeState::new(7, 1000, ether_milli(110))).await?;
    let provider = JsonRpcProvider::new(DEAD_PRIMARY, Some(node.url.as_str()))?;
    let contract = CollectionContract::new(CONTRACT);

    assert_eq!(contract.total_supply(&provider).await?, 7);
    assert_eq!(provider.active_url(), DEAD_PRIMARY);
    assert_eq!(provider.primary_url(), DEAD_PRIMARY);
    Ok(())
}

#[tokio::test]
async fn test_sends_never_fail_over_while_primary_is_active() -> Result<()> {
    let node = spawn_node(NodeState::new(0, 1000, ether_milli(110))).await?;
    let provider = JsonRpcProvider::new(DEAD_PRIMARY, Some(node.url.as_str()))?;

    let err = provider
        .send_transaction(mint_request(1, ether_milli(110)))
        .await
        .unwrap_err();
    assert!(err.message.contains("eth_sendTransaction failed"));
    assert!(node.state().sent.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_open_circuit_routes_everything_to_fallback() -> Result<()> {
    let node = spawn_node(NodeState::new(0, 1000, ether_milli(110))).await?;
    let provider = JsonRpcProvider::new(DEAD_PRIMARY, Some(node.url.as_str()))?;

    // Five primary failures open the circuit.
    for _ in 0..5 {
        provider.accounts().await?;
    }
    assert!(provider.is_circuit_open());
    assert_eq!(provider.active_url(), node.url);
    assert_eq!(provider.failover_count(), 1);

    provider
        .send_transaction(mint_request(1, ether_milli(110)))
        .await?;
    assert_eq!(node.state().sent.len(), 1);
    Ok(())
}
