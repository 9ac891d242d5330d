//! Collection state synchronization and mint submission.
//!
//! One [`CollectionClient`] backs one view session. Every operation takes
//! `&mut self`, so at most one refresh or mint runs at a time; mint phase
//! transitions are published on a watch channel for observers.

use crate::config::ClientConfig;
use crate::contract::CollectionContract;
use crate::error::ClientError;
use crate::metrics::METRICS;
use crate::provider::{ProviderError, TxHash, WalletProvider};
use crate::state::{CollectionState, MintPhase, MintRequest, View, WalletConnection};
use alloy_primitives::Address;
use collection_types::{
    explorer_tx_url, format_ether, is_valid_quantity, max_quantity, mint_button_label,
    total_cost_display,
};
use std::sync::atomic::Ordering;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub struct CollectionClient<P> {
    config: ClientConfig,
    view: View,
    contract: CollectionContract,
    /// `None` when no wallet is installed.
    provider: Option<P>,
    collection: CollectionState,
    wallet: WalletConnection,
    mint: MintRequest,
    loading: bool,
    phase: watch::Sender<MintPhase>,
}

impl<P: WalletProvider> CollectionClient<P> {
    pub fn new(config: ClientConfig, view: View, provider: Option<P>) -> Self {
        let (phase, _) = watch::channel(MintPhase::Idle);
        Self {
            contract: CollectionContract::new(config.contract_address),
            config,
            view,
            provider,
            collection: CollectionState::default(),
            wallet: WalletConnection::default(),
            mint: MintRequest::default(),
            loading: true,
            phase,
        }
    }

    /// Mount: connection check (mint view only) and the first refresh.
    pub async fn load(&mut self) {
        if self.view == View::Mint {
            self.check_connection().await;
        }
        self.fetch_collection_data().await;
    }

    // --- Connection ---

    /// Adopt an already-authorized account without prompting. Failures are logged only.
    pub async fn check_connection(&mut self) {
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        match provider.accounts().await {
            Ok(accounts) => {
                if let Some(account) = accounts.first().copied() {
                    info!(account = %account, "Wallet already connected");
                    self.wallet.connect(account);
                }
            }
            Err(e) => error!(error = %e, "Error checking connection"),
        }
    }

    /// Ask the wallet for authorization.
    pub async fn connect_wallet(&mut self) -> Result<Address, ClientError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(self.record_error(ClientError::NoWallet));
        };
        let result = provider.request_accounts().await;
        match result.map(|accounts| accounts.first().copied()) {
            Ok(Some(account)) => {
                info!(account = %account, "Wallet connected");
                self.wallet.connect(account);
                self.mint.last_error = None;
                Ok(account)
            }
            Ok(None) => {
                error!("Wallet authorized no accounts");
                Err(self.record_error(ClientError::ConnectFailed))
            }
            Err(e) => {
                error!(error = %e, "Error connecting wallet");
                Err(self.record_error(ClientError::ConnectFailed))
            }
        }
    }

    // --- Collection state ---

    /// Re-read collection state. All reads must succeed or nothing changes.
    ///
    /// Returns whether the state was replaced. Failures are logged, never surfaced.
    pub async fn fetch_collection_data(&mut self) -> bool {
        let Some(provider) = self.provider.as_ref() else {
            self.loading = false;
            return false;
        };
        METRICS.refresh_total.fetch_add(1, Ordering::Relaxed);

        let c = self.contract;
        let result = match self.view {
            View::Home => tokio::try_join!(
                c.total_supply(provider),
                c.max_supply(provider),
                c.mint_price(provider),
                c.remaining_supply(provider)
            )
            .map(|(total_supply, max_supply, mint_price, remaining_supply)| CollectionState {
                total_supply,
                max_supply,
                mint_price,
                remaining_supply,
            }),
            View::Mint => {
                let max_supply = self.collection.max_supply;
                tokio::try_join!(
                    c.mint_price(provider),
                    c.remaining_supply(provider),
                    c.total_supply(provider)
                )
                .map(|(mint_price, remaining_supply, total_supply)| CollectionState {
                    total_supply,
                    max_supply,
                    mint_price,
                    remaining_supply,
                })
            }
        };
        self.loading = false;

        match result {
            Ok(state) => {
                debug!(
                    total = state.total_supply,
                    max = state.max_supply,
                    remaining = state.remaining_supply,
                    price = %format_ether(state.mint_price),
                    "Collection state refreshed"
                );
                self.collection = state;
                true
            }
            Err(e) => {
                METRICS.refresh_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Error fetching collection data");
                false
            }
        }
    }

    /// `isMintingAvailable()`; `None` without a wallet or when the read fails.
    pub async fn minting_available(&self) -> Option<bool> {
        let provider = self.provider.as_ref()?;
        match self.contract.is_minting_available(provider).await {
            Ok(available) => Some(available),
            Err(e) => {
                warn!(error = %e, "Error reading minting availability");
                None
            }
        }
    }

    // --- Quantity ---

    /// Apply `quantity` if within `[1, min(max_per_tx, remaining)]`; otherwise no-op.
    pub fn set_quantity(&mut self, quantity: u32) -> bool {
        if !is_valid_quantity(
            quantity,
            self.collection.remaining_supply,
            self.config.max_per_tx,
        ) {
            debug!(quantity, max = self.max_quantity(), "Quantity out of range, ignored");
            return false;
        }
        self.mint.quantity = quantity;
        true
    }

    pub fn max_quantity(&self) -> u32 {
        max_quantity(self.collection.remaining_supply, self.config.max_per_tx)
    }

    // --- Mint ---

    /// Validate, sign, submit and confirm a mint of the current quantity.
    ///
    /// Phase transitions are published on [`Self::subscribe`]; `pending` and
    /// the in-flight phases are only observable there while this runs.
    pub async fn mint(&mut self) -> Result<TxHash, ClientError> {
        if self.mint.pending {
            return Err(self.record_error(ClientError::MintInProgress));
        }
        self.set_phase(MintPhase::Validating);
        let account = match self.validate() {
            Ok(account) => account,
            Err(err) => {
                warn!(error = %err, "Mint rejected");
                self.record_error(err.clone());
                self.set_phase(MintPhase::Idle);
                return Err(err);
            }
        };

        self.mint.pending = true;
        self.mint.last_error = None;
        self.mint.last_tx_hash = None;
        METRICS.mint_submitted.fetch_add(1, Ordering::Relaxed);

        let mut guard = PendingGuard { client: self };
        let result = guard.client.run_mint(account).await;
        drop(guard);
        result
    }

    async fn run_mint(&mut self, account: Address) -> Result<TxHash, ClientError> {
        let quantity = self.mint.quantity;
        match self.submit(account, quantity).await {
            Ok(tx_hash) => {
                METRICS.mint_success.fetch_add(1, Ordering::Relaxed);
                info!(tx_hash = %tx_hash, quantity, "Mint confirmed");
                self.set_phase(MintPhase::Success { tx_hash });
                self.fetch_collection_data().await;
                self.mint.quantity = 1;
                Ok(tx_hash)
            }
            Err(e) => {
                let err = ClientError::from_mint_failure(&e);
                if err == ClientError::Cancelled {
                    METRICS.mint_cancelled.fetch_add(1, Ordering::Relaxed);
                } else {
                    METRICS.mint_failed.fetch_add(1, Ordering::Relaxed);
                }
                error!(error = %e, message = %err, "Minting error");
                self.record_error(err.clone());
                self.set_phase(MintPhase::Failed { error: err.clone() });
                Err(err)
            }
        }
    }

    /// Checks against cached state only; the contract re-validates on chain.
    fn validate(&self) -> Result<Address, ClientError> {
        let account = match self.wallet.account {
            Some(account) if self.wallet.connected && self.provider.is_some() => account,
            _ => return Err(ClientError::NotConnected),
        };
        let quantity = u64::from(self.mint.quantity);
        if quantity == 0 || quantity > self.collection.remaining_supply {
            return Err(ClientError::InvalidQuantity);
        }
        Ok(account)
    }

    async fn submit(&mut self, from: Address, quantity: u32) -> Result<TxHash, ProviderError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(ProviderError::new(None, "no wallet provider"));
        };
        self.phase.send_replace(MintPhase::AwaitingSignature);

        // Authoritative price, not the cached display value.
        let unit_price = self.contract.mint_price(provider).await?;
        let tx = self
            .contract
            .mint_tx(from, quantity, unit_price, self.config.gas_per_token)
            .ok_or_else(|| ProviderError::new(None, "mint value overflows uint256"))?;
        debug!(value = %tx.value, gas = tx.gas, quantity, "Requesting mint signature");

        let tx_hash = provider.send_transaction(tx).await?;
        self.mint.last_tx_hash = Some(tx_hash);
        self.phase
            .send_replace(MintPhase::AwaitingConfirmation { tx_hash });
        info!(tx_hash = %tx_hash, "Mint submitted, awaiting confirmation");

        let receipt = provider.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(ProviderError::new(
                None,
                format!("transaction {tx_hash} reverted"),
            ));
        }
        Ok(tx_hash)
    }

    fn set_phase(&self, phase: MintPhase) {
        self.phase.send_replace(phase);
    }

    fn record_error(&mut self, err: ClientError) -> ClientError {
        self.mint.last_error = Some(err.clone());
        err
    }

    // --- Read-only view ---

    pub fn view(&self) -> View {
        self.view
    }

    pub fn collection(&self) -> &CollectionState {
        &self.collection
    }

    pub fn wallet(&self) -> &WalletConnection {
        &self.wallet
    }

    pub fn mint_request(&self) -> &MintRequest {
        &self.mint
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    /// `true` until the first refresh attempt finishes.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> MintPhase {
        self.phase.borrow().clone()
    }

    /// Receiver that observes every mint phase transition.
    pub fn subscribe(&self) -> watch::Receiver<MintPhase> {
        self.phase.subscribe()
    }

    pub fn mint_price_display(&self) -> String {
        format_ether(self.collection.mint_price)
    }

    /// `price × quantity`, three decimals. Display only.
    pub fn total_cost_display(&self) -> String {
        total_cost_display(self.collection.mint_price, self.mint.quantity)
    }

    pub fn is_sold_out(&self) -> bool {
        self.collection.remaining_supply == 0
    }

    pub fn mint_button_label(&self) -> String {
        mint_button_label(
            self.mint.quantity,
            self.collection.remaining_supply,
            self.mint.pending,
        )
    }

    /// Explorer link for the last submitted transaction.
    pub fn explorer_link(&self) -> Option<String> {
        self.mint
            .last_tx_hash
            .as_ref()
            .map(|hash| explorer_tx_url(&self.config.explorer_url, hash))
    }
}

/// Clears `pending` and returns to Idle when a mint ends, including when
/// the caller drops the `mint()` future mid-flight.
struct PendingGuard<'a, P> {
    client: &'a mut CollectionClient<P>,
}

impl<P> Drop for PendingGuard<'_, P> {
    fn drop(&mut self) {
        if self.client.phase.borrow().is_pending() {
            warn!(
                tx_hash = ?self.client.mint.last_tx_hash,
                "Mint abandoned before completion"
            );
        }
        self.client.mint.pending = false;
        self.client.phase.send_replace(MintPhase::Idle);
    }
}
