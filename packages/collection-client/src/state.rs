//! View state owned by [`crate::CollectionClient`].

use crate::error::ClientError;
use crate::provider::TxHash;
use alloy_primitives::{Address, U256};

/// Which entry point the client backs. The home view also reads max supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Mint,
}

/// On-chain collection statistics, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionState {
    pub total_supply: u64,
    pub max_supply: u64,
    /// Unit price in base units.
    pub mint_price: U256,
    pub remaining_supply: u64,
}

impl Default for CollectionState {
    /// Placeholder values shown before the first successful refresh.
    fn default() -> Self {
        Self {
            total_supply: 0,
            max_supply: 1000,
            mint_price: U256::from(110_000_000_000_000_000u64),
            remaining_supply: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletConnection {
    pub account: Option<Address>,
    pub connected: bool,
}

impl WalletConnection {
    pub(crate) fn connect(&mut self, account: Address) {
        self.account = Some(account);
        self.connected = true;
    }
}

/// Ephemeral per-session mint form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub quantity: u32,
    /// Set for the duration of [`crate::CollectionClient::mint`]. The call
    /// holds the client borrowed, so observers watch
    /// [`MintPhase::is_pending`] on `subscribe()` instead.
    pub pending: bool,
    pub last_tx_hash: Option<TxHash>,
    pub last_error: Option<ClientError>,
}

impl Default for MintRequest {
    fn default() -> Self {
        Self {
            quantity: 1,
            pending: false,
            last_tx_hash: None,
            last_error: None,
        }
    }
}

/// Mint workflow phase, published on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MintPhase {
    #[default]
    Idle,
    Validating,
    AwaitingSignature,
    AwaitingConfirmation { tx_hash: TxHash },
    Success { tx_hash: TxHash },
    Failed { error: ClientError },
}

impl MintPhase {
    /// A transaction is being signed or confirmed.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::AwaitingSignature | Self::AwaitingConfirmation { .. }
        )
    }
}
