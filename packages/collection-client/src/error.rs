//! Error types for the collection client.

use crate::provider::ProviderError;
use std::fmt;

/// Infrastructure error (configuration, transport setup).
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// RPC communication error.
    Rpc(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Category of a user-facing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No wallet, or authorization rejected. Retry by reconnecting.
    Connectivity,
    /// Rejected before any transaction was issued.
    Validation,
    /// The submitted (or about to be signed) transaction failed.
    Transaction,
}

/// User-facing error. `Display` is the single-line message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    NoWallet,
    ConnectFailed,
    NotConnected,
    InvalidQuantity,
    MintInProgress,
    Cancelled,
    SupplyExhausted,
    IncorrectPayment,
    MintFailed,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoWallet | Self::ConnectFailed => ErrorKind::Connectivity,
            Self::NotConnected | Self::InvalidQuantity | Self::MintInProgress => {
                ErrorKind::Validation
            }
            Self::Cancelled | Self::SupplyExhausted | Self::IncorrectPayment | Self::MintFailed => {
                ErrorKind::Transaction
            }
        }
    }

    /// Map a failure during signing/confirmation to the message shown to the user.
    pub fn from_mint_failure(err: &ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::Cancelled
        } else if err.mentions("MaxSupplyExceeded") {
            Self::SupplyExhausted
        } else if err.mentions("IncorrectPayment") {
            Self::IncorrectPayment
        } else {
            Self::MintFailed
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoWallet => "Please install MetaMask to use this dApp",
            Self::ConnectFailed => "Failed to connect wallet",
            Self::NotConnected => "Please connect your wallet first",
            Self::InvalidQuantity => "Invalid quantity",
            Self::MintInProgress => "A mint is already in progress",
            Self::Cancelled => "Transaction cancelled by user",
            Self::SupplyExhausted => "Not enough NFTs remaining",
            Self::IncorrectPayment => "Incorrect payment amount",
            Self::MintFailed => "Minting failed. Please try again.",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ClientError {}
