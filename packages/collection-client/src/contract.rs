//! Typed access to the collection contract's fixed ABI.

use crate::provider::{ProviderError, TxRequest, WalletProvider};
use alloy_primitives::{Address, U256};
use collection_types::abi;

/// Handle to the deployed collection. Holds only the address; every call
/// goes through the provider passed in.
#[derive(Debug, Clone, Copy)]
pub struct CollectionContract {
    address: Address,
}

impl CollectionContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn total_supply<P: WalletProvider>(&self, provider: &P) -> Result<u64, ProviderError> {
        let out = provider.call(self.address, abi::encode_call(abi::TOTAL_SUPPLY)).await?;
        Ok(abi::decode_u64(&out)?)
    }

    pub async fn max_supply<P: WalletProvider>(&self, provider: &P) -> Result<u64, ProviderError> {
        let out = provider.call(self.address, abi::encode_call(abi::MAX_SUPPLY)).await?;
        Ok(abi::decode_u64(&out)?)
    }

    /// Unit price in base units.
    pub async fn mint_price<P: WalletProvider>(&self, provider: &P) -> Result<U256, ProviderError> {
        let out = provider.call(self.address, abi::encode_call(abi::MINT_PRICE)).await?;
        Ok(abi::decode_uint(&out)?)
    }

    pub async fn remaining_supply<P: WalletProvider>(
        &self,
        provider: &P,
    ) -> Result<u64, ProviderError> {
        let out = provider
            .call(self.address, abi::encode_call(abi::REMAINING_SUPPLY))
            .await?;
        Ok(abi::decode_u64(&out)?)
    }

    pub async fn is_minting_available<P: WalletProvider>(
        &self,
        provider: &P,
    ) -> Result<bool, ProviderError> {
        let out = provider
            .call(self.address, abi::encode_call(abi::MINTING_AVAILABLE))
            .await?;
        Ok(abi::decode_bool(&out)?)
    }

    /// `mint(quantity)` paying exactly `unit_price × quantity`.
    ///
    /// `None` if the payment overflows `uint256`.
    pub fn mint_tx(
        &self,
        from: Address,
        quantity: u32,
        unit_price: U256,
        gas_per_token: u64,
    ) -> Option<TxRequest> {
        let value = unit_price.checked_mul(U256::from(quantity))?;
        Some(TxRequest {
            from,
            to: self.address,
            data: abi::encode_call_uint(abi::MINT, U256::from(quantity)),
            value,
            gas: gas_per_token.saturating_mul(u64::from(quantity)),
        })
    }
}
