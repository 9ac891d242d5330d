//! Fixed ABI of the collection contract.
//!
//! Only zero-argument views and `mint(uint256)` are called, so calldata is
//! a selector optionally followed by a single 32-byte word.

use crate::error::AbiError;
use alloy_primitives::{keccak256, Bytes, Selector, U256};

pub const TOTAL_SUPPLY: &str = "totalSupply()";
pub const MAX_SUPPLY: &str = "MAX_SUPPLY()";
pub const MINT_PRICE: &str = "MINT_PRICE()";
pub const REMAINING_SUPPLY: &str = "getRemainingSupply()";
pub const MINTING_AVAILABLE: &str = "isMintingAvailable()";
pub const MINT: &str = "mint(uint256)";

/// Custom errors raised by the contract's `mint`.
pub const MAX_SUPPLY_EXCEEDED: &str = "MaxSupplyExceeded()";
pub const INCORRECT_PAYMENT: &str = "IncorrectPayment()";

const ERROR_STRING: &str = "Error(string)";
const WORD: usize = 32;

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature)[..4])
}

/// Calldata for a zero-argument function.
pub fn encode_call(signature: &str) -> Bytes {
    Bytes::copy_from_slice(selector(signature).as_slice())
}

/// Calldata for a function taking one `uint256`.
pub fn encode_call_uint(signature: &str, arg: U256) -> Bytes {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(selector(signature).as_slice());
    data.extend_from_slice(&arg.to_be_bytes::<WORD>());
    data.into()
}

pub fn decode_uint(data: &[u8]) -> Result<U256, AbiError> {
    if data.len() < WORD {
        return Err(AbiError::ShortData(data.len()));
    }
    Ok(U256::from_be_slice(&data[..WORD]))
}

pub fn decode_u64(data: &[u8]) -> Result<u64, AbiError> {
    let value = decode_uint(data)?;
    if value > U256::from(u64::MAX) {
        return Err(AbiError::Overflow);
    }
    Ok(value.to::<u64>())
}

pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    match decode_uint(data)? {
        v if v.is_zero() => Ok(false),
        v if v == U256::from(1u8) => Ok(true),
        _ => Err(AbiError::InvalidBool),
    }
}

/// Human-readable revert reason from revert data.
///
/// Known custom errors decode to their bare names (`MaxSupplyExceeded`),
/// `Error(string)` to its message. Anything else is `None`.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let sel = &data[..4];
    for known in [MAX_SUPPLY_EXCEEDED, INCORRECT_PAYMENT] {
        if sel == selector(known).as_slice() {
            return known.strip_suffix("()").map(str::to_owned);
        }
    }
    if sel == selector(ERROR_STRING).as_slice() {
        return decode_string(&data[4..]);
    }
    None
}

fn decode_string(body: &[u8]) -> Option<String> {
    let offset = usize::try_from(decode_u64(body).ok()?).ok()?;
    let len_word = body.get(offset..offset.checked_add(WORD)?)?;
    let len = usize::try_from(decode_u64(len_word).ok()?).ok()?;
    let start = offset + WORD;
    let bytes = body.get(start..start.checked_add(len)?)?;
    String::from_utf8(bytes.to_vec()).ok()
}
