//! Base-unit ↔ display conversions for the native currency.

use alloy_primitives::{utils, U256};

/// Decimals of the native currency (wei → ether).
pub const ETHER_DECIMALS: u8 = 18;

/// Base units per displayed thousandth (10^15 wei).
const MILLI_ETHER: u64 = 1_000_000_000_000_000;

/// Format a base-unit amount as a decimal string, trimming trailing zeros
/// but keeping at least one fractional digit (`0.11`, `1.0`).
pub fn format_ether(wei: U256) -> String {
    let full = utils::format_ether(wei);
    match full.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{int}.0")
            } else {
                format!("{int}.{frac}")
            }
        }
        None => format!("{full}.0"),
    }
}

/// Display string for `price × quantity`, rounded half-up to three decimals.
///
/// Computed in base units so the displayed figure never drifts from the
/// exact product; the on-chain value is derived separately.
pub fn total_cost_display(price_wei: U256, quantity: u32) -> String {
    let milli = U256::from(MILLI_ETHER);
    let cost = price_wei.saturating_mul(U256::from(quantity));
    let thousandths = cost.saturating_add(milli / U256::from(2u8)) / milli;
    let (int, frac) = thousandths.div_rem(U256::from(1000u16));
    format!("{int}.{:03}", frac.to::<u64>())
}
