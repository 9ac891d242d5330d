//! Display helpers for the home and mint views.

use alloy_primitives::{Address, B256};

/// `0x1234...abcd` from the checksummed address.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Minted share of max supply in percent. Zero max supply renders as 0%.
pub fn progress_percent(total_supply: u64, max_supply: u64) -> f64 {
    if max_supply == 0 {
        return 0.0;
    }
    total_supply as f64 / max_supply as f64 * 100.0
}

/// Block-explorer link for a transaction. Display only.
pub fn explorer_tx_url(explorer_base: &str, tx_hash: &B256) -> String {
    format!("{}/tx/{tx_hash}", explorer_base.trim_end_matches('/'))
}

/// Label for the mint action: pending, sold out, or the quantity.
pub fn mint_button_label(quantity: u32, remaining: u64, pending: bool) -> String {
    if pending {
        "Minting...".to_string()
    } else if remaining == 0 {
        "Sold Out".to_string()
    } else {
        let plural = if quantity > 1 { "s" } else { "" };
        format!("Mint {quantity} NFT{plural}")
    }
}
