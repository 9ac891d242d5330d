//! Per-transaction quantity bounds.

/// Fixed per-transaction cap, independent of contract state.
pub const DEFAULT_MAX_PER_TX: u32 = 10;

/// Upper bound for a mint request: `min(max_per_tx, remaining)`.
/// Zero when the collection is sold out.
pub fn max_quantity(remaining: u64, max_per_tx: u32) -> u32 {
    u64::from(max_per_tx).min(remaining) as u32
}

/// `true` when `1 <= quantity <= min(max_per_tx, remaining)`.
pub fn is_valid_quantity(quantity: u32, remaining: u64, max_per_tx: u32) -> bool {
    quantity >= 1 && quantity <= max_quantity(remaining, max_per_tx)
}
