//! Shared types and pure-logic utilities for the collection mint client.
//! No I/O — usable from any frontend or test harness.

pub mod abi;
mod display;
mod error;
mod quantity;
mod units;

pub use display::{explorer_tx_url, group_thousands, mint_button_label, progress_percent, short_address};
pub use error::AbiError;
pub use quantity::{is_valid_quantity, max_quantity, DEFAULT_MAX_PER_TX};
pub use units::{format_ether, total_cost_display, ETHER_DECIMALS};
