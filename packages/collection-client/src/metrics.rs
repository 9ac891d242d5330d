//! Process-wide counters (lock-free atomics).

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Reads ---
    pub refresh_total: AtomicU64,
    pub refresh_failures: AtomicU64,

    // --- Mints ---
    pub mint_submitted: AtomicU64,
    pub mint_success: AtomicU64,
    pub mint_failed: AtomicU64,
    pub mint_cancelled: AtomicU64,

    // --- RPC ---
    pub rpc_failovers: AtomicU64,
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            refresh_total: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
            mint_submitted: AtomicU64::new(0),
            mint_success: AtomicU64::new(0),
            mint_failed: AtomicU64::new(0),
            mint_cancelled: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let refresh_total = self.refresh_total.load(Ordering::Relaxed);
        let refresh_failures = self.refresh_failures.load(Ordering::Relaxed);
        let mint_submitted = self.mint_submitted.load(Ordering::Relaxed);
        let mint_success = self.mint_success.load(Ordering::Relaxed);
        let mint_failed = self.mint_failed.load(Ordering::Relaxed);
        let mint_cancelled = self.mint_cancelled.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        format!(
            "\
# HELP collection_refresh_total Collection state refresh attempts.\n\
# TYPE collection_refresh_total counter\n\
collection_refresh_total {refresh_total}\n\
# HELP collection_refresh_failures_total Refreshes aborted by a failed read.\n\
# TYPE collection_refresh_failures_total counter\n\
collection_refresh_failures_total {refresh_failures}\n\
# HELP collection_mint_submitted_total Mint workflows that passed validation.\n\
# TYPE collection_mint_submitted_total counter\n\
collection_mint_submitted_total {mint_submitted}\n\
# HELP collection_mint_success_total Mints confirmed on chain.\n\
# TYPE collection_mint_success_total counter\n\
collection_mint_success_total {mint_success}\n\
# HELP collection_mint_failed_total Mints that failed after validation.\n\
# TYPE collection_mint_failed_total counter\n\
collection_mint_failed_total {mint_failed}\n\
# HELP collection_mint_cancelled_total Mints rejected in the wallet.\n\
# TYPE collection_mint_cancelled_total counter\n\
collection_mint_cancelled_total {mint_cancelled}\n\
# HELP collection_rpc_failovers_total RPC primary-to-fallback failovers.\n\
# TYPE collection_rpc_failovers_total counter\n\
collection_rpc_failovers_total {rpc_failovers}\n\
# HELP collection_rpc_errors_total RPC transport errors.\n\
# TYPE collection_rpc_errors_total counter\n\
collection_rpc_errors_total {rpc_errors}\n"
        )
    }
}
