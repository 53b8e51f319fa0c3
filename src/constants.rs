//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! To change a default, only edit this file.

/// Default expected fraction of anomalous transactions
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Upper bound for contamination (inclusive)
pub const MAX_CONTAMINATION: f64 = 0.5;

/// Default number of ranked transactions returned
pub const DEFAULT_TOP_N: i64 = 20;

/// Default number of isolation trees
pub const DEFAULT_N_ESTIMATORS: usize = 200;

/// Subsample cap per isolation tree
pub const DEFAULT_MAX_SAMPLES_CAP: usize = 256;

/// Default random seed
pub const DEFAULT_SEED: u64 = 42;

/// Sentinel weekday for unparsable dates
pub const UNKNOWN_WEEKDAY: i8 = -1;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "FinGuard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get contamination from environment or use default
pub fn get_contamination() -> f64 {
    std::env::var("FINGUARD_CONTAMINATION")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_CONTAMINATION)
}

/// Get top_n from environment or use default
pub fn get_top_n() -> i64 {
    std::env::var("FINGUARD_TOP_N")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_TOP_N)
}

/// Get tree count from environment or use default
pub fn get_n_estimators() -> usize {
    std::env::var("FINGUARD_N_ESTIMATORS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_N_ESTIMATORS)
}

/// Get random seed from environment or use default
pub fn get_seed() -> u64 {
    std::env::var("FINGUARD_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// Get explicit per-tree subsample size, if configured
pub fn get_max_samples() -> Option<usize> {
    std::env::var("FINGUARD_MAX_SAMPLES")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if the amount-only feature set is requested
pub fn is_amount_only() -> bool {
    std::env::var("FINGUARD_FEATURE_SET")
        .map(|s| s.trim().eq_ignore_ascii_case("amount_only"))
        .unwrap_or(false)
}
