//! Score Normalizer
//!
//! Raw model signals (lower = more anomalous) to severities in [0, 1]
//! (higher = more anomalous), min-max scaled over the scored batch.

/// Flip and min-max scale raw signals; a batch with no spread maps to all zeros
pub fn normalize(raw_signals: &[f64]) -> Vec<f64> {
    if raw_signals.is_empty() {
        return Vec::new();
    }

    let flipped: Vec<f64> = raw_signals.iter().map(|&s| -s).collect();
    let (min, max) = flipped
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        log::debug!(
            "Degenerate score batch ({} records, no spread): all severities set to 0",
            raw_signals.len()
        );
        return vec![0.0; raw_signals.len()];
    }

    flipped
        .iter()
        .map(|&v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}
