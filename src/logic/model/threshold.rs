//! Contamination Threshold
//!
//! Turns the forest's normality signal into a binary label. The offset is
//! the `contamination` quantile of the training signals, fitted once and
//! reused unchanged for every later batch.

use serde::{Deserialize, Serialize};

use crate::config::validate_contamination;
use crate::error::{AnalysisError, Result};

/// Linear-interpolated quantile (`q` in [0, 1]) of unsorted values
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Threshold fitted on the training distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationThreshold {
    pub contamination: f64,

    /// Training-signal quantile subtracted from every score
    pub offset: f64,
}

impl ContaminationThreshold {
    /// Fit on the training normality signals (higher = more normal)
    pub fn fit(training_signals: &[f64], contamination: f64) -> Result<Self> {
        validate_contamination(contamination)?;

        let offset = quantile(training_signals, contamination).ok_or_else(|| {
            AnalysisError::Model("cannot fit threshold on zero training signals".to_string())
        })?;

        if !offset.is_finite() {
            return Err(AnalysisError::Model(format!("non-finite threshold offset {}", offset)));
        }

        Ok(Self {
            contamination,
            offset,
        })
    }

    /// Shift a normality signal so that negative = anomalous
    pub fn decision(&self, signal: f64) -> f64 {
        signal - self.offset
    }

    pub fn is_anomaly(&self, raw_signal: f64) -> bool {
        raw_signal < 0.0
    }

    /// Summary of how the threshold labels a batch of raw signals
    pub fn stats(&self, raw_signals: &[f64]) -> ThresholdStats {
        ThresholdStats {
            offset: self.offset,
            contamination: self.contamination,
            sample_count: raw_signals.len(),
            flagged_count: raw_signals.iter().filter(|&&s| self.is_anomaly(s)).count(),
        }
    }
}

/// Threshold statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub offset: f64,
    pub contamination: f64,
    pub sample_count: usize,
    pub flagged_count: usize,
}
