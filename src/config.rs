//! Configuration module
//!
//! Per-call pipeline configuration. Nothing here is process-global:
//! callers build an `AnalysisConfig` and hand it to the pipeline.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{AnalysisError, Result};
use crate::logic::schema::Schema;

/// Which fields feed the outlier model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// Numeric amount + weekday, one-hot merchant + category
    #[default]
    Full,
    /// Numeric amount + weekday only
    AmountOnly,
}

/// Isolation forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of isolation trees
    pub n_estimators: usize,

    /// Per-tree subsample size; `None` = min(256, n)
    pub max_samples: Option<usize>,

    /// Seed for every random draw made while fitting
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: constants::DEFAULT_N_ESTIMATORS,
            max_samples: None,
            seed: constants::DEFAULT_SEED,
        }
    }
}

impl ForestParams {
    /// Effective subsample size for a training population of `n`
    pub fn sample_size(&self, n: usize) -> usize {
        self.max_samples
            .unwrap_or(constants::DEFAULT_MAX_SAMPLES_CAP)
            .min(n)
            .max(1)
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Expected fraction of anomalous records, in (0, 0.5]
    pub contamination: f64,

    /// Number of ranked records to return; <= 0 means all
    pub top_n: i64,

    /// Model feature breadth
    pub feature_set: FeatureSet,

    /// Forest hyper-parameters
    pub forest: ForestParams,

    /// Required field names
    pub schema: Schema,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            contamination: constants::DEFAULT_CONTAMINATION,
            top_n: constants::DEFAULT_TOP_N,
            feature_set: FeatureSet::default(),
            forest: ForestParams::default(),
            schema: Schema::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            contamination: constants::get_contamination(),
            top_n: constants::get_top_n(),
            feature_set: if constants::is_amount_only() {
                FeatureSet::AmountOnly
            } else {
                FeatureSet::Full
            },
            forest: ForestParams {
                n_estimators: constants::get_n_estimators(),
                max_samples: constants::get_max_samples(),
                seed: constants::get_seed(),
            },
            schema: Schema::default(),
        }
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn with_top_n(mut self, top_n: i64) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_feature_set(mut self, feature_set: FeatureSet) -> Self {
        self.feature_set = feature_set;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.forest.seed = seed;
        self
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_contamination(self.contamination)?;

        if self.forest.n_estimators == 0 {
            return Err(AnalysisError::Config(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        if self.forest.max_samples == Some(0) {
            return Err(AnalysisError::Config(
                "max_samples must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Contamination must lie in (0, 0.5]
pub fn validate_contamination(contamination: f64) -> Result<()> {
    if !contamination.is_finite()
        || contamination <= 0.0
        || contamination > constants::MAX_CONTAMINATION
    {
        return Err(AnalysisError::Config(format!(
            "contamination must be in (0, {}], got {}",
            constants::MAX_CONTAMINATION,
            contamination
        )));
    }
    Ok(())
}
