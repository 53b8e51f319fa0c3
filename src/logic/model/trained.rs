//! Trained Model - Forest + Vocabulary + Threshold
//!
//! Immutable once trained. Callers scoring several batches that must be
//! comparable reuse the same `TrainedModel` instead of retraining.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::forest::IsolationForest;
use super::threshold::{ContaminationThreshold, ThresholdStats};
use crate::config::{validate_contamination, ForestParams};
use crate::error::{AnalysisError, Result};
use crate::logic::features::layout::{validate_layout, FEATURE_VERSION};
use crate::logic::features::{EncodedBatch, FeatureMatrix, LayoutInfo, Vocabulary};

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub training_size: usize,
    pub n_estimators: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub(crate) metadata: ModelMetadata,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) layout: LayoutInfo,
    pub(crate) forest: IsolationForest,
    pub(crate) threshold: ContaminationThreshold,
}

impl TrainedModel {
    /// Fit the forest and the contamination threshold on encoded vectors
    pub fn train(
        vectors: &EncodedBatch,
        vocabulary: Vocabulary,
        contamination: f64,
        params: &ForestParams,
    ) -> Result<Self> {
        validate_contamination(contamination)?;

        let layout = vocabulary.layout();
        if vectors.ncols() != layout.feature_count {
            return Err(AnalysisError::Model(format!(
                "training vectors have width {}, vocabulary defines {}",
                vectors.ncols(),
                layout.feature_count
            )));
        }

        let forest = IsolationForest::fit(vectors, params)?;
        let training_signals = forest.score_samples(vectors)?;
        let threshold = ContaminationThreshold::fit(&training_signals, contamination)?;

        let metadata = ModelMetadata {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            training_size: vectors.nrows(),
            n_estimators: params.n_estimators,
            seed: params.seed,
        };

        log::info!(
            "Trained model {} on {} records ({} features, contamination {}, offset {:.6})",
            metadata.id,
            metadata.training_size,
            layout.feature_count,
            contamination,
            threshold.offset
        );

        Ok(Self {
            metadata,
            vocabulary,
            layout,
            forest,
            threshold,
        })
    }

    /// One raw signal per row; lower (more negative) = more anomalous
    pub fn score(&self, vectors: &EncodedBatch) -> Result<Vec<f64>> {
        if vectors.ncols() != self.layout.feature_count {
            return Err(AnalysisError::Model(format!(
                "encoded width mismatch: model trained on {} features, got {}",
                self.layout.feature_count,
                vectors.ncols()
            )));
        }

        Ok(self
            .forest
            .score_samples(vectors)?
            .into_iter()
            .map(|s| self.threshold.decision(s))
            .collect())
    }

    /// Binary labels from raw signals, using the fitted threshold
    pub fn labels(&self, raw_signals: &[f64]) -> Vec<bool> {
        raw_signals.iter().map(|&s| self.threshold.is_anomaly(s)).collect()
    }

    pub fn threshold_stats(&self, raw_signals: &[f64]) -> ThresholdStats {
        self.threshold.stats(raw_signals)
    }

    pub fn contamination(&self) -> f64 {
        self.threshold.contamination
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn layout(&self) -> &LayoutInfo {
        &self.layout
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Structural consistency of a (possibly restored) model
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(AnalysisError::CorruptArtifact(reason));

        if validate_contamination(self.threshold.contamination).is_err() {
            return invalid(format!(
                "contamination {} out of range",
                self.threshold.contamination
            ));
        }
        if !self.threshold.offset.is_finite() {
            return invalid("non-finite threshold offset".to_string());
        }
        if !self.vocabulary.is_well_formed() {
            return invalid("vocabulary blocks are malformed".to_string());
        }
        if self.layout.version != FEATURE_VERSION {
            return invalid(format!(
                "feature layout v{} is not supported (current v{})",
                self.layout.version, FEATURE_VERSION
            ));
        }
        if let Err(e) = validate_layout(&self.vocabulary.layout(), &self.layout) {
            return invalid(e.to_string());
        }
        if self.forest.n_features() != self.layout.feature_count {
            return invalid(format!(
                "forest expects {} features, layout defines {}",
                self.forest.n_features(),
                self.layout.feature_count
            ));
        }
        if !self.forest.is_well_formed() {
            return invalid("isolation trees are malformed".to_string());
        }

        Ok(())
    }
}
