//! Pipeline Module - Anomaly Scoring Entry Points
//!
//! raw dataset → schema validation → feature derivation → encoding →
//! isolation forest (fit, score) → normalization → ranking.
//!
//! Every call is synchronous and self-contained. The only value that may
//! outlive a call is the immutable `TrainedModel`.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::logic::dataset::Dataset;
use crate::logic::features::{derive_batch, encode_batch, encoder, DerivedBatch, DroppedRow};
use crate::logic::model::{ThresholdStats, TrainedModel};
use crate::logic::schema::{self, ValidatedDataset};
use crate::logic::scoring::{normalize, rank_and_select, ScoredRecord};

#[cfg(test)]
mod tests;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Every surviving record of one batch, in dataset order
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub records: Vec<ScoredRecord>,
    pub dropped: Vec<DroppedRow>,
    /// Rows in the submitted dataset, dropped ones included
    pub total: usize,
    pub stats: ThresholdStats,
}

/// Ranked result of one analysis call
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub total_transactions: usize,
    pub scored_transactions: usize,
    pub dropped_rows: Vec<DroppedRow>,
    pub flagged_transactions: usize,
    pub returned_transactions: usize,
    pub contamination: f64,
    pub top_n: i64,
    pub anomalies: Vec<ScoredRecord>,
}

// ============================================================================
// OPERATIONS
// ============================================================================

fn prepare(dataset: Dataset, config: &AnalysisConfig) -> Result<(ValidatedDataset, DerivedBatch)> {
    let validated = schema::validate(dataset, &config.schema)?;
    let batch = derive_batch(&validated)?;
    Ok((validated, batch))
}

fn fit_model(batch: &DerivedBatch, config: &AnalysisConfig) -> Result<TrainedModel> {
    let vocabulary = encoder::fit(&batch.records, config.feature_set);
    let matrix = encode_batch(&batch.records, &vocabulary);
    TrainedModel::train(&matrix, vocabulary, config.contamination, &config.forest)
}

fn score_prepared(model: &TrainedModel, validated: &ValidatedDataset, batch: DerivedBatch) -> Result<ScoredBatch> {
    let matrix = encode_batch(&batch.records, model.vocabulary());
    let raw = model.score(&matrix)?;
    let severities = normalize(&raw);
    let labels = model.labels(&raw);

    let records = batch
        .records
        .iter()
        .zip(severities.into_iter().zip(labels))
        .map(|(features, (anomaly_score, is_anomaly))| {
            let source = validated.dataset.get(features.ordinal).ok_or_else(|| {
                AnalysisError::Model(format!("no source record for ordinal {}", features.ordinal))
            })?;
            Ok(ScoredRecord {
                ordinal: features.ordinal,
                fields: source.fields.clone(),
                anomaly_score,
                is_anomaly,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScoredBatch {
        records,
        dropped: batch.dropped,
        total: validated.dataset.len(),
        stats: model.threshold_stats(&raw),
    })
}

/// Fit a model on `dataset` with `config`
pub fn train(dataset: Dataset, config: &AnalysisConfig) -> Result<TrainedModel> {
    config.validate()?;
    let (_, batch) = prepare(dataset, config)?;
    fit_model(&batch, config)
}

/// Score a batch against an existing model
///
/// The model's vocabulary and threshold are reused as they are; the
/// feature breadth is the model's, `config.feature_set` is ignored here.
pub fn score(model: &TrainedModel, dataset: Dataset, config: &AnalysisConfig) -> Result<ScoredBatch> {
    let (validated, batch) = prepare(dataset, config)?;
    score_prepared(model, &validated, batch)
}

/// Rank an already scored batch into a report
pub fn report(batch: ScoredBatch, contamination: f64, top_n: i64) -> AnalysisReport {
    let scored_transactions = batch.records.len();
    let anomalies = rank_and_select(batch.records, top_n);

    log::info!(
        "Analysis complete: {} rows, {} scored, {} dropped, {} flagged, {} returned",
        batch.total,
        scored_transactions,
        batch.dropped.len(),
        batch.stats.flagged_count,
        anomalies.len()
    );

    AnalysisReport {
        total_transactions: batch.total,
        scored_transactions,
        dropped_rows: batch.dropped,
        flagged_transactions: batch.stats.flagged_count,
        returned_transactions: anomalies.len(),
        contamination,
        top_n,
        anomalies,
    }
}

/// Fit a model on `dataset` and score the same rows, validating and
/// deriving them once
pub fn train_and_score(dataset: Dataset, config: &AnalysisConfig) -> Result<(TrainedModel, ScoredBatch)> {
    config.validate()?;

    let (validated, batch) = prepare(dataset, config)?;
    let model = fit_model(&batch, config)?;
    let scored = score_prepared(&model, &validated, batch)?;

    Ok((model, scored))
}

/// Train on the dataset, score it, and return the ranked selection
pub fn analyze(dataset: Dataset, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let (_, scored) = train_and_score(dataset, config)?;
    Ok(report(scored, config.contamination, config.top_n))
}
