//! Encoder - Mixed records to fixed-width numeric vectors
//!
//! Numeric fields pass through unchanged; each categorical field becomes a
//! one-hot block sized by the fitted vocabulary. Values never seen at fit
//! time encode to an all-zero block.
//!
//! Batches are stored compactly: the numeric block densely, each one-hot
//! block as the position of its single active column. Memory and split
//! search cost therefore do not grow with the vocabulary size.

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};

use super::derive::FeatureRecord;
use super::layout::NUMERIC_COUNT;
use super::vocabulary::Vocabulary;
use crate::config::FeatureSet;

// ============================================================================
// FEATURE MATRIX
// ============================================================================

/// Read access to an (n_records, n_features) encoded matrix
pub trait FeatureMatrix {
    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    fn value(&self, row: usize, feature: usize) -> f64;

    /// Features that are not constant over `rows`, with their min and max,
    /// in ascending feature order
    fn varying_features(&self, rows: &[usize]) -> Vec<(usize, f64, f64)>;
}

fn column_range(rows: &[usize], value: impl Fn(usize) -> f64) -> (f64, f64) {
    rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
        let v = value(i);
        (lo.min(v), hi.max(v))
    })
}

impl<S: Data<Elem = f64>> FeatureMatrix for ArrayBase<S, Ix2> {
    fn nrows(&self) -> usize {
        self.dim().0
    }

    fn ncols(&self) -> usize {
        self.dim().1
    }

    fn value(&self, row: usize, feature: usize) -> f64 {
        self[[row, feature]]
    }

    fn varying_features(&self, rows: &[usize]) -> Vec<(usize, f64, f64)> {
        (0..self.dim().1)
            .filter_map(|feature| {
                let (min, max) = column_range(rows, |i| self[[i, feature]]);
                (max > min).then_some((feature, min, max))
            })
            .collect()
    }
}

// ============================================================================
// ENCODED BATCH
// ============================================================================

/// Compact encoded batch
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    /// (n_records, NUMERIC_COUNT)
    numeric: Array2<f64>,

    /// (n_records, n_blocks); `None` = value unseen at fit time
    active: Array2<Option<usize>>,

    /// First encoded column of each one-hot block
    block_offsets: Vec<usize>,

    width: usize,
}

impl EncodedBatch {
    pub fn dim(&self) -> (usize, usize) {
        (self.numeric.nrows(), self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.nrows() == 0
    }

    /// Encoded row as a dense vector
    pub fn row_values(&self, row: usize) -> Vec<f64> {
        (0..self.width).map(|feature| self.value(row, feature)).collect()
    }

    /// Dense (n_records, width) copy
    pub fn to_dense(&self) -> Array2<f64> {
        Array2::from_shape_fn(self.dim(), |(row, feature)| self.value(row, feature))
    }

    /// Number of stored cells, independent of the vocabulary size
    pub fn stored_len(&self) -> usize {
        self.numeric.len() + self.active.len()
    }
}

impl FeatureMatrix for EncodedBatch {
    fn nrows(&self) -> usize {
        self.numeric.nrows()
    }

    fn ncols(&self) -> usize {
        self.width
    }

    fn value(&self, row: usize, feature: usize) -> f64 {
        if feature < NUMERIC_COUNT {
            return self.numeric[[row, feature]];
        }

        match self.block_offsets.iter().rposition(|&offset| offset <= feature) {
            Some(block) => match self.active[[row, block]] {
                Some(position) if self.block_offsets[block] + position == feature => 1.0,
                _ => 0.0,
            },
            None => 0.0,
        }
    }

    fn varying_features(&self, rows: &[usize]) -> Vec<(usize, f64, f64)> {
        let mut varying: Vec<(usize, f64, f64)> = (0..NUMERIC_COUNT)
            .filter_map(|feature| {
                let (min, max) = column_range(rows, |i| self.numeric[[i, feature]]);
                (max > min).then_some((feature, min, max))
            })
            .collect();

        // A one-hot column varies iff some, but not all, rows activate it
        for (block, &offset) in self.block_offsets.iter().enumerate() {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for &i in rows {
                if let Some(position) = self.active[[i, block]] {
                    *counts.entry(position).or_default() += 1;
                }
            }
            varying.extend(
                counts
                    .into_iter()
                    .filter(|&(_, count)| count < rows.len())
                    .map(|(position, _)| (offset + position, 0.0, 1.0)),
            );
        }

        varying
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// Encoded representation of one feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedVector {
    pub values: Vec<f64>,
}

impl EncodedVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fit the category vocabulary
pub fn fit(records: &[FeatureRecord], feature_set: FeatureSet) -> Vocabulary {
    Vocabulary::fit(records, feature_set)
}

/// Numeric passthrough block, in layout order
fn numeric_values(record: &FeatureRecord) -> [f64; NUMERIC_COUNT] {
    [record.amount, f64::from(record.weekday)]
}

/// Encode one record against a fitted vocabulary
pub fn encode(record: &FeatureRecord, vocabulary: &Vocabulary) -> EncodedVector {
    let mut values = vec![0.0; vocabulary.width()];
    values[..NUMERIC_COUNT].copy_from_slice(&numeric_values(record));

    let mut offset = NUMERIC_COUNT;
    for block in &vocabulary.blocks {
        if let Some(position) = block.position(block.field.value_of(record)) {
            values[offset + position] = 1.0;
        }
        offset += block.width();
    }

    EncodedVector { values }
}

/// Encode a batch against a fitted vocabulary
pub fn encode_batch(records: &[FeatureRecord], vocabulary: &Vocabulary) -> EncodedBatch {
    let n = records.len();
    let mut numeric = Array2::<f64>::zeros((n, NUMERIC_COUNT));
    let mut active = Array2::<Option<usize>>::from_elem((n, vocabulary.blocks.len()), None);

    for (i, record) in records.iter().enumerate() {
        for (feature, value) in numeric_values(record).into_iter().enumerate() {
            numeric[[i, feature]] = value;
        }
        for (b, block) in vocabulary.blocks.iter().enumerate() {
            active[[i, b]] = block.position(block.field.value_of(record));
        }
    }

    let block_offsets = vocabulary
        .blocks
        .iter()
        .scan(NUMERIC_COUNT, |offset, block| {
            let start = *offset;
            *offset += block.width();
            Some(start)
        })
        .collect();

    EncodedBatch {
        numeric,
        active,
        block_offsets,
        width: vocabulary.width(),
    }
}
