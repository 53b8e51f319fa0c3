//! Category Vocabulary
//!
//! Distinct categorical values seen at fit time, each with a fixed
//! position inside its field's one-hot block. Frozen once fitted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::derive::FeatureRecord;
use super::layout::{one_hot_name, LayoutInfo, NUMERIC_COUNT, NUMERIC_FEATURES};
use crate::config::FeatureSet;

/// Categorical fields that can be one-hot encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Merchant,
    Category,
}

impl CategoricalField {
    pub fn name(&self) -> &'static str {
        match self {
            CategoricalField::Merchant => "merchant",
            CategoricalField::Category => "category",
        }
    }

    pub fn value_of<'a>(&self, record: &'a FeatureRecord) -> &'a str {
        match self {
            CategoricalField::Merchant => &record.merchant,
            CategoricalField::Category => &record.category,
        }
    }
}

/// Fields one-hot encoded for a feature set, in block order
pub fn categorical_fields(feature_set: FeatureSet) -> &'static [CategoricalField] {
    match feature_set {
        FeatureSet::Full => &[CategoricalField::Merchant, CategoricalField::Category],
        FeatureSet::AmountOnly => &[],
    }
}

/// One field's one-hot block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBlock {
    pub field: CategoricalField,
    /// Sorted, de-duplicated; index = position inside the block
    pub values: Vec<String>,
}

impl CategoryBlock {
    /// Position of a value, `None` when it was never seen at fit time
    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.binary_search_by(|v| v.as_str().cmp(value)).ok()
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    fn is_well_formed(&self) -> bool {
        self.values.windows(2).all(|w| w[0] < w[1])
    }
}

/// Fitted category vocabulary for every encoded field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub feature_set: FeatureSet,
    pub blocks: Vec<CategoryBlock>,
}

impl Vocabulary {
    /// Collect the distinct values of each categorical field
    pub fn fit(records: &[FeatureRecord], feature_set: FeatureSet) -> Self {
        let blocks = categorical_fields(feature_set)
            .iter()
            .map(|&field| {
                let distinct: BTreeSet<&str> = records.iter().map(|r| field.value_of(r)).collect();
                CategoryBlock {
                    field,
                    values: distinct.into_iter().map(str::to_string).collect(),
                }
            })
            .collect::<Vec<_>>();

        for block in &blocks {
            log::debug!("Vocabulary '{}': {} categories", block.field.name(), block.width());
        }

        Self { feature_set, blocks }
    }

    /// Encoded vector width
    pub fn width(&self) -> usize {
        NUMERIC_COUNT + self.blocks.iter().map(CategoryBlock::width).sum::<usize>()
    }

    /// Column names in vector order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        for block in &self.blocks {
            names.extend(block.values.iter().map(|v| one_hot_name(block.field.name(), v)));
        }
        names
    }

    pub fn layout(&self) -> LayoutInfo {
        LayoutInfo::from_names(&self.feature_names())
    }

    /// Blocks match the feature set and every block is sorted and unique
    pub fn is_well_formed(&self) -> bool {
        let expected: Vec<CategoricalField> = categorical_fields(self.feature_set).to_vec();
        let actual: Vec<CategoricalField> = self.blocks.iter().map(|b| b.field).collect();
        expected == actual && self.blocks.iter().all(CategoryBlock::is_well_formed)
    }
}
