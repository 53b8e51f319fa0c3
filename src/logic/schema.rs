//! Schema Validation
//!
//! Resolves the required transaction fields against a dataset header.
//! Matching is case-insensitive and ignores surrounding whitespace;
//! extra columns are left alone and flow through to the output.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::logic::dataset::Dataset;

/// Names of the fields the pipeline needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub date: String,
    pub merchant: String,
    pub category: String,
    pub amount: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            merchant: "merchant".to_string(),
            category: "category".to_string(),
            amount: "amount".to_string(),
        }
    }
}

impl Schema {
    /// Required field names in declaration order
    pub fn required_fields(&self) -> [&str; 4] {
        [&self.date, &self.merchant, &self.category, &self.amount]
    }
}

/// Actual dataset column names bound to each required field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: String,
    pub merchant: String,
    pub category: String,
    pub amount: String,
}

/// A dataset that passed validation, with its resolved columns
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    pub dataset: Dataset,
    pub columns: ColumnMap,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Find the dataset column matching `field`; first match wins
fn resolve<'a>(columns: &'a [String], field: &str) -> Option<&'a String> {
    let wanted = normalize_name(field);
    columns.iter().find(|c| normalize_name(c) == wanted)
}

/// Check that every required field is present and the dataset is non-empty
pub fn validate(dataset: Dataset, schema: &Schema) -> Result<ValidatedDataset> {
    let columns = dataset.columns();

    let missing: Vec<String> = schema
        .required_fields()
        .iter()
        .filter(|field| resolve(columns, field).is_none())
        .map(|field| field.trim().to_string())
        .collect();

    if !missing.is_empty() {
        log::warn!("Dataset rejected, missing fields: {:?}", missing);
        return Err(AnalysisError::MissingFields { missing });
    }

    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let lookup = |field: &str| -> Result<String> {
        resolve(columns, field)
            .cloned()
            .ok_or_else(|| AnalysisError::MissingFields { missing: vec![field.to_string()] })
    };

    let column_map = ColumnMap {
        date: lookup(&schema.date)?,
        merchant: lookup(&schema.merchant)?,
        category: lookup(&schema.category)?,
        amount: lookup(&schema.amount)?,
    };

    Ok(ValidatedDataset {
        dataset,
        columns: column_map,
    })
}
