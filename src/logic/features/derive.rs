//! Feature Derivation
//!
//! Turns a raw ledger row into model-ready fields: a weekday category
//! from the date and a clean numeric amount.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_WEEKDAY;
use crate::error::{AnalysisError, Result};
use crate::logic::dataset::RawRecord;
use crate::logic::schema::{ColumnMap, ValidatedDataset};

/// Date-only formats, tried in order (month-first before day-first for slashes)
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%b %d %Y",
];

/// Date-time formats; only the date part is kept
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Raw record plus derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Ordinal of the source record
    pub ordinal: usize,
    /// 0 = Monday ... 6 = Sunday, -1 = unparsable date
    pub weekday: i8,
    /// Amount with currency/formatting stripped
    pub amount: f64,
    pub merchant: String,
    pub category: String,
}

/// A row excluded because its amount could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    pub ordinal: usize,
    pub raw_amount: String,
}

/// Result of deriving a whole dataset
#[derive(Debug, Clone, Default)]
pub struct DerivedBatch {
    pub records: Vec<FeatureRecord>,
    pub dropped: Vec<DroppedRow>,
}

/// Parse the supported date shapes
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Weekday index, or -1 when the date cannot be parsed
pub fn parse_weekday(raw: &str) -> i8 {
    parse_date(raw)
        .map(|d| d.weekday().num_days_from_monday() as i8)
        .unwrap_or(UNKNOWN_WEEKDAY)
}

/// Strip currency noise and thousands separators, then parse
///
/// Accepts `1,250.00`, `$1,250`, `KES 1 250`, `-€12.5`, `(300.00)`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    let mut negative = false;

    // Accounting negatives: (300.00)
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest;
    }

    // Currency symbols/codes around the number
    let text = text.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'));
    let text = match text.strip_prefix('-') {
        Some(rest) => {
            negative = !negative;
            rest
        }
        None => text,
    };

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\'' | '\u{a0}'))
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(if negative { -value } else { value })
}

/// Derive one record; rows with an unparsable amount come back as `DroppedRow`
pub fn derive(record: &RawRecord, columns: &ColumnMap) -> std::result::Result<FeatureRecord, DroppedRow> {
    let raw_amount = record.get(&columns.amount).unwrap_or_default();

    let amount = parse_amount(raw_amount).ok_or_else(|| DroppedRow {
        ordinal: record.ordinal,
        raw_amount: raw_amount.to_string(),
    })?;

    Ok(FeatureRecord {
        ordinal: record.ordinal,
        weekday: parse_weekday(record.get(&columns.date).unwrap_or_default()),
        amount,
        merchant: record.get(&columns.merchant).unwrap_or_default().trim().to_string(),
        category: record.get(&columns.category).unwrap_or_default().trim().to_string(),
    })
}

/// Derive every record of a validated dataset
///
/// Fails with a data error only when no row has a usable amount.
pub fn derive_batch(validated: &ValidatedDataset) -> Result<DerivedBatch> {
    let mut batch = DerivedBatch::default();

    for record in validated.dataset.records() {
        match derive(record, &validated.columns) {
            Ok(features) => batch.records.push(features),
            Err(dropped) => batch.dropped.push(dropped),
        }
    }

    if batch.records.is_empty() {
        return Err(AnalysisError::Data(format!(
            "none of the {} amount values could be parsed",
            validated.dataset.len()
        )));
    }

    if !batch.dropped.is_empty() {
        log::warn!(
            "Dropped {} of {} rows with unparsable amounts (ordinals: {:?})",
            batch.dropped.len(),
            validated.dataset.len(),
            batch.dropped.iter().map(|d| d.ordinal).collect::<Vec<_>>()
        );
    }

    let unknown_dates = batch.records.iter().filter(|r| r.weekday == UNKNOWN_WEEKDAY).count();
    if unknown_dates > 0 {
        log::debug!("{} rows have unparsable dates (weekday = -1)", unknown_dates);
    }

    Ok(batch)
}
