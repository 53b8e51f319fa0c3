//! Ranker / Selector
//!
//! Orders scored transactions by severity. Equal severities keep their
//! original dataset order, so a ranking is reproducible run to run.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const SCORE_FIELD: &str = "anomaly_score";
pub const LABEL_FIELD: &str = "is_anomaly";

/// One transaction with its original fields and its severity
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    /// Position in the uploaded dataset
    pub ordinal: usize,
    pub fields: IndexMap<String, String>,
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}

/// Serializes flat: original fields in column order, then score and label.
/// An original column named like one of the added fields is replaced.
impl Serialize for ScoredRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let passthrough: Vec<(&String, &String)> = self
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != SCORE_FIELD && k.as_str() != LABEL_FIELD)
            .collect();

        let mut map = serializer.serialize_map(Some(passthrough.len() + 2))?;
        for (key, value) in passthrough {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(SCORE_FIELD, &self.anomaly_score)?;
        map.serialize_entry(LABEL_FIELD, &self.is_anomaly)?;
        map.end()
    }
}

/// Number of records a `top_n` request returns out of `len`
pub fn selection_size(len: usize, top_n: i64) -> usize {
    if top_n <= 0 {
        len
    } else {
        usize::try_from(top_n).map_or(len, |n| n.min(len))
    }
}

/// Stable descending sort by severity, truncated to `top_n` (`<= 0` keeps all)
pub fn rank_and_select(mut records: Vec<ScoredRecord>, top_n: i64) -> Vec<ScoredRecord> {
    // `sort_by` is stable: ties stay in input order
    records.sort_by(|a, b| b.anomaly_score.total_cmp(&a.anomaly_score));
    records.truncate(selection_size(records.len(), top_n));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(ordinal: usize, score: f64) -> ScoredRecord {
        let mut fields = IndexMap::new();
        fields.insert("merchant".to_string(), format!("M{}", ordinal));
        ScoredRecord {
            ordinal,
            fields,
            anomaly_score: score,
            is_anomaly: score > 0.9,
        }
    }

    fn ordinals(records: &[ScoredRecord]) -> Vec<usize> {
        records.iter().map(|r| r.ordinal).collect()
    }

    #[test]
    fn test_descending_with_stable_ties() {
        let records = vec![
            scored(0, 0.2),
            scored(1, 0.8),
            scored(2, 0.2),
            scored(3, 1.0),
            scored(4, 0.8),
        ];

        let ranked = rank_and_select(records, 0);
        assert_eq!(ordinals(&ranked), vec![3, 1, 4, 0, 2]);
        assert!(ranked.windows(2).all(|w| w[0].anomaly_score >= w[1].anomaly_score));
    }

    #[test]
    fn test_top_n_selection() {
        let records: Vec<ScoredRecord> = (0..5).map(|i| scored(i, i as f64 / 4.0)).collect();

        assert_eq!(rank_and_select(records.clone(), 0).len(), 5);
        assert_eq!(rank_and_select(records.clone(), -3).len(), 5);
        assert_eq!(rank_and_select(records.clone(), 50).len(), 5);
        assert_eq!(ordinals(&rank_and_select(records, 2)), vec![4, 3]);
    }

    #[test]
    fn test_selection_size() {
        assert_eq!(selection_size(10, 0), 10);
        assert_eq!(selection_size(10, -1), 10);
        assert_eq!(selection_size(10, 3), 3);
        assert_eq!(selection_size(10, i64::MAX), 10);
        assert_eq!(selection_size(0, 5), 0);
    }

    #[test]
    fn test_serializes_flat_in_column_order() {
        let mut fields = IndexMap::new();
        fields.insert("date".to_string(), "2024-01-01".to_string());
        fields.insert("anomaly_score".to_string(), "stale".to_string());
        fields.insert("amount".to_string(), "10".to_string());
        let record = ScoredRecord {
            ordinal: 0,
            fields,
            anomaly_score: 0.5,
            is_anomaly: false,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-01-01","amount":"10","anomaly_score":0.5,"is_anomaly":false}"#
        );
    }
}
