use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One transaction exactly as submitted
///
/// Identity is the 0-based `ordinal` (position in the uploaded dataset).
/// `fields` keeps every original column in header order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub ordinal: usize,
    pub fields: IndexMap<String, String>,
}

impl RawRecord {
    /// Field value by exact column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

/// Ordered sequence of raw records sharing one header
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl Dataset {
    /// Empty dataset with the given header
    ///
    /// Header names are trimmed; repeated names get a `.N` suffix so that
    /// no column is lost.
    pub fn new<C>(columns: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for column in columns {
            let base = column.into().trim().to_string();
            let mut name = base.clone();
            let mut suffix = 1;
            while unique.contains(&name) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            unique.push(name);
        }

        Self {
            columns: unique,
            records: Vec::new(),
        }
    }

    /// Build a dataset from a header and rows of values
    pub fn from_rows<C, R, V>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row.into_iter().map(Into::into).collect());
        }
        dataset
    }

    /// Append one row
    ///
    /// Short rows are padded with empty values, extra values are ignored.
    /// Returns the number of ignored trailing values.
    pub fn push_row(&mut self, mut values: Vec<String>) -> usize {
        let extra = values.len().saturating_sub(self.columns.len());
        values.resize(self.columns.len(), String::new());

        let fields = self.columns.iter().cloned().zip(values).collect();
        self.records.push(RawRecord {
            ordinal: self.records.len(),
            fields,
        });

        extra
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn get(&self, ordinal: usize) -> Option<&RawRecord> {
        self.records.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
