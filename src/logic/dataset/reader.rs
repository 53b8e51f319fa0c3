use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::record::Dataset;
use crate::error::Result;

/// Parse a CSV (header row required) into a dataset
pub fn from_csv_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut dataset = Dataset::new(headers.iter());
    let mut ignored_values = 0;

    for result in csv_reader.records() {
        let record = result?;
        ignored_values += dataset.push_row(record.iter().map(str::to_string).collect());
    }

    if ignored_values > 0 {
        log::warn!(
            "Ignored {} trailing CSV values beyond the {} header columns",
            ignored_values,
            dataset.columns().len()
        );
    }

    log::debug!(
        "Read {} records with columns {:?}",
        dataset.len(),
        dataset.columns()
    );

    Ok(dataset)
}

/// Parse an in-memory CSV upload
pub fn from_csv_bytes(bytes: &[u8]) -> Result<Dataset> {
    from_csv_reader(bytes)
}

/// Parse a CSV file from disk
pub fn from_csv_path(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    from_csv_reader(BufReader::new(file))
}
