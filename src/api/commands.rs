//! Upload Commands - Boundary for the HTTP layer
//!
//! A handler passes the uploaded file bytes and the optional query
//! parameters through; everything past that point is the pipeline.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::logic::dataset::from_csv_bytes;
use crate::logic::features::FEATURE_VERSION;
use crate::logic::model::TrainedModel;
use crate::logic::pipeline::{self, AnalysisReport};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Successful analysis of one uploaded file
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// Error body returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

/// Summary of a trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_id: String,
    pub trained_at: String,
    pub trained_on_records: usize,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,
    pub n_estimators: usize,
    pub contamination: f64,
}

// ============================================================================
// COMMANDS
// ============================================================================

fn upload_config(contamination: Option<f64>, top_n: Option<i64>) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    if let Some(contamination) = contamination {
        config = config.with_contamination(contamination);
    }
    if let Some(top_n) = top_n {
        config = config.with_top_n(top_n);
    }
    config
}

/// Train on an uploaded CSV and return its ranked anomalies
pub fn analyze_upload(
    filename: &str,
    bytes: &[u8],
    contamination: Option<f64>,
    top_n: Option<i64>,
) -> Result<UploadResponse> {
    let config = upload_config(contamination, top_n);
    config.validate()?;

    log::info!("Analyzing upload '{}' ({} bytes)", filename, bytes.len());
    let dataset = from_csv_bytes(bytes)?;
    let report = pipeline::analyze(dataset, &config)?;

    Ok(UploadResponse {
        filename: filename.to_string(),
        report,
    })
}

/// Score an uploaded CSV against a model trained earlier
pub fn score_upload(model: &TrainedModel, filename: &str, bytes: &[u8], top_n: Option<i64>) -> Result<UploadResponse> {
    let config = upload_config(Some(model.contamination()), top_n);

    log::info!("Scoring upload '{}' with model {}", filename, model.metadata().id);
    let dataset = from_csv_bytes(bytes)?;
    let batch = pipeline::score(model, dataset, &config)?;

    Ok(UploadResponse {
        filename: filename.to_string(),
        report: pipeline::report(batch, config.contamination, config.top_n),
    })
}

pub fn model_status(model: &TrainedModel) -> ModelStatus {
    let metadata = model.metadata();
    let layout = model.layout();

    ModelStatus {
        model_id: metadata.id.to_string(),
        trained_at: metadata.trained_at.to_rfc3339(),
        trained_on_records: metadata.training_size,
        feature_version: FEATURE_VERSION,
        layout_hash: layout.hash,
        feature_count: layout.feature_count,
        n_estimators: metadata.n_estimators,
        contamination: model.contamination(),
    }
}

/// Map an error to a client-facing body; internal details stay in the log
pub fn error_response(err: &AnalysisError) -> ErrorResponse {
    if err.is_client_error() {
        return ErrorResponse {
            error: err.to_string(),
            status: 400,
        };
    }

    log::error!("Internal error: {}", err);
    ErrorResponse {
        error: "Internal server error".to_string(),
        status: 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> String {
        let mut csv = String::from("date,merchant,category,amount,reference\n");
        for i in 0..12 {
            csv.push_str(&format!(
                "2024-05-{:02},Shop {},Supplies,{}.00,REF{}\n",
                i + 1,
                i % 3,
                400 + 25 * i,
                i
            ));
        }
        csv.push_str("2024-05-13,Shop 0,Supplies,\"$98,000.00\",REF12\n");
        csv
    }

    #[test]
    fn test_analyze_upload() {
        let response = analyze_upload("ledger.csv", upload().as_bytes(), None, Some(5)).unwrap();

        assert_eq!(response.filename, "ledger.csv");
        assert_eq!(response.report.total_transactions, 13);
        assert_eq!(response.report.returned_transactions, 5);
        assert_eq!(response.report.anomalies[0].ordinal, 12);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["filename"], "ledger.csv");
        assert_eq!(json["total_transactions"], 13);
        assert_eq!(json["anomalies"][0]["reference"], "REF12");
    }

    #[test]
    fn test_invalid_contamination_is_client_error() {
        let err = analyze_upload("ledger.csv", upload().as_bytes(), Some(0.0), None).unwrap_err();
        let body = error_response(&err);

        assert_eq!(body.status, 400);
        assert!(body.error.contains("contamination"));
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let err = analyze_upload("bad.csv", b"when,what\n2024-01-01,x\n", None, None).unwrap_err();
        let body = error_response(&err);

        assert_eq!(body.status, 400);
        assert!(body.error.contains("merchant"));
        assert!(body.error.contains("amount"));
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let body = error_response(&AnalysisError::Model("width mismatch".to_string()));
        assert_eq!(
            body,
            ErrorResponse {
                error: "Internal server error".to_string(),
                status: 500,
            }
        );
    }

    #[test]
    fn test_score_upload_reuses_model() {
        let config = AnalysisConfig::default().with_contamination(0.1);
        let model = pipeline::train(from_csv_bytes(upload().as_bytes()).unwrap(), &config).unwrap();

        let response = score_upload(&model, "next.csv", upload().as_bytes(), Some(0)).unwrap();
        assert_eq!(response.report.contamination, 0.1);
        assert_eq!(response.report.returned_transactions, 13);

        let status = model_status(&model);
        assert_eq!(status.trained_on_records, 13);
        assert_eq!(status.feature_count, model.layout().feature_count);
    }
}
