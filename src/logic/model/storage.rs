use std::fs;
use std::path::{Path, PathBuf};

use super::artifact;
use super::trained::TrainedModel;
use crate::error::{AnalysisError, Result};

/// Get default model path
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finguard") // App name
        .join("anomaly_model.json")
}

/// Save model artifact to disk
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = artifact::save(model)?;
    fs::write(path, bytes)?;

    log::info!("Saved model {} to {}", model.metadata().id, path.display());
    Ok(())
}

/// Load model artifact from disk with validation
pub fn load_model(path: &Path) -> Result<TrainedModel> {
    if !path.exists() {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("model file not found: {}", path.display()),
        )));
    }

    let bytes = fs::read(path)?;
    artifact::load(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureSet, ForestParams};
    use crate::logic::features::{encode_batch, FeatureRecord, Vocabulary};
    use tempfile::tempdir;

    fn model() -> TrainedModel {
        let records: Vec<FeatureRecord> = (0..8)
            .map(|i| FeatureRecord {
                ordinal: i,
                weekday: (i % 7) as i8,
                amount: 250.0 + 10.0 * i as f64,
                merchant: format!("Vendor {}", i % 2),
                category: "Utilities".to_string(),
            })
            .collect();
        let vocab = Vocabulary::fit(&records, FeatureSet::Full);
        let matrix = encode_batch(&records, &vocab);
        let params = ForestParams {
            n_estimators: 5,
            ..ForestParams::default()
        };
        TrainedModel::train(&matrix, vocab, 0.05, &params).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let original = model();

        save_model(&original, &path).unwrap();
        let loaded = load_model(&path).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_model(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_model(&model(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::CorruptArtifact(_)));
    }

    #[test]
    fn test_default_path_is_json() {
        let path = default_model_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    }
}
