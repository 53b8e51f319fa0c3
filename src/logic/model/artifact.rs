//! Model Artifact - Serialization Contract
//!
//! `save` produces opaque bytes, `load` restores a `TrainedModel` or fails
//! with `CorruptArtifact`. The envelope carries a SHA-256 checksum of the
//! payload so truncated or edited artifacts are rejected before decoding.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::trained::TrainedModel;
use crate::error::{AnalysisError, Result};

/// Envelope format version; bump when the envelope or payload shape changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Stored artifact format (payload + checksum)
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u32,

    /// Hex SHA-256 of `payload`
    checksum: String,

    /// JSON-encoded `TrainedModel`
    payload: String,
}

fn checksum(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Serialize a trained model into artifact bytes
pub fn save(model: &TrainedModel) -> Result<Vec<u8>> {
    let payload = serde_json::to_string(model)
        .map_err(|e| AnalysisError::Model(format!("failed to serialize model: {}", e)))?;

    let envelope = ArtifactEnvelope {
        format_version: ARTIFACT_FORMAT_VERSION,
        checksum: checksum(&payload),
        payload,
    };

    serde_json::to_vec_pretty(&envelope)
        .map_err(|e| AnalysisError::Model(format!("failed to serialize artifact: {}", e)))
}

/// Restore a trained model from artifact bytes
pub fn load(bytes: &[u8]) -> Result<TrainedModel> {
    let corrupt = |reason: String| {
        log::warn!("Rejected model artifact: {}", reason);
        AnalysisError::CorruptArtifact(reason)
    };

    let envelope: ArtifactEnvelope =
        serde_json::from_slice(bytes).map_err(|e| corrupt(format!("unreadable envelope: {}", e)))?;

    if envelope.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {} (expected {})",
            envelope.format_version, ARTIFACT_FORMAT_VERSION
        )));
    }

    if checksum(&envelope.payload) != envelope.checksum.to_lowercase() {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    let model: TrainedModel = serde_json::from_str(&envelope.payload)
        .map_err(|e| corrupt(format!("payload is not a trained model: {}", e)))?;

    model.validate()?;

    log::info!(
        "Loaded model {} (trained {} on {} records)",
        model.metadata().id,
        model.metadata().trained_at,
        model.metadata().training_size
    );

    Ok(model)
}
