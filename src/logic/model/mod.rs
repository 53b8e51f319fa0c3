//! Model Module - Isolation Forest Outlier Model
//!
//! Fitting, scoring, thresholding and persistence of the trained model.
//! A `TrainedModel` is never mutated after `train` returns.

pub mod forest;
pub mod threshold;
pub mod trained;
pub mod artifact;
pub mod storage;

// Re-export common types
pub use forest::IsolationForest;
pub use threshold::{ContaminationThreshold, ThresholdStats};
pub use trained::{ModelMetadata, TrainedModel};
pub use storage::{default_model_path, load_model, save_model};
