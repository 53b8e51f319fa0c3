//! FinGuard Core - Transaction Ledger Anomaly Scoring
//!
//! Flags suspicious ledger entries with an isolation forest trained on
//! the uploaded dataset itself, and ranks them by severity.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::{AnalysisConfig, FeatureSet, ForestParams};
pub use error::{AnalysisError, ErrorKind, Result};
pub use logic::dataset::{Dataset, RawRecord};
pub use logic::model::TrainedModel;
pub use logic::pipeline::{analyze, score, train, train_and_score, AnalysisReport, ScoredBatch};
pub use logic::schema::Schema;
pub use logic::scoring::ScoredRecord;
