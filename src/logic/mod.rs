//! Logic Module - Anomaly Scoring Pipeline
//!
//! - `dataset/` - Raw ledger records (CSV ingestion)
//! - `schema` - Required field resolution
//! - `features/` - Derivation, vocabulary, encoding
//! - `model/` - Isolation forest, threshold, artifacts
//! - `scoring/` - Normalization, ranking
//! - `pipeline/` - train / score / analyze

pub mod dataset;
pub mod schema;
pub mod features;
pub mod model;
pub mod scoring;
pub mod pipeline;
