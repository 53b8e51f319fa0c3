//! Features Module - Feature Derivation & Encoding
//!
//! Raw ledger rows → derived fields → fixed-width numeric vectors.
//! The vocabulary fitted at training time is the only thing shared
//! between train and score calls.

pub mod derive;
pub mod layout;
pub mod vocabulary;
pub mod encoder;


// Re-export common types
pub use derive::{derive, derive_batch, DerivedBatch, DroppedRow, FeatureRecord};
pub use encoder::{encode, encode_batch, EncodedBatch, EncodedVector, FeatureMatrix};
pub use layout::{LayoutInfo, FEATURE_VERSION};
pub use vocabulary::{CategoricalField, Vocabulary};
