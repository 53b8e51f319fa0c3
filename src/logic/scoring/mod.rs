//! Scoring Module - Severity Normalization & Ranking

pub mod normalize;
pub mod rank;

pub use normalize::normalize;
pub use rank::{rank_and_select, selection_size, ScoredRecord};
