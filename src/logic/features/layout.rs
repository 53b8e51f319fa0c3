//! Feature Layout - Encoded Vector Schema
//!
//! **This file controls the encoded vector layout**
//!
//! ## Rules:
//! 1. Add/remove a numeric feature → increment FEATURE_VERSION
//! 2. Change numeric order → increment FEATURE_VERSION
//! 3. Change the one-hot naming scheme → increment FEATURE_VERSION
//!
//! Layout = numeric passthrough block, then one one-hot block per
//! categorical field (positions fixed by the fitted vocabulary).

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current encoded layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// NUMERIC LAYOUT
// ============================================================================

/// Numeric passthrough features, in vector order
pub const NUMERIC_FEATURES: &[&str] = &[
    "amount",  // 0: parsed transaction amount
    "weekday", // 1: 0 = Monday ... 6 = Sunday, -1 = unknown
];

pub const NUMERIC_COUNT: usize = 2;

/// Name of one one-hot column
pub fn one_hot_name(field: &str, value: &str) -> String {
    format!("{}={}", field, value)
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and every column name in order
pub fn compute_layout_hash<S: AsRef<str>>(feature_names: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in feature_names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information, stored with a trained model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
}

impl LayoutInfo {
    pub fn from_names<S: AsRef<str>>(feature_names: &[S]) -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: compute_layout_hash(feature_names),
            feature_count: feature_names.len(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when an encoded layout doesn't match the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected: LayoutInfo,
    pub actual: LayoutInfo,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}, width {}), got v{} (hash: {:08x}, width {})",
            self.expected.version,
            self.expected.hash,
            self.expected.feature_count,
            self.actual.version,
            self.actual.hash,
            self.actual.feature_count,
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

pub fn validate_layout(expected: &LayoutInfo, actual: &LayoutInfo) -> Result<(), LayoutMismatchError> {
    if expected != actual {
        return Err(LayoutMismatchError {
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_count() {
        assert_eq!(NUMERIC_FEATURES.len(), NUMERIC_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        let names = ["amount", "weekday", "merchant=Cafe"];
        assert_eq!(compute_layout_hash(&names), compute_layout_hash(&names));
        assert_ne!(compute_layout_hash(&names), 0);
    }

    #[test]
    fn test_layout_hash_is_order_sensitive() {
        let a = compute_layout_hash(&["amount", "weekday"]);
        let b = compute_layout_hash(&["weekday", "amount"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_layout() {
        let expected = LayoutInfo::from_names(&["amount", "weekday"]);
        assert!(validate_layout(&expected, &expected.clone()).is_ok());

        let actual = LayoutInfo::from_names(&["amount", "weekday", "merchant=Cafe"]);
        let err = validate_layout(&expected, &actual).unwrap_err();
        assert_eq!(err.expected.feature_count, 2);
        assert_eq!(err.actual.feature_count, 3);
    }
}
