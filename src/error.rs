//! Error handling
//!
//! One error type for the whole scoring pipeline. Variants map onto the
//! failure classes callers care about: bad input they can fix, bad
//! configuration, and internal model failures.

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    // Schema errors
    #[error("Missing required fields: {}", .missing.join(", "))]
    MissingFields { missing: Vec<String> },

    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("Could not read dataset: {0}")]
    InvalidInput(String),

    // Data errors
    #[error("Data error: {0}")]
    Data(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Model errors
    #[error("Model error: {0}")]
    Model(String),

    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure class, used by callers to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Data,
    Config,
    Model,
    CorruptArtifact,
    Io,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::MissingFields { .. } => ErrorKind::Schema,
            AnalysisError::EmptyDataset => ErrorKind::Schema,
            AnalysisError::InvalidInput(_) => ErrorKind::Schema,
            AnalysisError::Data(_) => ErrorKind::Data,
            AnalysisError::Config(_) => ErrorKind::Config,
            AnalysisError::Model(_) => ErrorKind::Model,
            AnalysisError::CorruptArtifact(_) => ErrorKind::CorruptArtifact,
            AnalysisError::Io(_) => ErrorKind::Io,
        }
    }

    /// True when the caller can fix the failure by changing its input
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Schema | ErrorKind::Data | ErrorKind::Config)
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_name() {
        let err = AnalysisError::MissingFields {
            missing: vec!["date".to_string(), "amount".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required fields: date, amount");
    }

    #[test]
    fn test_error_classification() {
        assert!(AnalysisError::EmptyDataset.is_client_error());
        assert!(AnalysisError::Data("x".into()).is_client_error());
        assert!(AnalysisError::Config("x".into()).is_client_error());
        assert!(!AnalysisError::Model("x".into()).is_client_error());
        assert!(!AnalysisError::CorruptArtifact("x".into()).is_client_error());
        assert_eq!(AnalysisError::InvalidInput("x".into()).kind(), ErrorKind::Schema);
    }
}
