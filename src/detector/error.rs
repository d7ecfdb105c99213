//! Detector errors

use std::path::PathBuf;

use thiserror::Error;

pub type DetectorResult<T> = Result<T, DetectorError>;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Dataset errors
    #[error("Dataset contains no rows")]
    EmptyDataset,

    #[error("Dataset has no '{0}' column")]
    MissingTarget(String),

    #[error("Dataset has no feature columns")]
    NoFeatures,

    #[error("Invalid label '{value}' in column '{column}'")]
    InvalidLabel { column: String, value: String },

    #[error("Column '{column}' has non-numeric value '{value}'")]
    NonNumericFeature { column: String, value: String },

    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Row {row} has {actual} cell(s), expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    #[error("Dataset with {rows} row(s) is too small to split with test size {test_size}")]
    DatasetTooSmall { rows: usize, test_size: f64 },

    // Model errors
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Probability estimates need exactly two classes, model has {0}")]
    ProbabilityUnavailable(usize),

    // Storage errors
    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    // Request errors
    #[error("No account data provided")]
    EmptyRecord,
}

impl DetectorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DetectorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors caused by the caller's input rather than by processing
    pub fn is_client_error(&self) -> bool {
        matches!(self, DetectorError::EmptyRecord)
    }
}
