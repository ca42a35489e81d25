//! Error types for model selection

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to load dataset: {0}")]
    DataLoad(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Representation could not be derived: {0}")]
    Representation(String),

    #[error("Fitting failed: {0}")]
    Fit(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Retraining {candidate} on the full dataset failed: {reason}")]
    RetrainFailed { candidate: String, reason: String },

    #[error("Model is not trained yet, run the classification grid first")]
    NotTrained,

    #[error("Schema mismatch: expected {expected} attribute values, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SelectError>;
