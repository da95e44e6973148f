//! Error types for ensemble-signal
//!
//! Schema and storage failures abort a run. `ArtifactNotFound` and `FitFailed`
//! are raised by the store and the model families; the scorer and the trainer
//! downgrade them to skips.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ensemble-signal error types
#[derive(Error, Debug)]
pub enum Error {
    /// Required column absent from the input table
    #[error("Missing required column '{0}' in input table")]
    MissingColumn(String),

    /// Cell that could not be read as a number
    #[error("Invalid value in column '{column}' at row {row}: {message}")]
    InvalidValue {
        /// Column name
        column: String,
        /// Zero-based data row (header excluded)
        row: usize,
        /// What was wrong with the cell
        message: String,
    },

    /// No artifact stored for the requested (feature, family) pair
    #[error("Artifact not found: feature '{feature}', family '{family}'")]
    ArtifactNotFound {
        /// Feature name
        feature: String,
        /// Family name
        family: String,
    },

    /// A model family could not be fitted on the given slice
    #[error("Fitting {family} failed: {reason}")]
    FitFailed {
        /// Family name
        family: String,
        /// Unmet precondition
        reason: String,
    },

    /// Storage error (tables, artifacts, outputs)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Invalid configuration or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the scorer may skip past this error instead of aborting.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ArtifactNotFound { .. })
    }
}
