//! Error types for the quality analysis engine.
//!
//! Structural failures (`Parse`, `EmptyDataset`, `DatasetTooLarge`,
//! `Profiling`) end a job; numeric edge cases such as a zero standard
//! deviation never surface here and are resolved inside the profiler.
//!
//! Errors are serializable so they can be handed to a caller as
//! `{ "code", "message" }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis engine.
#[derive(Error, Debug)]
pub enum QualityError {
    /// The upload could not be decoded or parsed as a delimited table.
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    /// No usable columns remain after cleaning.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// The upload exceeds the configured size limit.
    #[error("Dataset too large: {size} bytes exceeds the limit of {limit} bytes")]
    DatasetTooLarge { size: usize, limit: usize },

    /// Unexpected failure while computing a column's statistics.
    #[error("Failed to profile column '{column}': {reason}")]
    Profiling { column: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (e.g., worker thread failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<QualityError>,
    },
}

impl QualityError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QualityError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::DatasetTooLarge { .. } => "DATASET_TOO_LARGE",
            Self::Profiling { .. } => "PROFILING_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error describes a problem with the uploaded data itself
    /// rather than with the engine.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::Parse(_) | Self::EmptyDataset(_) | Self::DatasetTooLarge { .. } => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }

    pub(crate) fn profiling(column: impl Into<String>, reason: impl ToString) -> Self {
        Self::Profiling {
            column: column.into(),
            reason: reason.to_string(),
        }
    }
}

impl Serialize for QualityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("QualityError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QualityError::Polars(e).with_context(context))
    }
}
