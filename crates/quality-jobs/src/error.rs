//! Error types for job orchestration.
//!
//! `UnknownJob` and `JobNotReady` are returned synchronously to the caller.
//! Pipeline failures never surface from `trigger`; they are retained on the
//! job and reported through status, results and export.

use quality_engine::QualityError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::job::{JobId, JobStatus};

#[derive(Error, Debug)]
pub enum JobError {
    /// No job was ever uploaded under this id.
    #[error("Unknown job: {0}")]
    UnknownJob(JobId),

    /// The requested data is not available in the job's current state.
    #[error("Job {id} is not ready (status: {status})")]
    JobNotReady { id: JobId, status: JobStatus },

    /// The job ended in `failed`; `reason` is the retained failure message.
    #[error("Job {id} failed: {reason}")]
    JobFailed { id: JobId, reason: String },

    /// The job completed over a dataset without data rows.
    #[error("Job {id} completed without a quality report")]
    NoReport { id: JobId },

    #[error("Invalid orchestrator configuration: {0}")]
    InvalidConfig(String),

    /// `trigger` was called outside a Tokio runtime.
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    #[error(transparent)]
    Engine(#[from] QualityError),
}

impl JobError {
    /// Get a stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownJob(_) => "UNKNOWN_JOB",
            Self::JobNotReady { .. } => "JOB_NOT_READY",
            Self::JobFailed { .. } => "JOB_FAILED",
            Self::NoReport { .. } => "NO_REPORT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoRuntime(_) => "NO_RUNTIME",
            Self::Engine(inner) => inner.error_code(),
        }
    }
}

impl Serialize for JobError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("JobError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let id = JobId::new();
        assert_eq!(JobError::UnknownJob(id).error_code(), "UNKNOWN_JOB");
        assert_eq!(
            JobError::JobNotReady {
                id,
                status: JobStatus::Queued
            }
            .error_code(),
            "JOB_NOT_READY"
        );
        assert_eq!(
            JobError::JobFailed {
                id,
                reason: "boom".into()
            }
            .error_code(),
            "JOB_FAILED"
        );
    }

    #[test]
    fn test_engine_errors_keep_their_code() {
        let error: JobError = QualityError::Parse("bad bytes".into()).into();
        assert_eq!(error.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_serializes_code_and_message() {
        let id = JobId::new();
        let json = serde_json::to_value(JobError::UnknownJob(id)).unwrap();
        assert_eq!(json["code"], "UNKNOWN_JOB");
        assert_eq!(json["message"], format!("Unknown job: {}", id));
    }
}
