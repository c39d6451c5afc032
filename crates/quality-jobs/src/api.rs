//! Boundary request/response shapes.
//!
//! These are the documents a client receives; transport is left to the
//! embedding application.

use chrono::{DateTime, Utc};
use quality_engine::{AnalysisStage, CleanedSummary, QualityReport, RawDataset};
use serde::{Deserialize, Serialize};

use crate::job::{Job, JobFailure, JobId, JobStatus};

/// Returned by `upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub job_id: JobId,
}

/// Returned by `trigger`, `status` and `wait`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,

    /// Failure reason, failed jobs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Current pipeline stage, analyzing jobs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<AnalysisStage>,
}

impl From<&Job> for StatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            status: job.status(),
            error: job.failure().map(|f| f.reason.clone()),
            stage: job.stage(),
        }
    }
}

/// Returned by `results`.
///
/// An absent `quality_report` means the job completed over a dataset with no
/// data rows; it is not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub cleaned_data: CleanedSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_report: Option<QualityReport>,
}

/// Returned by `raw_data`: the table as uploaded, header verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataResponse {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl From<&RawDataset> for RawDataResponse {
    fn from(raw: &RawDataset) -> Self {
        Self {
            header: raw.header.clone(),
            rows: raw.rows.clone(),
        }
    }
}

/// Logical persisted layout of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    pub raw_data: Option<RawDataset>,
    pub cleaned_data: Option<CleanedSummary>,
    pub quality_report: Option<QualityReport>,
    pub failure: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobSnapshot {
    fn from(job: &Job) -> Self {
        let outcome = job.outcome();
        Self {
            job_id: job.id(),
            status: job.status(),
            raw_data: job.raw().map(|raw| raw.as_ref().clone()),
            cleaned_data: outcome.map(|o| o.cleaned_data),
            quality_report: outcome.and_then(|o| o.quality_report.clone()),
            failure: job.failure().cloned(),
            created_at: job.created_at(),
            started_at: job.started_at(),
            finished_at: job.finished_at(),
        }
    }
}
