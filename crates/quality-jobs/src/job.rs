//! Job model and state machine.
//!
//! ```text
//! queued ──trigger──► analyzing ──► completed
//!                         │
//!                         └───────► failed
//! ```
//!
//! Every transition is guarded: a job only moves forward, and the terminal
//! state is written exactly once. A late result from a timed-out pipeline
//! is therefore discarded rather than overwriting `failed`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quality_engine::{AnalysisOutcome, AnalysisStage, RawDataset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// IDENTIFIERS & STATUS
// ============================================================================

/// Opaque job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Externally visible job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Analyzing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STATE
// ============================================================================

/// A retained pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    /// Stable error code, e.g. `PARSE_ERROR` or `TIMEOUT`
    pub code: String,
    pub reason: String,
}

impl JobFailure {
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum JobState {
    Queued,
    Analyzing { stage: AnalysisStage },
    Completed { outcome: Arc<AnalysisOutcome> },
    Failed { failure: JobFailure },
}

impl JobState {
    pub(crate) fn status(&self) -> JobStatus {
        match self {
            Self::Queued => JobStatus::Queued,
            Self::Analyzing { .. } => JobStatus::Analyzing,
            Self::Completed { .. } => JobStatus::Completed,
            Self::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// One analysis run over one uploaded dataset.
///
/// The job owns its upload until ingestion, then its raw table. The outcome
/// is shared behind an `Arc` so readers never copy it under the lock.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    upload: Option<Arc<[u8]>>,
    raw: Option<Arc<RawDataset>>,
    state: JobState,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub(crate) fn new(id: JobId, upload: Arc<[u8]>) -> Self {
        Self {
            id,
            upload: Some(upload),
            raw: None,
            state: JobState::Queued,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    /// Current pipeline stage, while analyzing.
    pub fn stage(&self) -> Option<AnalysisStage> {
        match &self.state {
            JobState::Analyzing { stage } => Some(*stage),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match &self.state {
            JobState::Failed { failure } => Some(failure),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&Arc<AnalysisOutcome>> {
        match &self.state {
            JobState::Completed { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn raw(&self) -> Option<&Arc<RawDataset>> {
        self.raw.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// `queued → analyzing`. Returns false (and changes nothing) from any
    /// other state.
    pub(crate) fn begin(&mut self) -> bool {
        if !matches!(self.state, JobState::Queued) {
            return false;
        }
        self.state = JobState::Analyzing {
            stage: AnalysisStage::Ingesting,
        };
        self.started_at = Some(Utc::now());
        true
    }

    /// Hand the upload to the pipeline. Only possible once.
    pub(crate) fn take_upload(&mut self) -> Option<Arc<[u8]>> {
        self.upload.take()
    }

    pub(crate) fn set_stage(&mut self, next: AnalysisStage) {
        if next.is_terminal() {
            return;
        }
        if let JobState::Analyzing { stage } = &mut self.state {
            *stage = next;
        }
    }

    /// Store the ingested table. Ignored once the job is terminal.
    pub(crate) fn attach_raw(&mut self, raw: Arc<RawDataset>) -> bool {
        if !matches!(self.state, JobState::Analyzing { .. }) || self.raw.is_some() {
            return false;
        }
        self.raw = Some(raw);
        true
    }

    /// `analyzing → completed`.
    pub(crate) fn complete(&mut self, outcome: AnalysisOutcome) -> bool {
        if !matches!(self.state, JobState::Analyzing { .. }) {
            return false;
        }
        self.state = JobState::Completed {
            outcome: Arc::new(outcome),
        };
        self.finished_at = Some(Utc::now());
        true
    }

    /// `analyzing → failed`.
    pub(crate) fn fail(&mut self, failure: JobFailure) -> bool {
        if !matches!(self.state, JobState::Analyzing { .. }) {
            return false;
        }
        self.state = JobState::Failed { failure };
        self.upload = None;
        self.finished_at = Some(Utc::now());
        true
    }
}
