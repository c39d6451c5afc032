//! Job orchestrator.
//!
//! Jobs are dispatched to the Tokio blocking pool, bounded by a semaphore.
//! The boundary stays poll-based: `trigger` returns immediately and callers
//! learn about the terminal state through `status`.
//!
//! ```text
//! upload ──► store (queued)
//! trigger ─► begin() ──► spawn ──► acquire permit ──► spawn_blocking
//!                                                        │ ingest
//!                                                        │ attach raw
//!                                                        │ clean/profile/score
//!                         status/results ◄── publish ◄───┘ (or fail / timeout)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use quality_engine::{
    AnalysisConfig, AnalysisOutcome, Pipeline, ProgressReporter, ProgressUpdate, QualityError,
    ReportGenerator,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::api::{JobSnapshot, RawDataResponse, ResultsResponse, StatusResponse, UploadResponse};
use crate::error::{JobError, Result};
use crate::job::{JobFailure, JobId};
use crate::store::{JobEntry, JobStore};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Configuration used for every job's pipeline
    pub analysis: AnalysisConfig,

    /// Maximum number of pipelines running at once
    pub max_concurrent_jobs: usize,

    /// Per-job analysis time limit; `None` disables it
    pub job_timeout_ms: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            max_concurrent_jobs: 4,
            job_timeout_ms: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate().map_err(QualityError::from)?;
        if self.max_concurrent_jobs == 0 {
            return Err(JobError::InvalidConfig(
                "max_concurrent_jobs must be at least 1".into(),
            ));
        }
        if self.job_timeout_ms == Some(0) {
            return Err(JobError::InvalidConfig(
                "job_timeout_ms must be positive when set".into(),
            ));
        }
        Ok(())
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_ms.map(Duration::from_millis)
    }
}

// ============================================================================
// PROGRESS
// ============================================================================

/// Records the pipeline's current stage on the job.
struct StageRecorder {
    entry: Arc<JobEntry>,
}

impl ProgressReporter for StageRecorder {
    fn report(&self, update: ProgressUpdate) {
        debug!("[{:>3.0}%] {}", update.progress * 100.0, update.message);
        self.entry.set_stage(update.stage);
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Owns the job store and runs analyses.
///
/// Cloning is cheap and clones share the same store.
#[derive(Debug, Clone)]
pub struct JobOrchestrator {
    store: Arc<JobStore>,
    config: Arc<OrchestratorConfig>,
    permits: Arc<Semaphore>,
}

static_assertions::assert_impl_all!(JobOrchestrator: Send, Sync);

impl JobOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(JobStore::new()),
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Register an upload as a new `queued` job.
    pub fn upload(&self, bytes: impl Into<Arc<[u8]>>) -> UploadResponse {
        let bytes = bytes.into();
        let size = bytes.len();
        let job_id = self.store.insert(bytes);
        info!("Job {} queued ({} bytes)", job_id, size);
        UploadResponse { job_id }
    }

    /// Start analysis of a queued job and return its status.
    ///
    /// Re-triggering an `analyzing`, `completed` or `failed` job is a no-op
    /// that reports the current status. Pipeline failures are never returned
    /// here; they surface through [`status`](Self::status).
    ///
    /// # Errors
    ///
    /// `UnknownJob`, or `NoRuntime` when called outside a Tokio runtime.
    pub fn trigger(&self, id: JobId) -> Result<StatusResponse> {
        let entry = self.store.get(id)?;
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| JobError::NoRuntime(e.to_string()))?;

        if entry.begin() {
            info!("Job {} analyzing", id);
            handle.spawn(run_job(
                id,
                entry.clone(),
                self.config.clone(),
                self.permits.clone(),
            ));
        } else {
            debug!("Job {} already {}; trigger ignored", id, entry.status());
        }

        Ok(StatusResponse::from(&*entry.read()))
    }

    pub fn status(&self, id: JobId) -> Result<StatusResponse> {
        let entry = self.store.get(id)?;
        let job = entry.read();
        Ok(StatusResponse::from(&*job))
    }

    /// Cleaned-data summary and quality report of a completed job.
    pub fn results(&self, id: JobId) -> Result<ResultsResponse> {
        let outcome = self.completed_outcome(id)?;
        Ok(ResultsResponse {
            cleaned_data: outcome.cleaned_data,
            quality_report: outcome.quality_report.clone(),
        })
    }

    /// The table as uploaded. Available as soon as ingestion succeeded.
    pub fn raw_data(&self, id: JobId) -> Result<RawDataResponse> {
        let entry = self.store.get(id)?;
        let job = entry.read();
        match (job.raw(), job.failure()) {
            (Some(raw), _) => Ok(RawDataResponse::from(raw.as_ref())),
            (None, Some(failure)) => Err(JobError::JobFailed {
                id,
                reason: failure.reason.clone(),
            }),
            (None, None) => Err(JobError::JobNotReady {
                id,
                status: job.status(),
            }),
        }
    }

    /// The quality report as a standalone JSON document.
    ///
    /// The bytes deserialize to exactly the `quality_report` of
    /// [`results`](Self::results).
    pub fn export(&self, id: JobId) -> Result<Vec<u8>> {
        let outcome = self.completed_outcome(id)?;
        let report = outcome
            .quality_report
            .as_ref()
            .ok_or(JobError::NoReport { id })?;
        Ok(ReportGenerator::export(report)?)
    }

    /// Resolve once the job reaches a terminal state.
    ///
    /// A job that is never triggered never resolves.
    pub async fn wait(&self, id: JobId) -> Result<StatusResponse> {
        let entry = self.store.get(id)?;
        entry.terminated().await;
        let job = entry.read();
        Ok(StatusResponse::from(&*job))
    }

    pub fn snapshot(&self, id: JobId) -> Result<JobSnapshot> {
        let entry = self.store.get(id)?;
        let job = entry.read();
        Ok(JobSnapshot::from(&*job))
    }

    fn completed_outcome(&self, id: JobId) -> Result<Arc<AnalysisOutcome>> {
        let entry = self.store.get(id)?;
        let job = entry.read();
        if let Some(outcome) = job.outcome() {
            return Ok(outcome.clone());
        }
        match job.failure() {
            Some(failure) => Err(JobError::JobFailed {
                id,
                reason: failure.reason.clone(),
            }),
            None => Err(JobError::JobNotReady {
                id,
                status: job.status(),
            }),
        }
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

async fn run_job(
    id: JobId,
    entry: Arc<JobEntry>,
    config: Arc<OrchestratorConfig>,
    permits: Arc<Semaphore>,
) {
    let permit = match permits.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            publish_failure(id, &entry, JobFailure::new("INTERNAL_ERROR", e.to_string()));
            return;
        }
    };

    let start = Instant::now();
    let worker_entry = entry.clone();
    let analysis = config.analysis.clone();
    let work = tokio::task::spawn_blocking(move || {
        // Held until the pipeline actually returns, even after a timeout
        let _permit = permit;
        execute(worker_entry, analysis)
    });

    let joined = match config.job_timeout() {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(joined) => joined,
            Err(_) => {
                let reason = format!("analysis timed out after {} ms", limit.as_millis());
                publish_failure(id, &entry, JobFailure::new("TIMEOUT", reason));
                return;
            }
        },
        None => work.await,
    };

    match joined {
        Ok(Ok(outcome)) => {
            let rows = outcome.cleaned_data.rows;
            if entry.complete(outcome) {
                info!(
                    "Job {} completed in {:.2?} ({} cleaned rows)",
                    id,
                    start.elapsed(),
                    rows
                );
            }
        }
        Ok(Err(e)) => {
            publish_failure(id, &entry, JobFailure::new(e.error_code(), e.to_string()));
        }
        Err(e) => {
            warn!("Job {} worker task did not finish: {}", id, e);
            let reason = format!("Task join error: {}", e);
            publish_failure(id, &entry, JobFailure::new("INTERNAL_ERROR", reason));
        }
    }
}

/// Runs on the blocking pool.
fn execute(
    entry: Arc<JobEntry>,
    config: AnalysisConfig,
) -> quality_engine::QualityResult<AnalysisOutcome> {
    let bytes = entry
        .take_upload()
        .ok_or_else(|| QualityError::Internal("upload already consumed".into()))?;

    let pipeline = Pipeline::builder()
        .config(config)
        .progress_reporter(Arc::new(StageRecorder {
            entry: entry.clone(),
        }))
        .build()?;

    let raw = Arc::new(pipeline.ingest(&bytes)?);
    drop(bytes);
    if !entry.attach_raw(raw.clone()) {
        // Timed out during ingestion; the failure is already published
        return Err(QualityError::Internal("job no longer analyzing".into()));
    }

    pipeline.analyze(&raw)
}

fn publish_failure(id: JobId, entry: &JobEntry, failure: JobFailure) {
    let code = failure.code.clone();
    let reason = failure.reason.clone();
    if entry.fail(failure) {
        error!("Job {} failed [{}]: {}", id, code, reason);
    } else {
        debug!("Job {} already terminal; late failure discarded", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_concurrent_jobs, 4);
        assert!(config.job_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let zero_workers = OrchestratorConfig {
            max_concurrent_jobs: 0,
            ..Default::default()
        };
        assert!(matches!(
            JobOrchestrator::new(zero_workers).unwrap_err(),
            JobError::InvalidConfig(_)
        ));

        let mut bad_analysis = OrchestratorConfig::default();
        bad_analysis.analysis.histogram_bins = 0;
        assert_eq!(
            bad_analysis.validate().unwrap_err().error_code(),
            "INVALID_CONFIG"
        );
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"max_concurrent_jobs": 2, "job_timeout_ms": 500}"#).unwrap();
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.job_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.analysis.histogram_bins, 10);
    }

    #[test]
    fn test_trigger_outside_runtime() {
        let orchestrator = JobOrchestrator::new(OrchestratorConfig::default()).unwrap();
        let id = orchestrator.upload(&b"a\n1\n"[..]).job_id;
        let err = orchestrator.trigger(id).unwrap_err();
        assert_eq!(err.error_code(), "NO_RUNTIME");
        // Nothing started
        assert_eq!(orchestrator.status(id).unwrap().status, JobStatus::Queued);
    }

    #[test]
    fn test_unknown_job_everywhere() {
        let orchestrator = JobOrchestrator::new(OrchestratorConfig::default()).unwrap();
        let id = JobId::new();
        assert!(matches!(orchestrator.status(id), Err(JobError::UnknownJob(_))));
        assert!(matches!(orchestrator.results(id), Err(JobError::UnknownJob(_))));
        assert!(matches!(orchestrator.raw_data(id), Err(JobError::UnknownJob(_))));
        assert!(matches!(orchestrator.export(id), Err(JobError::UnknownJob(_))));
        assert!(matches!(orchestrator.snapshot(id), Err(JobError::UnknownJob(_))));
    }
}
