//! Job orchestration for the CSV quality engine.
//!
//! A job is one analysis run over one uploaded dataset. Its lifecycle is
//! `queued → analyzing → completed | failed`; clients drive it through a
//! poll-based boundary:
//!
//! - **Upload** registers the bytes and returns `{job_id}`
//! - **Trigger** starts the pipeline (idempotent) and returns the status
//! - **Status** returns `{status, error?, stage?}`
//! - **Results** returns `{cleaned_data, quality_report?}`
//! - **Raw data** returns the uploaded table verbatim
//! - **Export** returns the quality report as a JSON document
//!
//! # Example
//!
//! ```rust,ignore
//! use quality_jobs::{JobOrchestrator, OrchestratorConfig};
//!
//! let jobs = JobOrchestrator::new(OrchestratorConfig::default())?;
//! let id = jobs.upload(std::fs::read("data.csv")?).job_id;
//! jobs.trigger(id)?;
//! jobs.wait(id).await?;
//! let results = jobs.results(id)?;
//! ```

pub mod api;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod store;

pub use api::{JobSnapshot, RawDataResponse, ResultsResponse, StatusResponse, UploadResponse};
pub use error::{JobError, Result};
pub use job::{Job, JobFailure, JobId, JobStatus};
pub use orchestrator::{JobOrchestrator, OrchestratorConfig};
pub use store::{JobEntry, JobStore};
