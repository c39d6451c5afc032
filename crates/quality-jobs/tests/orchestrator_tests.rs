//! Integration tests for the job orchestrator.
//!
//! Each test drives the public boundary (upload, trigger, status, results,
//! raw data, export) on a multi-threaded runtime.

use pretty_assertions::assert_eq;
use quality_engine::{AnalysisConfig, QualityReport, ReportGenerator};
use quality_jobs::{JobError, JobId, JobOrchestrator, JobStatus, OrchestratorConfig};
use std::time::Duration;

// ============================================================================
// Helper Functions
// ============================================================================

const SAMPLE: &str = "a,b\n1,2\n1,2\n3,x\n";

fn orchestrator() -> JobOrchestrator {
    JobOrchestrator::new(OrchestratorConfig::default()).expect("valid config")
}

async fn run_to_end(jobs: &JobOrchestrator, csv: &str) -> JobId {
    let id = jobs.upload(csv.as_bytes()).job_id;
    jobs.trigger(id).expect("trigger");
    tokio::time::timeout(Duration::from_secs(30), jobs.wait(id))
        .await
        .expect("job should finish")
        .expect("known job");
    id
}

/// Roughly a megabyte of numeric CSV, slow enough to outlast a 1 ms timeout.
fn large_csv() -> String {
    let mut csv = String::from("id,x,y,z\n");
    for i in 0..60_000 {
        csv.push_str(&format!("{},{},{}.5,{}\n", i, i % 97, i % 13, i * 7));
    }
    csv
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_upload_starts_queued() {
    let jobs = orchestrator();
    let id = jobs.upload(SAMPLE.as_bytes()).job_id;

    let status = jobs.status(id).unwrap();
    assert_eq!(status.status, JobStatus::Queued);
    assert!(status.error.is_none());

    let err = jobs.results(id).unwrap_err();
    assert!(matches!(
        err,
        JobError::JobNotReady {
            status: JobStatus::Queued,
            ..
        }
    ));
    assert_eq!(jobs.raw_data(id).unwrap_err().error_code(), "JOB_NOT_READY");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_completed_job_results() {
    let jobs = orchestrator();
    let id = run_to_end(&jobs, SAMPLE).await;

    assert_eq!(jobs.status(id).unwrap().status, JobStatus::Completed);

    let results = jobs.results(id).unwrap();
    assert_eq!(results.cleaned_data.rows, 2);
    let report = results.quality_report.unwrap();
    assert_eq!(report.duplicate_count, 1);
    assert_eq!(report.column_analysis["a"].mean, Some(2.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_retrigger_completed_job_is_noop() {
    let jobs = orchestrator();
    let id = run_to_end(&jobs, SAMPLE).await;
    let before = jobs.snapshot(id).unwrap();

    let status = jobs.trigger(id).unwrap();
    assert_eq!(status.status, JobStatus::Completed);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let after = jobs.snapshot(id).unwrap();
    assert_eq!(before, after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_triggers_run_once() {
    let jobs = orchestrator();
    let id = jobs.upload(SAMPLE.as_bytes()).job_id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let jobs = jobs.clone();
            tokio::spawn(async move { jobs.trigger(id).unwrap().status })
        })
        .collect();
    for handle in handles {
        let status = handle.await.unwrap();
        assert_ne!(status, JobStatus::Queued);
    }

    jobs.wait(id).await.unwrap();
    let snapshot = jobs.snapshot(id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Completed);
    assert!(snapshot.started_at.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_job() {
    let jobs = orchestrator();
    let id = JobId::new();

    assert!(matches!(jobs.results(id), Err(JobError::UnknownJob(_))));
    assert!(matches!(jobs.trigger(id), Err(JobError::UnknownJob(_))));
    assert_eq!(jobs.status(id).unwrap_err().error_code(), "UNKNOWN_JOB");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parse_failure_surfaces_through_status() {
    let jobs = orchestrator();
    let id = jobs.upload(vec![0xff, 0xfe, 0x00, b'\n']).job_id;

    // The trigger itself succeeds
    jobs.trigger(id).unwrap();
    let status = jobs.wait(id).await.unwrap();
    assert_eq!(status.status, JobStatus::Failed);
    assert!(status.error.is_some());

    let snapshot = jobs.snapshot(id).unwrap();
    assert_eq!(snapshot.failure.unwrap().code, "PARSE_ERROR");
    assert!(snapshot.raw_data.is_none());

    assert!(matches!(jobs.results(id), Err(JobError::JobFailed { .. })));
    assert!(matches!(jobs.export(id), Err(JobError::JobFailed { .. })));
    assert!(matches!(jobs.raw_data(id), Err(JobError::JobFailed { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_upload_fails() {
    let jobs = orchestrator();
    let id = run_to_end(&jobs, "").await;
    assert_eq!(jobs.status(id).unwrap().status, JobStatus::Failed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_oversized_upload_fails_fast() {
    let jobs = JobOrchestrator::new(OrchestratorConfig {
        analysis: AnalysisConfig::builder().max_input_bytes(8).build().unwrap(),
        ..Default::default()
    })
    .unwrap();
    let id = run_to_end(&jobs, SAMPLE).await;

    let snapshot = jobs.snapshot(id).unwrap();
    assert_eq!(snapshot.status, JobStatus::Failed);
    assert_eq!(snapshot.failure.unwrap().code, "DATASET_TOO_LARGE");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timeout_marks_job_failed() {
    let jobs = JobOrchestrator::new(OrchestratorConfig {
        job_timeout_ms: Some(1),
        ..Default::default()
    })
    .unwrap();
    let csv = large_csv();
    let id = run_to_end(&jobs, &csv).await;

    let status = jobs.status(id).unwrap();
    assert_eq!(status.status, JobStatus::Failed);
    assert!(status.error.unwrap().contains("timed out"));

    // The pipeline finishing later must not overwrite the failure
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(jobs.status(id).unwrap().status, JobStatus::Failed);
}

// ============================================================================
// Retrieval
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_export_matches_results() {
    let jobs = orchestrator();
    let id = run_to_end(&jobs, SAMPLE).await;

    let bytes = jobs.export(id).unwrap();
    let report: QualityReport = jobs.results(id).unwrap().quality_report.unwrap();
    assert_eq!(bytes, ReportGenerator::export(&report).unwrap());

    let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(document["duplicate_count"], 1);

    // Same content, same bytes
    assert_eq!(bytes, jobs.export(id).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_identical_uploads_export_identically() {
    let jobs = orchestrator();
    let first = run_to_end(&jobs, SAMPLE).await;
    let second = run_to_end(&jobs, SAMPLE).await;
    assert_ne!(first, second);
    assert_eq!(jobs.export(first).unwrap(), jobs.export(second).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_raw_data_is_verbatim() {
    let jobs = orchestrator();
    let id = run_to_end(&jobs, "name,name\n  Ann ,NA\nBob,\n").await;

    let raw = jobs.raw_data(id).unwrap();
    assert_eq!(raw.header, vec!["name", "name"]);
    assert_eq!(
        raw.rows,
        vec![
            vec!["  Ann ".to_string(), "NA".to_string()],
            vec!["Bob".to_string(), String::new()],
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_header_only_completes_without_report() {
    let jobs = orchestrator();
    let id = run_to_end(&jobs, "a,b,c\n").await;

    assert_eq!(jobs.status(id).unwrap().status, JobStatus::Completed);
    let results = jobs.results(id).unwrap();
    assert_eq!(results.cleaned_data.rows, 0);
    assert_eq!(results.cleaned_data.columns, 3);
    assert!(results.quality_report.is_none());

    let json = serde_json::to_value(&results).unwrap();
    assert!(json.get("quality_report").is_none());
    assert!(matches!(jobs.export(id), Err(JobError::NoReport { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_jobs_in_parallel() {
    let jobs = JobOrchestrator::new(OrchestratorConfig {
        max_concurrent_jobs: 2,
        ..Default::default()
    })
    .unwrap();

    let ids: Vec<JobId> = (0..6)
        .map(|i| {
            let csv = format!("k,v\n{},a\n{},b\n", i, i + 1);
            let id = jobs.upload(csv.into_bytes()).job_id;
            jobs.trigger(id).unwrap();
            id
        })
        .collect();

    for id in &ids {
        assert_eq!(jobs.wait(*id).await.unwrap().status, JobStatus::Completed);
    }
    assert_eq!(jobs.store().len(), 6);

    // Jobs do not share results
    let means: Vec<Option<f64>> = ids
        .iter()
        .map(|id| {
            jobs.results(*id).unwrap().quality_report.unwrap().column_analysis["k"].mean
        })
        .collect();
    let expected: Vec<Option<f64>> = (0..6).map(|i| Some(i as f64 + 0.5)).collect();
    assert_eq!(means, expected);
}
