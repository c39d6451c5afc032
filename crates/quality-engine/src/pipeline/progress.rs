//! Progress reporting for the analysis pipeline.
//!
//! The pipeline emits a [`ProgressUpdate`] at every stage boundary. The job
//! orchestrator uses these to expose the current stage while a job is
//! analyzing.
//!
//! # Example
//!
//! ```rust,ignore
//! use quality_engine::Pipeline;
//!
//! let outcome = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(&bytes)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Parsing the uploaded bytes
    Ingesting,
    /// Trimming, normalizing missing values and removing duplicates
    Cleaning,
    /// Type, statistical and outlier profiling per column
    Profiling,
    /// Aggregating rates and computing the quality score
    Scoring,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ingesting => "Ingesting Data",
            Self::Cleaning => "Cleaning Data",
            Self::Profiling => "Profiling Columns",
            Self::Scoring => "Scoring Quality",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Typical share of the total run spent in this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Ingesting => 0.15,
            Self::Cleaning => 0.20,
            Self::Profiling => 0.55,
            Self::Scoring => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Ingesting => 0.0,
            Self::Cleaning => 0.15,
            Self::Profiling => 0.35,
            Self::Scoring => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Progress update emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Items processed in the current stage (e.g. columns profiled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Creates a progress update with item counts.
    pub fn with_items(
        stage: AnalysisStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }
}

/// Trait for receiving progress updates during analysis.
///
/// Implementations must be `Send + Sync`: the pipeline runs on a blocking
/// worker thread while the job store is read from async tasks.
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage boundary. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(AnalysisStage::Cleaning, 0.5, "Cleaning...");
        assert_eq!(update.stage, AnalysisStage::Cleaning);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(AnalysisStage::Profiling, 3, 4, "Profiled 3/4");
        assert_eq!(update.stage_progress, 0.75);
        assert_eq!(update.items_processed, Some(3));
        assert_eq!(update.items_total, Some(4));
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done!");
        assert_eq!(update.stage, AnalysisStage::Complete);
        assert_eq!(update.progress, 1.0);
        assert!(update.stage.is_terminal());
    }

    #[test]
    fn test_stage_weights_sum() {
        let stages = [
            AnalysisStage::Ingesting,
            AnalysisStage::Cleaning,
            AnalysisStage::Profiling,
            AnalysisStage::Scoring,
        ];
        let total_weight: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");

        // Each stage starts where the previous one ends
        for pair in stages.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stage_json_values() {
        let stage_expectations = [
            (AnalysisStage::Ingesting, "\"ingesting\""),
            (AnalysisStage::Cleaning, "\"cleaning\""),
            (AnalysisStage::Profiling, "\"profiling\""),
            (AnalysisStage::Scoring, "\"scoring\""),
            (AnalysisStage::Complete, "\"complete\""),
            (AnalysisStage::Failed, "\"failed\""),
        ];

        for (stage, expected_json) in stage_expectations {
            let json = serde_json::to_string(&stage).expect("Should serialize");
            assert_eq!(json, expected_json);
        }
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(
                AnalysisStage::Profiling,
                0.5,
                "Test from background thread",
            ));
        });

        handle.join().expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
