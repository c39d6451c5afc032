//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! sequencing ingest, cleaning, profiling and scoring.

use crate::cleaner::DataCleaner;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::ingest;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::quality::QualityScorer;
use crate::types::{AnalysisOutcome, RawDataset};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The analysis pipeline.
///
/// A pipeline holds no per-run state and can be shared between threads;
/// every call to [`process`](Self::process) is independent.
///
/// # Example
///
/// ```rust,ignore
/// use quality_engine::{AnalysisConfig, OutlierMethod, Pipeline};
///
/// let outcome = Pipeline::builder()
///     .config(AnalysisConfig::builder().outlier_method(OutlierMethod::ZScore).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(b"a,b\n1,2\n3,x\n")?;
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    scorer: QualityScorer,
}

// Shared across the blocking pool by the job orchestrator
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Ingest and analyze uploaded bytes in one call.
    pub fn process(&self, bytes: &[u8]) -> Result<AnalysisOutcome> {
        let raw = self.ingest(bytes)?;
        self.analyze(&raw)
    }

    /// Parse uploaded bytes into the raw table.
    ///
    /// # Errors
    ///
    /// `Parse` or `DatasetTooLarge`; a failed update is reported first.
    pub fn ingest(&self, bytes: &[u8]) -> Result<RawDataset> {
        info!("Ingesting {} bytes...", bytes.len());
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Ingesting,
            0.0,
            "Parsing uploaded data...",
        ));

        let raw = ingest::ingest(bytes, &self.config).inspect_err(|e| self.fail(e))?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Ingesting,
            1.0,
            format!("Parsed {} rows x {} columns", raw.row_count(), raw.column_count()),
        ));
        Ok(raw)
    }

    /// Clean, profile and score an ingested table.
    ///
    /// A table without data rows completes with `quality_report: None`.
    pub fn analyze(&self, raw: &RawDataset) -> Result<AnalysisOutcome> {
        match self.analyze_internal(raw) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn analyze_internal(&self, raw: &RawDataset) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();

        // Step 1: Cleaning
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        let cleaned = DataCleaner::new(&self.config).clean(raw)?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            1.0,
            format!("Removed {} duplicate rows", cleaned.duplicate_count()),
        ));

        if cleaned.rows() == 0 {
            info!("Dataset has no data rows; skipping profiling");
            return Ok(AnalysisOutcome {
                cleaned_data: cleaned.summary(),
                quality_report: None,
            });
        }

        // Step 2: Per-column profiling (joined before scoring)
        let columns = cleaned.columns();
        self.report_progress(ProgressUpdate::with_items(
            AnalysisStage::Profiling,
            0,
            columns,
            "Profiling columns...",
        ));
        info!("Profiling {} columns...", columns);
        let profiles = DataProfiler::new(&self.config).profile_dataset(&cleaned)?;
        self.report_progress(ProgressUpdate::with_items(
            AnalysisStage::Profiling,
            profiles.len(),
            columns,
            "Profiling complete",
        ));

        // Step 3: Scoring
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Scoring,
            0.0,
            "Scoring data quality...",
        ));
        let report = self.scorer.build_report(&cleaned, profiles);

        info!(
            "Analysis finished in {:.2?}: score {:.3}, {} duplicates, missing rate {:.3}",
            start_time.elapsed(),
            report.quality_score,
            report.duplicate_count,
            report.missing_rate
        );

        Ok(AnalysisOutcome {
            cleaned_data: cleaned.summary(),
            quality_report: Some(report),
        })
    }

    fn fail(&self, e: &crate::error::QualityError) {
        error!("Pipeline error: {}", e);
        self.report_progress(ProgressUpdate::failed(e.to_string()));
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use quality_engine::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StageLogger;
    ///
    /// impl ProgressReporter for StageLogger {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(StageLogger))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            scorer: QualityScorer::new(config.score_weights),
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
