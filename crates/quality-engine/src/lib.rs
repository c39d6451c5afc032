//! CSV Data Quality Analysis Engine
//!
//! A deterministic data quality analysis library built with Rust and Polars.
//!
//! # Overview
//!
//! Given the bytes of an uploaded delimited table, the engine:
//!
//! - **Ingests** the table (RFC 4180 quoting, ragged rows, BOM stripping)
//! - **Cleans** it: trims cells, normalizes missing-value tokens and removes
//!   exact-duplicate rows
//! - **Profiles** every column: inferred type, format confidences
//!   (email/date/id), cardinality, missingness and, for numeric columns,
//!   central tendency, dispersion and distribution shape
//! - **Detects outliers** with a single configured method (IQR or z-score)
//! - **Scores** the dataset with a weighted combination of missing,
//!   duplicate, outlier and type-consistency rates
//!
//! Identical input bytes and configuration always produce an identical
//! [`QualityReport`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quality_engine::{AnalysisConfig, OutlierMethod, Pipeline};
//!
//! let config = AnalysisConfig::builder()
//!     .outlier_method(OutlierMethod::Iqr)
//!     .numeric_threshold(0.95)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .build()?
//!     .process(&std::fs::read("data.csv")?)?;
//!
//! if let Some(report) = outcome.quality_report {
//!     println!("Quality score: {:.3}", report.quality_score);
//! }
//! ```
//!
//! # Staged Use
//!
//! Callers that need the raw table before analysis finishes (for example a
//! job store serving a raw-data view) can run the stages separately:
//!
//! ```rust,ignore
//! let pipeline = Pipeline::builder().build()?;
//! let raw = pipeline.ingest(&bytes)?;
//! // ... publish `raw` ...
//! let outcome = pipeline.analyze(&raw)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CleanedDataset, DataCleaner};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, OutlierMethod, ScoreWeights,
};
pub use error::{QualityError, Result as QualityResult, ResultExt};
pub use pipeline::{
    AnalysisStage, ClosureProgressReporter, OutlierDetector, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::{ColumnProfile, DataProfiler};
pub use quality::{QualityMetrics, QualityScorer};
pub use reporting::ReportGenerator;
pub use types::{
    AnalysisOutcome, CleanedSummary, ColumnAnalysis, Distribution, ExpectedType, Histogram,
    InferredType, NumericSummary, QualityReport, RawDataset, StringFormat, StringLengthStats,
    TypeCheck, TypeConsistencyEntry,
};
