//! Data quality scoring module.
//!
//! This module aggregates the per-column profiles into dataset-level rates
//! and combines them into a single quality score.

mod scorer;

pub use scorer::{QualityMetrics, QualityScorer};
