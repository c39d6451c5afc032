//! Data profiling module for column analysis.
//!
//! This module provides functionality for profiling the cleaned dataset:
//! - Type inference and cell classification per column
//! - Statistical and distribution analysis for numeric columns
//! - Outlier counts per numeric column
//!
//! Columns are profiled independently. With `parallel_columns` set they
//! fan out over the rayon pool; results always come back in column order.

pub(crate) mod statistics;
mod type_inference;

use crate::cleaner::CleanedDataset;
use crate::config::AnalysisConfig;
use crate::error::{QualityError, Result};
use crate::pipeline::outliers::OutlierDetector;
use crate::types::{ColumnAnalysis, InferredType, NumericSummary, TypeConsistencyEntry};
use crate::utils::{numeric_values, ratio, string_cells};
use polars::prelude::*;
use rayon::prelude::*;
use tracing::debug;

/// Everything the scorer needs to know about one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub analysis: ColumnAnalysis,
    pub type_consistency: TypeConsistencyEntry,
    /// Present for numeric columns only.
    pub numeric_summary: Option<NumericSummary>,
    /// Numeric cells checked for outliers (0 for non-numeric columns).
    pub numeric_cells: usize,
    pub outlier_count: usize,
}

impl ColumnProfile {
    /// Non-missing cells, the denominator of the consistency ratio.
    pub fn checked_cells(&self) -> usize {
        self.analysis.valid + self.analysis.invalid
    }
}

/// Data profiler for the cleaned dataset.
pub struct DataProfiler<'a> {
    config: &'a AnalysisConfig,
    detector: OutlierDetector,
}

impl<'a> DataProfiler<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            detector: OutlierDetector::from_config(config),
        }
    }

    /// Profile every column, joining all results before returning.
    pub fn profile_dataset(&self, dataset: &CleanedDataset) -> Result<Vec<ColumnProfile>> {
        let columns = dataset.frame().get_columns();
        let rows = dataset.rows();

        if self.config.parallel_columns {
            columns
                .par_iter()
                .map(|column| self.profile_column(column.as_materialized_series(), rows))
                .collect()
        } else {
            columns
                .iter()
                .map(|column| self.profile_column(column.as_materialized_series(), rows))
                .collect()
        }
    }

    /// Profile a single cleaned column.
    pub fn profile_column(&self, series: &Series, rows: usize) -> Result<ColumnProfile> {
        let name = series.name().to_string();
        let cells = string_cells(series).map_err(|e| QualityError::profiling(&name, e))?;
        let types = type_inference::infer_column_type(&cells, self.config);

        let expected = self.config.expected_types.get(&name).copied();
        let valid = types.valid_count(expected);
        let non_missing = types.non_missing();

        let mut analysis = ColumnAnalysis {
            inferred_type: types.inferred_type,
            type_check: types.type_check,
            cardinality: types.cardinality,
            missing_pct: ratio(types.missing, rows),
            valid,
            invalid: non_missing - valid,
            min: None,
            max: None,
            mean: None,
            median: None,
            std: None,
            distribution: None,
            outlier_count: None,
            string_length: None,
            string_format: None,
            string_format_confidence: None,
        };

        let mut numeric_summary = None;
        let mut numeric_cells = 0;
        let mut outlier_count = 0;

        if types.inferred_type == InferredType::Numeric {
            let values = numeric_values(series).map_err(|e| QualityError::profiling(&name, e))?;
            numeric_cells = values.len();

            match statistics::describe(
                values,
                self.config.histogram_bins,
                self.config.near_constant_threshold,
            ) {
                Some(stats) => {
                    if !stats.mean.is_finite() || !stats.std.is_finite() {
                        return Err(QualityError::profiling(&name, "non-finite moments"));
                    }
                    outlier_count = self.detector.count(&stats.sorted, stats.mean, stats.std);
                    analysis.min = Some(stats.min);
                    analysis.max = Some(stats.max);
                    analysis.mean = Some(stats.mean);
                    analysis.median = Some(stats.median);
                    analysis.std = Some(stats.std);
                    analysis.distribution = Some(stats.distribution);
                    analysis.outlier_count = Some(outlier_count);
                    numeric_summary = Some(NumericSummary {
                        min: Some(stats.min),
                        max: Some(stats.max),
                        mean: Some(stats.mean),
                    });
                }
                None => {
                    // No numeric values at all: neutral, empty statistics
                    analysis.distribution = Some(Default::default());
                    analysis.outlier_count = Some(0);
                    numeric_summary = Some(NumericSummary::default());
                }
            }
        } else {
            analysis.string_length = types.string_length;
            analysis.string_format = types.string_format;
            analysis.string_format_confidence = Some(types.format_confidence());
        }

        let type_consistency = TypeConsistencyEntry {
            numeric: types.numeric,
            non_numeric: types.non_numeric,
            missing: types.missing,
            valid: expected.map(|_| valid),
            invalid: expected.map(|_| non_missing - valid),
            total: expected.map(|_| non_missing),
        };

        debug!(
            "Profiled '{}': {} ({:?}), {} distinct, {} outliers",
            name,
            types.inferred_type.as_str(),
            types.type_check,
            types.cardinality,
            outlier_count
        );

        Ok(ColumnProfile {
            name,
            analysis,
            type_consistency,
            numeric_summary,
            numeric_cells,
            outlier_count,
        })
    }
}
