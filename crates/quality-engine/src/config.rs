//! Configuration types for the quality analysis engine.
//!
//! This module provides configuration options using the builder pattern.
//! Every value that influences the report is pinned here so that a given
//! configuration and input always produce the same report.

use crate::types::ExpectedType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Method used to flag outliers in numeric columns.
///
/// The method applies uniformly to every column of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Flag values below `Q1 - k*IQR` or above `Q3 + k*IQR`
    #[default]
    Iqr,
    /// Flag values more than `z` standard deviations from the mean
    ZScore,
}

/// Weights used to combine the quality metrics into one score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub missing: f64,
    pub duplicate: f64,
    pub outlier: f64,
    pub consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            missing: 0.35,
            duplicate: 0.20,
            outlier: 0.15,
            consistency: 0.30,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.missing + self.duplicate + self.outlier + self.consistency
    }
}

/// Configuration for one analysis run.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use quality_engine::config::{AnalysisConfig, OutlierMethod};
///
/// let config = AnalysisConfig::builder()
///     .numeric_threshold(0.9)
///     .outlier_method(OutlierMethod::ZScore)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Field delimiter of the uploaded table.
    /// Default: b','
    pub delimiter: u8,

    /// Uploads larger than this are rejected before parsing.
    /// Default: 100 MiB
    pub max_input_bytes: usize,

    /// Cell values treated as missing after trimming (case-insensitive).
    /// Default: "", "NA", "N/A", "null"
    pub missing_tokens: Vec<String>,

    /// Share of non-missing values that must parse as numbers for a column
    /// to be inferred numeric (0.0 - 1.0).
    /// Default: 0.95
    pub numeric_threshold: f64,

    /// Minimum share of non-missing values matching a string format
    /// (email/date/id) for that format to be reported (0.0 - 1.0).
    /// Default: 0.8
    pub format_confidence_threshold: f64,

    /// Distinct/non-missing ratio above which long values count as free text.
    /// Default: 0.7
    pub text_unique_ratio: f64,

    /// Average character length above which unique values count as free text.
    /// Default: 30.0
    pub text_min_avg_length: f64,

    /// Number of equal-width histogram buckets.
    /// Default: 10
    pub histogram_bins: usize,

    /// Share of the most frequent value above which a column is near-constant.
    /// Default: 0.95
    pub near_constant_threshold: f64,

    /// Outlier detection method.
    /// Default: Iqr
    pub outlier_method: OutlierMethod,

    /// IQR fence multiplier.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Z-score cutoff.
    /// Default: 3.0
    pub z_score_threshold: f64,

    /// Weights of the quality score terms.
    pub score_weights: ScoreWeights,

    /// Declared expected types, keyed by column name.
    /// Default: empty
    pub expected_types: BTreeMap<String, ExpectedType>,

    /// Whether to profile columns in parallel.
    /// Default: true
    pub parallel_columns: bool,
}

pub const DEFAULT_MISSING_TOKENS: [&str; 4] = ["", "NA", "N/A", "null"];

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_input_bytes: 100 * 1024 * 1024,
            missing_tokens: DEFAULT_MISSING_TOKENS.iter().map(|s| s.to_string()).collect(),
            numeric_threshold: 0.95,
            format_confidence_threshold: 0.8,
            text_unique_ratio: 0.7,
            text_min_avg_length: 30.0,
            histogram_bins: 10,
            near_constant_threshold: 0.95,
            outlier_method: OutlierMethod::default(),
            iqr_multiplier: 1.5,
            z_score_threshold: 3.0,
            score_weights: ScoreWeights::default(),
            expected_types: BTreeMap::new(),
            parallel_columns: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let ratios = [
            ("numeric_threshold", self.numeric_threshold),
            ("format_confidence_threshold", self.format_confidence_threshold),
            ("text_unique_ratio", self.text_unique_ratio),
            ("near_constant_threshold", self.near_constant_threshold),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        if self.max_input_bytes == 0 {
            return Err(ConfigValidationError::InvalidInputLimit);
        }

        for (field, value) in [
            ("iqr_multiplier", self.iqr_multiplier),
            ("z_score_threshold", self.z_score_threshold),
            ("text_min_avg_length", self.text_min_avg_length),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigValidationError::InvalidPositive {
                    field: field.to_string(),
                    value,
                });
            }
        }

        let w = &self.score_weights;
        let all_positive = [w.missing, w.duplicate, w.outlier, w.consistency]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if !all_positive || (w.sum() - 1.0).abs() > 1e-9 {
            return Err(ConfigValidationError::InvalidWeights(w.sum()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be a positive number)")]
    InvalidPositive { field: String, value: f64 },

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Invalid input limit: max_input_bytes must be at least 1")]
    InvalidInputLimit,

    #[error("Invalid score weights: each must be positive and they must sum to 1.0 (got {0})")]
    InvalidWeights(f64),
}

impl From<ConfigValidationError> for crate::error::QualityError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::QualityError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    base: Option<AnalysisConfig>,
    delimiter: Option<u8>,
    max_input_bytes: Option<usize>,
    missing_tokens: Option<Vec<String>>,
    numeric_threshold: Option<f64>,
    format_confidence_threshold: Option<f64>,
    histogram_bins: Option<usize>,
    near_constant_threshold: Option<f64>,
    outlier_method: Option<OutlierMethod>,
    iqr_multiplier: Option<f64>,
    z_score_threshold: Option<f64>,
    score_weights: Option<ScoreWeights>,
    expected_types: BTreeMap<String, ExpectedType>,
    parallel_columns: Option<bool>,
}

impl AnalysisConfigBuilder {
    /// Start from an existing configuration (e.g. loaded from a file)
    /// instead of the defaults.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self {
            base: Some(config),
            ..Self::default()
        }
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the maximum accepted upload size in bytes.
    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Replace the set of missing-value tokens.
    pub fn missing_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Set the numeric majority threshold.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.95 = 95%)
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.numeric_threshold = Some(threshold);
        self
    }

    /// Set the minimum confidence for a string format to be reported.
    pub fn format_confidence_threshold(mut self, threshold: f64) -> Self {
        self.format_confidence_threshold = Some(threshold);
        self
    }

    /// Set the number of histogram buckets.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the near-constant threshold.
    pub fn near_constant_threshold(mut self, threshold: f64) -> Self {
        self.near_constant_threshold = Some(threshold);
        self
    }

    /// Set the outlier detection method.
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self
    }

    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Set the z-score cutoff.
    pub fn z_score_threshold(mut self, z: f64) -> Self {
        self.z_score_threshold = Some(z);
        self
    }

    /// Set the quality score weights.
    pub fn score_weights(mut self, weights: ScoreWeights) -> Self {
        self.score_weights = Some(weights);
        self
    }

    /// Declare the expected type of a column.
    pub fn expected_type(mut self, column: impl Into<String>, expected: ExpectedType) -> Self {
        self.expected_types.insert(column.into(), expected);
        self
    }

    /// Enable or disable parallel column profiling.
    pub fn parallel_columns(mut self, parallel: bool) -> Self {
        self.parallel_columns = Some(parallel);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let mut expected_types = base.expected_types;
        expected_types.extend(self.expected_types);

        let config = AnalysisConfig {
            delimiter: self.delimiter.unwrap_or(base.delimiter),
            max_input_bytes: self.max_input_bytes.unwrap_or(base.max_input_bytes),
            missing_tokens: self.missing_tokens.unwrap_or(base.missing_tokens),
            numeric_threshold: self.numeric_threshold.unwrap_or(base.numeric_threshold),
            format_confidence_threshold: self
                .format_confidence_threshold
                .unwrap_or(base.format_confidence_threshold),
            text_unique_ratio: base.text_unique_ratio,
            text_min_avg_length: base.text_min_avg_length,
            histogram_bins: self.histogram_bins.unwrap_or(base.histogram_bins),
            near_constant_threshold: self
                .near_constant_threshold
                .unwrap_or(base.near_constant_threshold),
            outlier_method: self.outlier_method.unwrap_or(base.outlier_method),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(base.iqr_multiplier),
            z_score_threshold: self.z_score_threshold.unwrap_or(base.z_score_threshold),
            score_weights: self.score_weights.unwrap_or(base.score_weights),
            expected_types,
            parallel_columns: self.parallel_columns.unwrap_or(base.parallel_columns),
        };

        config.validate()?;
        Ok(config)
    }
}
