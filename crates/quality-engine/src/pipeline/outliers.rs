//! Outlier detection module.
//!
//! Flags anomalous values in numeric columns. One method is used for every
//! column of a run so that `outlier_rate` is reproducible.

use crate::config::{AnalysisConfig, OutlierMethod};
use crate::profiler::statistics::quantile;

/// Detects outliers in the numeric values of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierDetector {
    method: OutlierMethod,
    iqr_multiplier: f64,
    z_score_threshold: f64,
}

impl OutlierDetector {
    pub fn new(method: OutlierMethod, iqr_multiplier: f64, z_score_threshold: f64) -> Self {
        Self {
            method,
            iqr_multiplier,
            z_score_threshold,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.outlier_method,
            config.iqr_multiplier,
            config.z_score_threshold,
        )
    }

    pub fn method(&self) -> OutlierMethod {
        self.method
    }

    /// Count outliers among `sorted` (ascending) values.
    ///
    /// Columns without spread (`std == 0`) have no outliers.
    pub fn count(&self, sorted: &[f64], mean: f64, std: f64) -> usize {
        if sorted.is_empty() || std == 0.0 {
            return 0;
        }

        match self.method {
            OutlierMethod::Iqr => {
                let (lower, upper) = self.iqr_fences(sorted);
                sorted.iter().filter(|v| **v < lower || **v > upper).count()
            }
            OutlierMethod::ZScore => sorted
                .iter()
                .filter(|v| ((**v - mean) / std).abs() > self.z_score_threshold)
                .count(),
        }
    }

    /// Lower and upper IQR fences, `Q1 - k*IQR` and `Q3 + k*IQR`.
    pub fn iqr_fences(&self, sorted: &[f64]) -> (f64, f64) {
        let q1 = quantile(sorted, 0.25);
        let q3 = quantile(sorted, 0.75);
        let iqr = q3 - q1;
        (q1 - self.iqr_multiplier * iqr, q3 + self.iqr_multiplier * iqr)
    }
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
