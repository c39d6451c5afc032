//! Dataset-level quality metrics and the weighted quality score.
//!
//! [`QualityMetrics::collect`] aggregates the joined column profiles;
//! [`QualityScorer`] turns the rates into a score in `[0, 1]` and assembles
//! the final [`QualityReport`].

use crate::cleaner::CleanedDataset;
use crate::config::ScoreWeights;
use crate::profiler::ColumnProfile;
use crate::types::QualityReport;
use crate::utils::ratio;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dataset-level rates feeding the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub missing_rate: f64,
    pub duplicate_rate: f64,
    pub outlier_rate: f64,
    /// Σ valid / Σ non-missing over all columns; 1.0 when nothing was checked.
    pub consistency_ratio: f64,
}

impl QualityMetrics {
    /// Aggregate rates from the cleaned dataset and its joined column profiles.
    pub fn collect(dataset: &CleanedDataset, profiles: &[ColumnProfile]) -> Self {
        let cells = dataset.rows() * dataset.columns();
        let numeric_cells: usize = profiles.iter().map(|p| p.numeric_cells).sum();
        let outliers: usize = profiles.iter().map(|p| p.outlier_count).sum();
        let valid: usize = profiles.iter().map(|p| p.analysis.valid).sum();
        let checked: usize = profiles.iter().map(ColumnProfile::checked_cells).sum();

        Self {
            missing_rate: ratio(dataset.missing_cells(), cells),
            duplicate_rate: dataset.duplicate_rate(),
            outlier_rate: ratio(outliers, numeric_cells),
            consistency_ratio: if checked == 0 {
                1.0
            } else {
                ratio(valid, checked)
            },
        }
    }
}

/// Combines quality metrics into a score in [0, 1].
///
/// `score = w_m(1 - missing) + w_d(1 - duplicate) + w_o(1 - outlier)
///        + w_c * consistency`
///
/// With every weight positive the score strictly decreases in each rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScorer {
    weights: ScoreWeights,
}

impl QualityScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, metrics: &QualityMetrics) -> f64 {
        let w = &self.weights;
        let score = w.missing * (1.0 - metrics.missing_rate)
            + w.duplicate * (1.0 - metrics.duplicate_rate)
            + w.outlier * (1.0 - metrics.outlier_rate)
            + w.consistency * metrics.consistency_ratio;
        score.clamp(0.0, 1.0)
    }

    /// Build the report from fully joined column profiles.
    pub fn build_report(
        &self,
        dataset: &CleanedDataset,
        profiles: Vec<ColumnProfile>,
    ) -> QualityReport {
        let metrics = QualityMetrics::collect(dataset, &profiles);
        let quality_score = self.score(&metrics);

        let mut type_consistency = BTreeMap::new();
        let mut column_analysis = BTreeMap::new();
        let mut numeric_stats = BTreeMap::new();

        for profile in profiles {
            type_consistency.insert(profile.name.clone(), profile.type_consistency);
            if let Some(summary) = profile.numeric_summary {
                numeric_stats.insert(profile.name.clone(), summary);
            }
            column_analysis.insert(profile.name, profile.analysis);
        }

        QualityReport {
            missing_rate: metrics.missing_rate,
            duplicate_rate: metrics.duplicate_rate,
            duplicate_count: dataset.duplicate_count(),
            outlier_rate: metrics.outlier_rate,
            quality_score,
            type_consistency,
            column_analysis,
            numeric_stats,
        }
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DataCleaner;
    use crate::config::AnalysisConfig;
    use crate::profiler::DataProfiler;
    use crate::types::RawDataset;

    fn metrics(missing: f64, duplicate: f64, outlier: f64, consistency: f64) -> QualityMetrics {
        QualityMetrics {
            missing_rate: missing,
            duplicate_rate: duplicate,
            outlier_rate: outlier,
            consistency_ratio: consistency,
        }
    }

    #[test]
    fn test_perfect_data_scores_one() {
        let score = QualityScorer::default().score(&metrics(0.0, 0.0, 0.0, 1.0));
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_worst_data_scores_zero() {
        let score = QualityScorer::default().score(&metrics(1.0, 1.0, 1.0, 0.0));
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn test_weighted_terms() {
        // 0.35*0.9 + 0.20*1 + 0.15*1 + 0.30*1
        let score = QualityScorer::default().score(&metrics(0.1, 0.0, 0.0, 1.0));
        assert!((score - 0.965).abs() < 1e-12);
    }

    #[test]
    fn test_score_strictly_decreases_in_each_rate() {
        let scorer = QualityScorer::default();
        let base = scorer.score(&metrics(0.2, 0.2, 0.2, 0.8));
        assert!(scorer.score(&metrics(0.3, 0.2, 0.2, 0.8)) < base);
        assert!(scorer.score(&metrics(0.2, 0.3, 0.2, 0.8)) < base);
        assert!(scorer.score(&metrics(0.2, 0.2, 0.3, 0.8)) < base);
        assert!(scorer.score(&metrics(0.2, 0.2, 0.2, 0.7)) < base);
    }

    #[test]
    fn test_build_report_joins_profiles_by_column() {
        let config = AnalysisConfig::default();
        let raw = RawDataset {
            header: vec!["a".into(), "b".into()],
            rows: vec![
                vec!["1".into(), "x".into()],
                vec!["1".into(), "x".into()],
                vec!["3".into(), "".into()],
            ],
        };
        let cleaned = DataCleaner::new(&config).clean(&raw).unwrap();
        let profiles = DataProfiler::new(&config).profile_dataset(&cleaned).unwrap();

        let scorer = QualityScorer::default();
        let expected = scorer.score(&QualityMetrics::collect(&cleaned, &profiles));
        let report = scorer.build_report(&cleaned, profiles);

        assert_eq!(report.duplicate_count, 1);
        assert!((report.missing_rate - 0.25).abs() < 1e-12);
        assert_eq!(report.quality_score, expected);
        let columns: Vec<&str> = report.column_analysis.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(report.type_consistency.len(), 2);
        assert!(report.numeric_stats.contains_key("a"));
        assert!(!report.numeric_stats.contains_key("b"));
        assert_eq!(report.column_analysis["a"].mean, Some(2.0));
    }
}
