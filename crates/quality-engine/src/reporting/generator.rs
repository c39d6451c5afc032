use crate::error::Result;
use crate::types::{AnalysisOutcome, InferredType, QualityReport};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Writes quality reports in their exported forms.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Serialize a report as the standalone export document.
    ///
    /// The bytes equal the pretty-printed `quality_report` field of the
    /// results, and are identical for identical reports.
    pub fn export(report: &QualityReport) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(report)?)
    }

    /// Write `<base>_quality_report.json` into the output directory.
    pub fn write_report_to_file(
        &self,
        report: &QualityReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_quality_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(&Self::export(report)?)?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Render a plain-text summary of an analysis outcome.
    pub fn render_summary(outcome: &AnalysisOutcome) -> String {
        let mut out = String::new();
        let cleaned = outcome.cleaned_data;
        let _ = writeln!(
            out,
            "Cleaned dataset: {} rows x {} columns",
            cleaned.rows, cleaned.columns
        );

        let Some(report) = &outcome.quality_report else {
            let _ = writeln!(out, "No data rows; no quality report was produced.");
            return out;
        };

        let _ = writeln!(out, "Quality score:  {:.1}%", report.quality_score * 100.0);
        let _ = writeln!(out, "Missing rate:   {:.2}%", report.missing_rate * 100.0);
        let _ = writeln!(
            out,
            "Duplicate rate: {:.2}% ({} rows)",
            report.duplicate_rate * 100.0,
            report.duplicate_count
        );
        let _ = writeln!(out, "Outlier rate:   {:.2}%", report.outlier_rate * 100.0);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<24} {:<12} {:<15} {:>8} {:>9} {:>8}",
            "column", "type", "check", "distinct", "missing", "invalid"
        );

        for (name, column) in &report.column_analysis {
            let _ = writeln!(
                out,
                "{:<24} {:<12} {:<15} {:>8} {:>8.1}% {:>8}",
                truncate(name, 24),
                column.inferred_type.as_str(),
                column.type_check.as_str(),
                column.cardinality,
                column.missing_pct * 100.0,
                column.invalid
            );
            if column.inferred_type == InferredType::Numeric
                && let (Some(min), Some(max), Some(mean)) = (column.min, column.max, column.mean)
            {
                let _ = writeln!(
                    out,
                    "    min {:.4}  max {:.4}  mean {:.4}  outliers {}",
                    min,
                    max,
                    mean,
                    column.outlier_count.unwrap_or(0)
                );
            }
        }

        out
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let cut: String = name.chars().take(width.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}
