//! Shared utilities for the analysis pipeline.
//!
//! Cell classification and small numeric helpers used by the cleaner,
//! profiler and scorer, kept here so every stage agrees on what counts as
//! numeric or missing.

use polars::prelude::*;

// =============================================================================
// Cell Classification
// =============================================================================

/// How a single cleaned cell is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Missing,
    Numeric,
    Other,
}

/// Parse a cell as a finite number.
///
/// `NaN` and infinities are rejected so that they count as non-numeric text.
///
/// # Example
///
/// ```rust,ignore
/// use quality_engine::utils::parse_numeric;
///
/// assert_eq!(parse_numeric(" 4.5 "), Some(4.5));
/// assert_eq!(parse_numeric("inf"), None);
/// ```
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check if a string parses as a finite number.
#[inline]
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric(s).is_some()
}

/// Classify a cleaned cell, where `None` is the missing sentinel.
pub fn classify_cell(cell: Option<&str>) -> CellClass {
    match cell {
        None => CellClass::Missing,
        Some(v) if is_numeric_string(v) => CellClass::Numeric,
        Some(_) => CellClass::Other,
    }
}

/// Check whether a trimmed cell matches one of the missing tokens,
/// ignoring ASCII case.
pub fn is_missing_token(value: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(value))
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Borrow the cells of a cleaned (string) column.
pub fn string_cells(series: &Series) -> PolarsResult<Vec<Option<&str>>> {
    Ok(series.str()?.into_iter().collect())
}

/// Collect the numeric values of a string column, skipping missing and
/// non-numeric cells.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(series
        .str()?
        .into_iter()
        .flatten()
        .filter_map(parse_numeric)
        .collect())
}

// =============================================================================
// Numeric Helpers
// =============================================================================

/// `numerator / denominator`, or 0 when the denominator is zero.
#[inline]
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Sort a vector of finite floats ascending.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}
