//! Data cleaning for analysis.
//!
//! This module provides functionality for:
//! - Trimming whitespace from every cell
//! - Normalizing missing-value tokens to a single missing sentinel (null)
//! - Removing exact-duplicate rows, keeping the first occurrence
//!
//! The cleaned table is held as a polars [`DataFrame`] of nullable string
//! columns named after the disambiguated header.

mod sanitizers;

use crate::config::AnalysisConfig;
use crate::error::{QualityError, Result, ResultExt};
use crate::types::{CleanedSummary, RawDataset};
use crate::utils::ratio;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// The cleaned table plus duplicate statistics.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    frame: DataFrame,
    raw_rows: usize,
    duplicate_count: usize,
}

impl CleanedDataset {
    /// Columns as nullable string series, in header order.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn rows(&self) -> usize {
        self.frame.height()
    }

    pub fn columns(&self) -> usize {
        self.frame.width()
    }

    pub fn raw_rows(&self) -> usize {
        self.raw_rows
    }

    /// Rows removed as exact duplicates.
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    /// `duplicate_count / raw rows`, 0 for an empty table.
    pub fn duplicate_rate(&self) -> f64 {
        ratio(self.duplicate_count, self.raw_rows)
    }

    /// Number of missing cells across all columns.
    pub fn missing_cells(&self) -> usize {
        self.frame.get_columns().iter().map(|c| c.null_count()).sum()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn summary(&self) -> CleanedSummary {
        CleanedSummary {
            rows: self.rows(),
            columns: self.columns(),
        }
    }
}

/// Data cleaner producing the table every later stage profiles.
pub struct DataCleaner<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DataCleaner<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Clean a raw table.
    ///
    /// Steps:
    /// 1. Trim cells and map missing tokens to null (short rows pad with null)
    /// 2. Drop rows whose normalized content was already seen
    /// 3. Assemble the columns into a [`DataFrame`]
    ///
    /// # Errors
    ///
    /// [`QualityError::EmptyDataset`] when the table has no columns.
    pub fn clean(&self, raw: &RawDataset) -> Result<CleanedDataset> {
        let width = raw.column_count();
        if width == 0 {
            return Err(QualityError::EmptyDataset(
                "header row contains no columns".to_string(),
            ));
        }

        info!("Cleaning {} rows x {} columns...", raw.row_count(), width);

        let tokens = &self.config.missing_tokens;
        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(raw.row_count());
        let mut kept: Vec<Vec<Option<String>>> = Vec::with_capacity(raw.row_count());

        for row in 0..raw.row_count() {
            let normalized: Vec<Option<String>> = (0..width)
                .map(|col| sanitizers::normalize_cell(raw.cell(row, col), tokens))
                .collect();
            if seen.insert(normalized.clone()) {
                kept.push(normalized);
            }
        }

        let duplicate_count = raw.row_count() - kept.len();
        if duplicate_count > 0 {
            debug!("Removed {} duplicate rows", duplicate_count);
        } else {
            debug!("No duplicate rows found");
        }

        let names = sanitizers::disambiguate_names(&raw.header);
        let columns: Vec<Column> = names
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let values: Vec<Option<String>> =
                    kept.iter().map(|row| row[col].clone()).collect();
                Series::new(name.as_str().into(), values).into_column()
            })
            .collect();

        let frame = DataFrame::new(columns).context("Failed to assemble cleaned dataset")?;

        Ok(CleanedDataset {
            frame,
            raw_rows: raw.row_count(),
            duplicate_count,
        })
    }
}
