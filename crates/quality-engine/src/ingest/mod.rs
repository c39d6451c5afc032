//! Raw ingestion of uploaded bytes into a [`RawDataset`].
//!
//! The first record is the header. Fields follow RFC 4180 quoting; rows may
//! be ragged. Rows longer than the header are cut to the header width, rows
//! that are shorter are kept as-is and read as missing trailing cells.

use crate::config::AnalysisConfig;
use crate::error::{QualityError, Result};
use crate::types::RawDataset;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse uploaded bytes into a raw table.
///
/// # Errors
///
/// - [`QualityError::DatasetTooLarge`] when `bytes` exceeds `max_input_bytes`
/// - [`QualityError::Parse`] when the bytes are not UTF-8 text, a record is
///   malformed, or there is no header row at all
pub fn ingest(bytes: &[u8], config: &AnalysisConfig) -> Result<RawDataset> {
    if bytes.len() > config.max_input_bytes {
        return Err(QualityError::DatasetTooLarge {
            size: bytes.len(),
            limit: config.max_input_bytes,
        });
    }

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| QualityError::Parse(format!("input is not valid UTF-8 text: {}", e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(config.delimiter)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| QualityError::Parse(format!("malformed header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Err(QualityError::Parse("input contains no rows".to_string())),
    };

    let width = header.len();
    let mut rows = Vec::new();
    let mut truncated = 0usize;

    for (index, record) in records.enumerate() {
        // +2: 1-based, after the header line
        let record = record
            .map_err(|e| QualityError::Parse(format!("malformed row {}: {}", index + 2, e)))?;
        if record.len() > width {
            truncated += 1;
        }
        rows.push(record.iter().take(width).map(str::to_string).collect());
    }

    if truncated > 0 {
        warn!(
            "Truncated {} row(s) with more fields than the {}-column header",
            truncated, width
        );
    }

    debug!("Ingested {} rows x {} columns", rows.len(), width);

    Ok(RawDataset { header, rows })
}
