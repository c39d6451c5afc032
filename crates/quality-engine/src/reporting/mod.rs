//! Report generation module.
//!
//! This module turns a [`QualityReport`](crate::types::QualityReport) into
//! its exported forms:
//! - The standalone JSON export document (also used by `--json`)
//! - A JSON file written next to other outputs (`--emit-report`)
//! - A plain-text summary for terminals
//!
//! # Example
//!
//! ```rust,ignore
//! use quality_engine::reporting::ReportGenerator;
//!
//! let bytes = ReportGenerator::export(&report)?;
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report_to_file(&report, "train")?;
//! ```

mod generator;

pub use generator::ReportGenerator;
