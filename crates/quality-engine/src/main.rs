//! CLI entry point for the data quality analysis engine.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use quality_engine::{
    AnalysisConfig, AnalysisConfigBuilder, OutlierMethod, Pipeline, ReportGenerator,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CLI-compatible outlier method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierMethod {
    /// Flag values outside Q1 - 1.5*IQR .. Q3 + 1.5*IQR
    Iqr,
    /// Flag values more than 3 standard deviations from the mean
    ZScore,
}

impl From<CliOutlierMethod> for OutlierMethod {
    fn from(cli: CliOutlierMethod) -> Self {
        match cli {
            CliOutlierMethod::Iqr => OutlierMethod::Iqr,
            CliOutlierMethod::ZScore => OutlierMethod::ZScore,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "CSV data quality analysis",
    long_about = "Analyzes a delimited table: cleaning, type inference, distribution \
                  profiling, outlier detection and a combined quality score.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  quality-engine -i data.csv\n\n  \
                  # Machine-readable report\n  \
                  quality-engine -i data.csv --json | jq .quality_report.quality_score\n\n  \
                  # Semicolon-separated file, z-score outliers, report file\n  \
                  quality-engine -i data.csv --delimiter ';' --outlier-method z-score -r -o out/"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for the report file
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logging; only the analysis outcome is printed.
    #[arg(long)]
    json: bool,

    /// Write the quality report to <output>/<input_name>_quality_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Outlier detection method (overrides the config file)
    #[arg(long, value_enum)]
    outlier_method: Option<CliOutlierMethod>,

    /// Field delimiter, a single ASCII character (overrides the config file)
    #[arg(long)]
    delimiter: Option<char>,

    /// Number of histogram buckets (overrides the config file)
    #[arg(long)]
    histogram_bins: Option<usize>,

    /// JSON file containing an analysis configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base);

    if let Some(method) = args.outlier_method {
        builder = builder.outlier_method(method.into());
    }
    if let Some(delimiter) = args.delimiter {
        if !delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
        }
        builder = builder.delimiter(delimiter as u8);
    }
    if let Some(bins) = args.histogram_bins {
        builder = builder.histogram_bins(bins);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;
    debug!("Configuration: {:?}", config);

    info!("Loading dataset from: {}", args.input);
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", args.input))?;

    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(|update| {
            debug!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    let outcome = pipeline
        .process(&bytes)
        .map_err(|e| anyhow!("[{}] {}", e.error_code(), e))?;

    if args.emit_report {
        match &outcome.quality_report {
            Some(report) => {
                let stem = input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("dataset");
                let path = ReportGenerator::new(PathBuf::from(&args.output))
                    .write_report_to_file(report, stem)?;
                if !args.json {
                    info!("Quality report written to {}", path.display());
                }
            }
            None => warn!("Dataset has no data rows; no report file written"),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", ReportGenerator::render_summary(&outcome));
    }

    Ok(())
}
