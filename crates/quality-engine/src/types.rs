use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Datasets
// ============================================================================

/// The uploaded table as parsed, before any cleaning.
///
/// Rows may be shorter than the header; missing trailing cells are treated
/// as absent by later stages. The header is kept verbatim, duplicates and
/// blanks included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataset {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawDataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Cell at `(row, column)`, or `None` when the row is too short.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// Shape of the cleaned dataset, as exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedSummary {
    pub rows: usize,
    pub columns: usize,
}

// ============================================================================
// Type inference
// ============================================================================

/// Semantic type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    Numeric,
    Categorical,
    String,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::String => "string",
        }
    }
}

/// String formats recognised by fixed patterns.
///
/// Declaration order is the tie-break order when two formats reach the
/// same confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringFormat {
    Email,
    Date,
    Id,
}

impl StringFormat {
    pub const ALL: [StringFormat; 3] = [StringFormat::Email, StringFormat::Date, StringFormat::Id];
}

/// Classification label describing how a column's cells line up with its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCheck {
    /// No non-missing values
    Empty,
    /// Every non-missing value is numeric
    Numeric,
    /// Inferred numeric, but some values do not parse
    MostlyNumeric,
    /// Not numeric, with both numeric and non-numeric values present
    Mixed,
    Email,
    Date,
    Id,
    /// Long, mostly unique values
    Text,
    Categorical,
}

impl TypeCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Numeric => "numeric",
            Self::MostlyNumeric => "mostly_numeric",
            Self::Mixed => "mixed",
            Self::Email => "email",
            Self::Date => "date",
            Self::Id => "id",
            Self::Text => "text",
            Self::Categorical => "categorical",
        }
    }
}

impl From<StringFormat> for TypeCheck {
    fn from(format: StringFormat) -> Self {
        match format {
            StringFormat::Email => TypeCheck::Email,
            StringFormat::Date => TypeCheck::Date,
            StringFormat::Id => TypeCheck::Id,
        }
    }
}

/// Type a caller declares a column should have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedType {
    Numeric,
    Categorical,
    String,
    Email,
    Date,
    Id,
}

impl ExpectedType {
    pub fn format(&self) -> Option<StringFormat> {
        match self {
            Self::Email => Some(StringFormat::Email),
            Self::Date => Some(StringFormat::Date),
            Self::Id => Some(StringFormat::Id),
            Self::Numeric | Self::Categorical | Self::String => None,
        }
    }
}

// ============================================================================
// Column analysis
// ============================================================================

/// Equal-width histogram over `[min, max]`.
///
/// `edges` has one more entry than `counts`; the last bucket includes `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Histogram {
    pub counts: Vec<usize>,
    pub edges: Vec<f64>,
}

/// Shape statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Distribution {
    pub histogram: Histogram,
    /// Keyed by level: "0.25", "0.5", "0.75", "0.95".
    pub quantiles: BTreeMap<String, f64>,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution).
    pub kurtosis: f64,
    pub zero_ratio: f64,
    pub is_constant: bool,
    pub is_near_constant: bool,
}

/// Summary of value lengths (in characters) for string-like columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StringLengthStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// Per-column analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis {
    pub inferred_type: InferredType,
    pub type_check: TypeCheck,
    /// Distinct non-missing values.
    pub cardinality: usize,
    pub missing_pct: f64,
    /// Non-missing cells consistent with the expected (or inferred) type.
    pub valid: usize,
    pub invalid: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlier_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_length: Option<StringLengthStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_format: Option<StringFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_format_confidence: Option<BTreeMap<StringFormat, f64>>,
}

/// Legacy per-column view of the numeric/non-numeric split.
///
/// `valid`, `invalid` and `total` are only present when the column has a
/// declared expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConsistencyEntry {
    pub numeric: usize,
    pub non_numeric: usize,
    pub missing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

/// Min/max/mean of a numeric column; all absent when it has no values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NumericSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

// ============================================================================
// Report
// ============================================================================

/// Aggregate data quality report for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub missing_rate: f64,
    pub duplicate_rate: f64,
    pub duplicate_count: usize,
    pub outlier_rate: f64,
    pub quality_score: f64,
    pub type_consistency: BTreeMap<String, TypeConsistencyEntry>,
    pub column_analysis: BTreeMap<String, ColumnAnalysis>,
    pub numeric_stats: BTreeMap<String, NumericSummary>,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub cleaned_data: CleanedSummary,
    /// Absent when the cleaned dataset has no rows to profile.
    pub quality_report: Option<QualityReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_dataset_cell_handles_short_rows() {
        let raw = RawDataset {
            header: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into()]],
        };
        assert_eq!(raw.cell(0, 0), Some("1"));
        assert_eq!(raw.cell(0, 1), None);
        assert_eq!(raw.cell(5, 0), None);
    }

    #[test]
    fn test_enum_json_values() {
        assert_eq!(serde_json::to_string(&InferredType::Numeric).unwrap(), "\"numeric\"");
        assert_eq!(serde_json::to_string(&TypeCheck::MostlyNumeric).unwrap(), "\"mostly_numeric\"");
        assert_eq!(serde_json::to_string(&StringFormat::Id).unwrap(), "\"id\"");
        let expected: ExpectedType = serde_json::from_str("\"email\"").unwrap();
        assert_eq!(expected.format(), Some(StringFormat::Email));
    }

    #[test]
    fn test_type_consistency_omits_undeclared_fields() {
        let entry = TypeConsistencyEntry {
            numeric: 2,
            non_numeric: 1,
            missing: 0,
            valid: None,
            invalid: None,
            total: None,
        };
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json, serde_json::json!({"numeric": 2, "non_numeric": 1, "missing": 0}));
    }

    #[test]
    fn test_empty_numeric_summary_is_empty_object() {
        let json = serde_json::to_value(NumericSummary::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_format_confidence_keys_serialize_as_names() {
        let mut confidence = BTreeMap::new();
        confidence.insert(StringFormat::Email, 1.0);
        confidence.insert(StringFormat::Date, 0.0);
        let json = serde_json::to_string(&confidence).unwrap();
        assert_eq!(json, r#"{"email":1.0,"date":0.0}"#);
    }
}
