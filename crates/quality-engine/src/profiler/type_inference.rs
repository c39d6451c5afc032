//! Type inference logic for column analysis.

use crate::config::AnalysisConfig;
use crate::types::{ExpectedType, InferredType, StringFormat, StringLengthStats, TypeCheck};
use crate::utils::{CellClass, classify_cell, ratio};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("Invalid regex: email")
});

// Date pattern regexes - compiled once at startup
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("Invalid regex: ISO"),
    ]
});

static ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("Invalid regex: UUID"),
        Regex::new(r"^[A-Za-z]{1,10}[-_]?\d{2,}$").expect("Invalid regex: prefixed id"),
    ]
});

/// Check a cleaned, non-missing value against a string format.
pub(crate) fn matches_format(value: &str, format: StringFormat) -> bool {
    match format {
        StringFormat::Email => EMAIL_PATTERN.is_match(value),
        StringFormat::Date => DATE_PATTERNS.iter().any(|re| re.is_match(value)),
        StringFormat::Id => ID_PATTERNS.iter().any(|re| re.is_match(value)),
    }
}

/// Result of classifying every cell of one column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypeProfile {
    pub inferred_type: InferredType,
    pub type_check: TypeCheck,
    pub cardinality: usize,
    pub missing: usize,
    pub numeric: usize,
    pub non_numeric: usize,
    pub format_matches: BTreeMap<StringFormat, usize>,
    pub string_format: Option<StringFormat>,
    pub string_length: Option<StringLengthStats>,
}

impl TypeProfile {
    pub fn non_missing(&self) -> usize {
        self.numeric + self.non_numeric
    }

    pub fn total(&self) -> usize {
        self.non_missing() + self.missing
    }

    /// Share of non-missing values matching each format.
    pub fn format_confidence(&self) -> BTreeMap<StringFormat, f64> {
        self.format_matches
            .iter()
            .map(|(format, count)| (*format, ratio(*count, self.non_missing())))
            .collect()
    }

    /// Count the non-missing cells consistent with `expected`, or with the
    /// inferred type when nothing is declared.
    pub fn valid_count(&self, expected: Option<ExpectedType>) -> usize {
        let matched = |format: StringFormat| self.format_matches.get(&format).copied().unwrap_or(0);

        match expected {
            Some(ExpectedType::Numeric) => self.numeric,
            Some(ExpectedType::Categorical) | Some(ExpectedType::String) => self.non_missing(),
            Some(declared) => declared.format().map(matched).unwrap_or(0),
            None => match (self.inferred_type, self.string_format) {
                (InferredType::Numeric, _) => self.numeric,
                (_, Some(format)) => matched(format),
                _ => self.numeric.max(self.non_numeric),
            },
        }
    }
}

/// Classify the cells of a cleaned column and infer its type.
///
/// Rules, in order:
/// 1. No non-missing values: numeric with an `empty` check
/// 2. Numeric share at or above `numeric_threshold`: numeric
/// 3. Best string format at or above `format_confidence_threshold`: string
/// 4. Long, mostly unique values: string (free text)
/// 5. Otherwise categorical
pub(crate) fn infer_column_type(cells: &[Option<&str>], config: &AnalysisConfig) -> TypeProfile {
    let mut missing = 0;
    let mut numeric = 0;
    let mut distinct: HashSet<&str> = HashSet::new();
    let mut lengths: Vec<usize> = Vec::new();
    let mut format_matches: BTreeMap<StringFormat, usize> =
        StringFormat::ALL.iter().map(|f| (*f, 0)).collect();

    for cell in cells {
        match classify_cell(*cell) {
            CellClass::Missing => missing += 1,
            CellClass::Numeric => numeric += 1,
            CellClass::Other => {}
        }
        if let Some(value) = *cell {
            distinct.insert(value);
            lengths.push(value.chars().count());
            for format in StringFormat::ALL {
                if matches_format(value, format) {
                    *format_matches.entry(format).or_insert(0) += 1;
                }
            }
        }
    }

    let non_missing = cells.len() - missing;
    let non_numeric = non_missing - numeric;
    let cardinality = distinct.len();

    let mut profile = TypeProfile {
        inferred_type: InferredType::Numeric,
        type_check: TypeCheck::Empty,
        cardinality,
        missing,
        numeric,
        non_numeric,
        format_matches,
        string_format: None,
        string_length: None,
    };

    if non_missing == 0 {
        return profile;
    }

    if ratio(numeric, non_missing) >= config.numeric_threshold {
        profile.type_check = if non_numeric == 0 {
            TypeCheck::Numeric
        } else {
            TypeCheck::MostlyNumeric
        };
        return profile;
    }

    profile.string_length = Some(length_stats(&lengths));
    profile.string_format = best_format(&profile, config.format_confidence_threshold);

    let avg_length = lengths.iter().sum::<usize>() as f64 / non_missing as f64;
    let is_free_text = ratio(cardinality, non_missing) > config.text_unique_ratio
        && avg_length > config.text_min_avg_length;

    (profile.inferred_type, profile.type_check) = match profile.string_format {
        Some(format) => (InferredType::String, TypeCheck::from(format)),
        None if is_free_text => (InferredType::String, TypeCheck::Text),
        None if numeric > 0 => (InferredType::Categorical, TypeCheck::Mixed),
        None => (InferredType::Categorical, TypeCheck::Categorical),
    };

    profile
}

/// Highest-confidence format at or above the threshold; ties resolve in
/// declaration order (email, date, id).
fn best_format(profile: &TypeProfile, threshold: f64) -> Option<StringFormat> {
    let mut best: Option<(StringFormat, f64)> = None;
    for (format, confidence) in profile.format_confidence() {
        if confidence < threshold || confidence == 0.0 {
            continue;
        }
        if best.is_none_or(|(_, c)| confidence > c) {
            best = Some((format, confidence));
        }
    }
    best.map(|(format, _)| format)
}

fn length_stats(lengths: &[usize]) -> StringLengthStats {
    StringLengthStats {
        min: lengths.iter().copied().min().unwrap_or(0),
        max: lengths.iter().copied().max().unwrap_or(0),
        mean: lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64,
    }
}
