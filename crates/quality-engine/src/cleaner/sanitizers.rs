//! Cell and header sanitization used by the cleaner.

use crate::utils::is_missing_token;
use std::collections::HashSet;

/// Trim a cell and map missing-value tokens to the missing sentinel.
pub(crate) fn normalize_cell(value: Option<&str>, missing_tokens: &[String]) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || is_missing_token(trimmed, missing_tokens) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Make header names unique and non-blank for use as report keys.
///
/// Blank names become `column_<n>` (1-based position). A repeated name gets
/// `.1`, `.2`, ... appended to each later occurrence; the first occurrence
/// keeps its name.
pub(crate) fn disambiguate_names(header: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(header.len());
    let mut names = Vec::with_capacity(header.len());

    for (index, raw) in header.iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", index + 1)
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<String> {
        crate::config::DEFAULT_MISSING_TOKENS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_normalize_cell() {
        let tokens = tokens();
        assert_eq!(normalize_cell(Some("  42 "), &tokens), Some("42".to_string()));
        assert_eq!(normalize_cell(Some("   "), &tokens), None);
        assert_eq!(normalize_cell(Some("n/a"), &tokens), None);
        assert_eq!(normalize_cell(Some(" NULL "), &tokens), None);
        assert_eq!(normalize_cell(None, &tokens), None);
        // Case is preserved for kept values
        assert_eq!(normalize_cell(Some("Nan"), &tokens), Some("Nan".to_string()));
    }

    #[test]
    fn test_disambiguate_names() {
        let header: Vec<String> = ["id", "", "id", "id", " "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            disambiguate_names(&header),
            vec!["id", "column_2", "id.1", "id.2", "column_5"]
        );
    }

    #[test]
    fn test_disambiguate_avoids_existing_suffix() {
        let header: Vec<String> = ["a", "a.1", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(disambiguate_names(&header), vec!["a", "a.1", "a.2"]);
    }
}
