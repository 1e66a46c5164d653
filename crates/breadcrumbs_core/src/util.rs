//! Small string helpers shared by models and storage.
//!
//! # Responsibility
//! - Derive filesystem-friendly slugs from document ids.
//! - Normalize string lists (trim, drop empties, de-duplicate).
//!
//! # Invariants
//! - `unique_strings` keeps the first occurrence order.
//! - `slugify_id` output contains only `[a-z0-9-]` and never starts or ends with `-`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_SLUG_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Converts an identifier into a lowercase, filesystem-friendly slug.
///
/// Non-alphanumeric runs collapse into one `-`; leading/trailing hyphens are
/// stripped. May return an empty string for ids without any `[a-z0-9]`.
pub fn slugify_id(identifier: &str) -> String {
    let lowered = identifier.trim().to_lowercase();
    let replaced = NON_SLUG_RUN_RE.replace_all(&lowered, "-");
    replaced.trim_matches('-').to_string()
}

/// Trims every value, drops empty ones and removes duplicates.
pub fn unique_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for value in values {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::{slugify_id, unique_strings};

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify_id("Note A"), "note-a");
        assert_eq!(slugify_id("  --Chain::Alpha__Beta!! "), "chain-alpha-beta");
        assert_eq!(slugify_id("already-slugged-42"), "already-slugged-42");
    }

    #[test]
    fn slugify_can_yield_empty_slug() {
        assert_eq!(slugify_id("???"), "");
    }

    #[test]
    fn unique_strings_keeps_first_occurrence_order() {
        let values = unique_strings([" beta", "alpha", "", "beta ", "  ", "gamma", "alpha"]);
        assert_eq!(values, vec!["beta", "alpha", "gamma"]);
    }
}
