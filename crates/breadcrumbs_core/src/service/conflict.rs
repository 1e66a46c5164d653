//! Snippet drift detection.
//!
//! Compares the hash recorded in note metadata with snippet source taken from
//! somewhere else (an editor buffer, the file on disk). Pure: nothing is read
//! or written.

use crate::hash::compute_snippet_hash;
use crate::model::Note;

/// Outcome of comparing an expected snippet hash with candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetConflict {
    /// Nothing to reconcile. Hashes are carried when known.
    Clean {
        expected_hash: Option<String>,
        actual_hash: Option<String>,
    },
    /// A hash was expected but the candidate source is absent or blank.
    MissingSnippet { expected_hash: String },
    HashMismatch {
        expected_hash: String,
        actual_hash: String,
    },
}

impl SnippetConflict {
    /// Stable status token: `clean`, `missing-snippet` or `hash-mismatch`.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Clean { .. } => "clean",
            Self::MissingSnippet { .. } => "missing-snippet",
            Self::HashMismatch { .. } => "hash-mismatch",
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean { .. })
    }

    /// Human-readable diagnostic; `None` for clean outcomes.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Clean { .. } => None,
            Self::MissingSnippet { .. } => {
                Some("Snippet content is missing while an expected hash was provided.")
            }
            Self::HashMismatch { .. } => Some("Snippet hash mismatch detected."),
        }
    }

    pub fn expected_hash(&self) -> Option<&str> {
        match self {
            Self::Clean { expected_hash, .. } => expected_hash.as_deref(),
            Self::MissingSnippet { expected_hash } | Self::HashMismatch { expected_hash, .. } => {
                Some(expected_hash)
            }
        }
    }

    pub fn actual_hash(&self) -> Option<&str> {
        match self {
            Self::Clean { actual_hash, .. } => actual_hash.as_deref(),
            Self::MissingSnippet { .. } => None,
            Self::HashMismatch { actual_hash, .. } => Some(actual_hash),
        }
    }
}

/// Compares `expected` against the hash of `candidate`.
///
/// Blank candidate source counts as missing. Without an expected hash the
/// result is always clean.
pub fn detect_snippet_conflict(expected: Option<&str>, candidate: Option<&str>) -> SnippetConflict {
    let candidate = candidate.filter(|source| !source.trim().is_empty());
    let Some(source) = candidate else {
        return match expected {
            Some(expected_hash) => SnippetConflict::MissingSnippet {
                expected_hash: expected_hash.to_string(),
            },
            None => SnippetConflict::Clean {
                expected_hash: None,
                actual_hash: None,
            },
        };
    };

    let actual_hash = compute_snippet_hash(source);
    match expected {
        Some(expected_hash) if expected_hash != actual_hash => SnippetConflict::HashMismatch {
            expected_hash: expected_hash.to_string(),
            actual_hash,
        },
        _ => SnippetConflict::Clean {
            expected_hash: expected.map(str::to_string),
            actual_hash: Some(actual_hash),
        },
    }
}

/// Runs [`detect_snippet_conflict`] against the hash declared in `note`.
pub fn detect_note_conflict(note: &Note, candidate: Option<&str>) -> SnippetConflict {
    let expected = note
        .metadata
        .snippet
        .as_ref()
        .map(|meta| meta.hash.as_str());
    detect_snippet_conflict(expected, candidate)
}
