//! Derived notebook index records.
//!
//! # Invariants
//! - `version` is always [`INDEX_VERSION`].
//! - Map keys equal the `id` of their entry; maps are ordered by id.
//! - The index is never edited in place; it is rebuilt wholesale.

use super::error::ValidationError;
use super::fields::validate_timestamp;
use super::note::NoteKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Only supported persisted index format.
pub const INDEX_VERSION: u32 = 1;

/// Projection of one note into the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteIndexEntry {
    pub id: String,
    pub title: String,
    pub kind: NoteKind,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Storage path relative to the workspace root.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_commit: Option<String>,
}

/// Projection of one chain into the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainIndexEntry {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub notes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub path: String,
}

/// Persisted, derived summary over all notes and chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookIndex {
    pub version: u32,
    pub generated_at: String,
    pub notes: BTreeMap<String, NoteIndexEntry>,
    pub chains: BTreeMap<String, ChainIndexEntry>,
    /// Note id -> sorted chain ids referencing it (dangling ids included).
    pub backlinks: BTreeMap<String, Vec<String>>,
    pub checksum: String,
}

impl NotebookIndex {
    /// Decodes and validates a persisted index file.
    pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
        let index: Self = serde_json::from_str(raw)
            .map_err(|err| ValidationError::InvalidIndex(err.to_string()))?;
        index.validate()?;
        Ok(index)
    }

    /// Pretty-printed JSON with a trailing newline, as written to disk.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut encoded = serde_json::to_string_pretty(self)?;
        encoded.push('\n');
        Ok(encoded)
    }

    /// Checks the persisted shape contract.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version != INDEX_VERSION {
            return Err(invalid(format!(
                "version must be {INDEX_VERSION}, got {}",
                self.version
            )));
        }
        validate_timestamp(&self.generated_at, "generatedAt")?;

        for (key, entry) in &self.notes {
            require_entry_fields(key, &entry.id, &entry.title, &entry.path, "note")?;
            if entry.snippet_hash.as_deref().is_some_and(|hash| hash.trim().is_empty()) {
                return Err(invalid(format!("note `{key}` has an empty snippetHash")));
            }
        }
        for (key, entry) in &self.chains {
            require_entry_fields(key, &entry.id, &entry.title, &entry.path, "chain")?;
            if entry.notes.iter().all(|id| id.trim().is_empty()) {
                return Err(invalid(format!("chain `{key}` references no notes")));
            }
        }
        for (key, chain_ids) in &self.backlinks {
            if chain_ids.iter().any(|id| id.trim().is_empty()) {
                return Err(invalid(format!("backlinks.{key} contains an empty chain id")));
            }
        }
        if self.checksum.trim().is_empty() {
            return Err(invalid("checksum must be a non-empty string".to_string()));
        }
        Ok(())
    }
}

fn require_entry_fields(
    key: &str,
    id: &str,
    title: &str,
    path: &str,
    label: &str,
) -> Result<(), ValidationError> {
    if id.trim().is_empty() || id != key {
        return Err(invalid(format!("{label} entry `{key}` has a mismatched id `{id}`")));
    }
    if title.trim().is_empty() {
        return Err(invalid(format!("{label} entry `{key}` has an empty title")));
    }
    if path.trim().is_empty() {
        return Err(invalid(format!("{label} entry `{key}` has an empty path")));
    }
    Ok(())
}

fn invalid(details: String) -> ValidationError {
    ValidationError::InvalidIndex(details)
}

#[cfg(test)]
mod tests {
    use super::{NoteIndexEntry, NotebookIndex, INDEX_VERSION};
    use crate::model::{NoteKind, ValidationError};
    use std::collections::BTreeMap;

    fn sample_index() -> NotebookIndex {
        let mut notes = BTreeMap::new();
        notes.insert(
            "note-a".to_string(),
            NoteIndexEntry {
                id: "note-a".to_string(),
                title: "Establish Context".to_string(),
                kind: NoteKind::Observation,
                tags: vec!["context".to_string()],
                path: ".breadcrumbs/notes/note-a.md".to_string(),
                snippet_hash: Some("abc".to_string()),
                snippet_commit: None,
            },
        );
        let mut backlinks = BTreeMap::new();
        backlinks.insert("note-a".to_string(), Vec::new());
        NotebookIndex {
            version: INDEX_VERSION,
            generated_at: "2024-01-01T00:00:00.000Z".to_string(),
            notes,
            chains: BTreeMap::new(),
            backlinks,
            checksum: "deadbeef".to_string(),
        }
    }

    #[test]
    fn json_uses_camel_case_and_omits_absent_options() {
        let json = sample_index().to_json_pretty().unwrap();
        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"generatedAt\""));
        assert!(json.contains("\"snippetHash\": \"abc\""));
        assert!(!json.contains("snippetCommit"));
        assert!(json.ends_with("}\n"));

        let decoded = NotebookIndex::from_json(&json).unwrap();
        assert_eq!(decoded, sample_index());
    }

    #[test]
    fn validate_rejects_other_versions() {
        let mut index = sample_index();
        index.version = 2;
        assert!(matches!(
            index.validate(),
            Err(ValidationError::InvalidIndex(_))
        ));
    }

    #[test]
    fn validate_rejects_key_id_mismatch_and_blank_checksum() {
        let mut index = sample_index();
        let entry = index.notes.remove("note-a").unwrap();
        index.notes.insert("other".to_string(), entry);
        assert!(index.validate().is_err());

        let mut index = sample_index();
        index.checksum = "  ".to_string();
        assert!(index.validate().is_err());
    }

    #[test]
    fn from_json_rejects_unknown_kind() {
        let raw = r#"{"version":1,"generatedAt":"2024-01-01T00:00:00Z","notes":{"a":{"id":"a","title":"t","kind":"rumor","path":"p"}},"chains":{},"backlinks":{},"checksum":"x"}"#;
        assert!(NotebookIndex::from_json(raw).is_err());
    }
}
