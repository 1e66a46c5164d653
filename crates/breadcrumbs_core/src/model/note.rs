//! Note document model.
//!
//! # Responsibility
//! - Define note metadata, snippet and document records.
//! - Parse/serialize note documents (frontmatter + markdown + fenced snippet).
//!
//! # Invariants
//! - A present snippet satisfies `hash == sha256(code)` whenever it is written.
//! - Declared snippet metadata always has a fenced code block in the body.
//! - `tags`/`links` are trimmed, non-empty and de-duplicated.

use super::error::{DocumentError, ValidationError};
use super::fields::{optional_timestamp, required_string, string_list};
use crate::codec::{parse_document, serialize_document, FrontmatterMap, FrontmatterValue};
use crate::hash::compute_snippet_hash;
use crate::util::unique_strings;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(\w+)?\r?\n((?s:.*?))```").expect("valid code fence regex"));

/// Category of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Observation,
    Analysis,
    Decision,
    Task,
    Reference,
}

impl NoteKind {
    pub const ALL: [NoteKind; 5] = [
        NoteKind::Observation,
        NoteKind::Analysis,
        NoteKind::Decision,
        NoteKind::Task,
        NoteKind::Reference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Analysis => "analysis",
            Self::Decision => "decision",
            Self::Task => "task",
            Self::Reference => "reference",
        }
    }

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl Display for NoteKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snippet metadata as stored in the note header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetMeta {
    pub hash: String,
    pub language: Option<String>,
    pub commit: Option<String>,
    pub path: Option<String>,
}

impl SnippetMeta {
    fn from_frontmatter(value: &FrontmatterValue) -> Result<Self, ValidationError> {
        let FrontmatterValue::Map(map) = value else {
            return Err(ValidationError::NotAMap {
                field: "snippet".to_string(),
            });
        };
        let hash = match map.get("hash") {
            Some(FrontmatterValue::Scalar(hash)) if !hash.trim().is_empty() => {
                hash.trim().to_string()
            }
            Some(FrontmatterValue::Scalar(_)) | None => {
                return Err(ValidationError::MissingSnippetHash)
            }
            Some(_) => {
                return Err(ValidationError::NotAString {
                    field: "snippet.hash".to_string(),
                })
            }
        };
        Ok(Self {
            hash,
            language: optional_snippet_field(map, "language")?,
            commit: optional_snippet_field(map, "commit")?,
            path: optional_snippet_field(map, "path")?,
        })
    }

    fn to_frontmatter(&self) -> FrontmatterValue {
        let mut map = FrontmatterMap::new();
        map.insert_scalar("hash", self.hash.as_str());
        map.insert_optional("language", self.language.as_deref());
        map.insert_optional("commit", self.commit.as_deref());
        map.insert_optional("path", self.path.as_deref());
        FrontmatterValue::Map(map)
    }
}

fn optional_snippet_field(
    map: &FrontmatterMap,
    key: &'static str,
) -> Result<Option<String>, ValidationError> {
    match map.get(key) {
        None => Ok(None),
        Some(FrontmatterValue::Scalar(value)) if !value.trim().is_empty() => {
            Ok(Some(value.trim().to_string()))
        }
        Some(_) => Err(ValidationError::EmptySnippetField { field: key }),
    }
}

/// Snippet metadata plus the concrete source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub code: String,
    pub hash: String,
    pub language: Option<String>,
    pub commit: Option<String>,
    pub path: Option<String>,
}

impl Snippet {
    /// Creates a snippet from `code` with trailing whitespace trimmed, hashing
    /// the trimmed code.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into().trim_end().to_string();
        let hash = compute_snippet_hash(&code);
        Self {
            code,
            hash,
            language: None,
            commit: None,
            path: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn meta(&self) -> SnippetMeta {
        SnippetMeta {
            hash: self.hash.clone(),
            language: self.language.clone(),
            commit: self.commit.clone(),
            path: self.path.clone(),
        }
    }

    /// Checks the stored hash against the code as it is written to a fence,
    /// i.e. with trailing whitespace trimmed.
    pub fn verify(&self) -> Result<(), DocumentError> {
        let actual = compute_snippet_hash(self.code.trim_end());
        if actual != self.hash {
            return Err(DocumentError::SnippetHashMismatch {
                expected: self.hash.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Header fields of a note document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMetadata {
    pub id: String,
    pub title: String,
    pub kind: NoteKind,
    pub tags: Vec<String>,
    pub links: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub snippet: Option<SnippetMeta>,
}

impl NoteMetadata {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: NoteKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            tags: Vec::new(),
            links: Vec::new(),
            created_at: None,
            updated_at: None,
            snippet: None,
        }
    }

    /// Builds validated metadata from an untyped header map.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    /// - Returns the first offending field in declaration order
    ///   (`id`, `title`, `kind`, `createdAt`, `updatedAt`, `tags`, `links`, `snippet`).
    pub fn from_frontmatter(map: &FrontmatterMap) -> Result<Self, ValidationError> {
        let id = required_string(map, "id", "note id")?;
        let title = required_string(map, "title", "note title")?;
        let kind = match map.get("kind") {
            Some(FrontmatterValue::Scalar(value)) => NoteKind::parse(value.trim())
                .ok_or_else(|| ValidationError::UnsupportedKind(value.clone()))?,
            Some(_) => {
                return Err(ValidationError::NotAString {
                    field: "note kind".to_string(),
                })
            }
            None => return Err(ValidationError::UnsupportedKind(String::new())),
        };
        let created_at = optional_timestamp(map, "createdAt")?;
        let updated_at = optional_timestamp(map, "updatedAt")?;
        let tags = string_list(map, "tags", "tags")?;
        let links = string_list(map, "links", "links")?;
        let snippet = map
            .get("snippet")
            .map(SnippetMeta::from_frontmatter)
            .transpose()?;

        Ok(Self {
            id,
            title,
            kind,
            tags,
            links,
            created_at,
            updated_at,
            snippet,
        })
    }

    /// Header map in canonical key order.
    pub fn to_frontmatter(&self) -> FrontmatterMap {
        let mut map = FrontmatterMap::new();
        map.insert_scalar("id", self.id.as_str());
        map.insert_scalar("title", self.title.as_str());
        map.insert_scalar("kind", self.kind.as_str());
        map.insert_array("tags", self.tags.clone());
        map.insert_array("links", self.links.clone());
        map.insert_optional("createdAt", self.created_at.as_deref());
        map.insert_optional("updatedAt", self.updated_at.as_deref());
        if let Some(snippet) = &self.snippet {
            map.insert("snippet", snippet.to_frontmatter());
        }
        map
    }
}

/// Fully hydrated note document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub metadata: NoteMetadata,
    /// Markdown body without the snippet fence.
    pub content: String,
    pub snippet: Option<Snippet>,
}

impl Note {
    pub fn new(metadata: NoteMetadata, content: impl Into<String>) -> Self {
        Self {
            metadata,
            content: content.into(),
            snippet: None,
        }
    }

    /// Attaches a snippet and mirrors its metadata into the header fields.
    pub fn with_snippet(mut self, snippet: Snippet) -> Self {
        self.metadata.snippet = Some(snippet.meta());
        self.snippet = Some(snippet);
        self
    }
}

/// Parses a note document.
///
/// The first fenced code block becomes the snippet. Its language tag fills in
/// `snippet.language` when the header did not declare one, and its trailing
/// whitespace is trimmed. A declared hash is trusted as-is; without one the
/// hash is computed from the code.
///
/// # Errors
/// - Header/validation errors from the codec and field readers.
/// - `MissingSnippetBody` when snippet metadata exists but no fence does.
pub fn parse_note_markdown(raw: &str) -> Result<Note, DocumentError> {
    let document = parse_document(raw)?;
    let mut metadata = NoteMetadata::from_frontmatter(&document.data)?;
    let (content, snippet) = extract_snippet(&document.body, metadata.snippet.take())?;
    metadata.snippet = snippet.as_ref().map(Snippet::meta);
    Ok(Note {
        metadata,
        content,
        snippet,
    })
}

/// Serializes a note document.
///
/// Header snippet metadata is regenerated from `note.snippet`.
///
/// # Errors
/// - `SnippetHashMismatch` when the snippet hash does not match its code.
/// - `MissingSnippetBody` when header snippet metadata is set without a snippet.
/// - Validation errors for the header fields.
pub fn serialize_note_markdown(note: &Note) -> Result<String, DocumentError> {
    let snippet_meta = match &note.snippet {
        Some(snippet) => {
            snippet.verify()?;
            Some(snippet.meta())
        }
        None if note.metadata.snippet.is_some() => return Err(DocumentError::MissingSnippetBody),
        None => None,
    };

    let candidate = NoteMetadata {
        tags: unique_strings(&note.metadata.tags),
        links: unique_strings(&note.metadata.links),
        snippet: snippet_meta,
        ..note.metadata.clone()
    };
    let validated = NoteMetadata::from_frontmatter(&candidate.to_frontmatter())?;

    let mut sections = Vec::new();
    let content = note.content.trim();
    if !content.is_empty() {
        sections.push(content.to_string());
    }
    if let Some(snippet) = &note.snippet {
        // Fence tags are `\w+` only; other languages stay in the header.
        let language = snippet
            .language
            .as_deref()
            .filter(|tag| tag.chars().all(|ch| ch.is_alphanumeric() || ch == '_'))
            .unwrap_or("");
        sections.push(format!("```{language}\n{}\n```", snippet.code.trim_end()));
    }

    Ok(serialize_document(
        &validated.to_frontmatter(),
        &sections.join("\n\n"),
    ))
}

fn extract_snippet(
    body: &str,
    declared: Option<SnippetMeta>,
) -> Result<(String, Option<Snippet>), DocumentError> {
    let fence = CODE_FENCE_RE
        .captures(body)
        .and_then(|caps| Some((caps.get(0)?, caps.get(1), caps.get(2)?)));
    let Some((whole, language, code)) = fence else {
        if declared.is_some() {
            return Err(DocumentError::MissingSnippetBody);
        }
        return Ok((body.trim().to_string(), None));
    };

    let code = code.as_str().trim_end().to_string();
    let fenced_language = language.map(|m| m.as_str().to_string());
    let snippet = match declared {
        Some(meta) => Snippet {
            code,
            hash: meta.hash,
            language: meta.language.or(fenced_language),
            commit: meta.commit,
            path: meta.path,
        },
        None => {
            let mut snippet = Snippet::new(code);
            snippet.language = fenced_language;
            snippet
        }
    };

    let remainder = format!("{}{}", &body[..whole.start()], &body[whole.end()..]);
    Ok((remainder.trim().to_string(), Some(snippet)))
}
