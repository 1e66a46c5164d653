//! Chain document model: an ordered list of note ids with narrative text.

use super::error::{DocumentError, ValidationError};
use super::fields::{optional_string, optional_timestamp, required_string, string_list};
use crate::codec::{parse_document, serialize_document, FrontmatterMap};
use crate::util::unique_strings;

/// Header fields of a chain document.
///
/// `notes` may reference ids that do not exist as notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMetadata {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Ordered, de-duplicated by first occurrence, never empty once validated.
    pub notes: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ChainMetadata {
    pub fn new<I, S>(id: impl Into<String>, title: impl Into<String>, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            notes: notes.into_iter().map(Into::into).collect(),
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Builds validated metadata from an untyped header map.
    ///
    /// # Errors
    /// - `EmptyChainNotes` when `notes` is missing or has no non-blank id.
    pub fn from_frontmatter(map: &FrontmatterMap) -> Result<Self, ValidationError> {
        let id = required_string(map, "id", "chain id")?;
        let title = required_string(map, "title", "chain title")?;
        let notes = string_list(map, "notes", "chain notes")?;
        if notes.is_empty() {
            return Err(ValidationError::EmptyChainNotes);
        }
        let created_at = optional_timestamp(map, "createdAt")?;
        let updated_at = optional_timestamp(map, "updatedAt")?;
        let description = optional_string(map, "description", "chain description")?;
        let tags = string_list(map, "tags", "tags")?;

        Ok(Self {
            id,
            title,
            description,
            notes,
            tags,
            created_at,
            updated_at,
        })
    }

    pub fn to_frontmatter(&self) -> FrontmatterMap {
        let mut map = FrontmatterMap::new();
        map.insert_scalar("id", self.id.as_str());
        map.insert_scalar("title", self.title.as_str());
        map.insert_optional("description", self.description.as_deref());
        map.insert_array("notes", self.notes.clone());
        map.insert_array("tags", self.tags.clone());
        map.insert_optional("createdAt", self.created_at.as_deref());
        map.insert_optional("updatedAt", self.updated_at.as_deref());
        map
    }
}

/// Hydrated chain document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub metadata: ChainMetadata,
    pub content: String,
}

impl Chain {
    pub fn new(metadata: ChainMetadata, content: impl Into<String>) -> Self {
        Self {
            metadata,
            content: content.into(),
        }
    }
}

pub fn parse_chain_markdown(raw: &str) -> Result<Chain, DocumentError> {
    let document = parse_document(raw)?;
    let metadata = ChainMetadata::from_frontmatter(&document.data)?;
    Ok(Chain {
        metadata,
        content: document.body.trim().to_string(),
    })
}

/// Serializes a chain document after re-validating its header.
pub fn serialize_chain_markdown(chain: &Chain) -> Result<String, DocumentError> {
    let candidate = ChainMetadata {
        notes: unique_strings(&chain.metadata.notes),
        tags: unique_strings(&chain.metadata.tags),
        ..chain.metadata.clone()
    };
    let validated = ChainMetadata::from_frontmatter(&candidate.to_frontmatter())?;
    Ok(serialize_document(
        &validated.to_frontmatter(),
        chain.content.trim(),
    ))
}
