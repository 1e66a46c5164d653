//! Validation and document errors for note/chain/index models.

use crate::codec::FrontmatterError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure.
///
/// `field` names are the frontmatter keys as written in documents
/// (`snippet.hash`, `createdAt`, ...), prefixed with the document type where
/// it helps (`note id`, `chain title`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required string is missing or blank after trimming.
    EmptyField { field: String },
    /// Value exists but is an array or map.
    NotAString { field: String },
    /// Value exists but is not an array of scalars.
    NotAStringArray { field: String },
    /// Value exists but is not a nested map.
    NotAMap { field: String },
    UnsupportedKind(String),
    InvalidTimestamp { field: String, value: String },
    MissingSnippetHash,
    /// Optional snippet field given as a blank or non-scalar value.
    EmptySnippetField { field: &'static str },
    /// No note id survived normalization.
    EmptyChainNotes,
    /// Persisted index violates its shape contract.
    InvalidIndex(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} must be a non-empty string"),
            Self::NotAString { field } => write!(f, "{field} must be a string"),
            Self::NotAStringArray { field } => write!(f, "{field} must be an array of strings"),
            Self::NotAMap { field } => write!(f, "{field} must be a map"),
            Self::UnsupportedKind(kind) => write!(
                f,
                "note kind `{kind}` is not supported; expected observation|analysis|decision|task|reference"
            ),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "{field} must be an ISO-8601 timestamp, got `{value}`")
            }
            Self::MissingSnippetHash => write!(f, "snippet metadata requires a non-empty hash"),
            Self::EmptySnippetField { field } => {
                write!(f, "snippet {field} must be a non-empty string when provided")
            }
            Self::EmptyChainNotes => write!(f, "chain notes must contain at least one note id"),
            Self::InvalidIndex(details) => write!(f, "invalid notebook index: {details}"),
        }
    }
}

impl Error for ValidationError {}

/// Failure while parsing or serializing a note/chain document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    Frontmatter(FrontmatterError),
    Validation(ValidationError),
    /// Snippet metadata exists without a fenced code block to back it.
    MissingSnippetBody,
    /// Stored snippet hash disagrees with the hash of its code.
    SnippetHashMismatch { expected: String, actual: String },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frontmatter(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::MissingSnippetBody => {
                write!(f, "Snippet metadata declared without a fenced code block.")
            }
            Self::SnippetHashMismatch { expected, actual } => write!(
                f,
                "Snippet hash mismatch. Expected {expected} but computed {actual}."
            ),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Frontmatter(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::MissingSnippetBody | Self::SnippetHashMismatch { .. } => None,
        }
    }
}

impl From<FrontmatterError> for DocumentError {
    fn from(value: FrontmatterError) -> Self {
        Self::Frontmatter(value)
    }
}

impl From<ValidationError> for DocumentError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
