//! Restricted frontmatter codec for note and chain documents.
//!
//! # Responsibility
//! - Split a document into a `---`-delimited metadata header and a body.
//! - Parse the header into a tagged value tree (scalar/array/map).
//! - Regenerate a header + normalized body from a value tree.
//!
//! # Invariants
//! - Nesting is exactly two spaces per level; anything else is rejected.
//! - List items always belong to a key.
//! - Serialization only emits what the caller puts in the map; unknown fields
//!   from a parsed document never round-trip on their own.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod parser;
mod value;
mod writer;

pub use parser::{parse_document, FrontmatterDocument};
pub use value::{FrontmatterMap, FrontmatterValue};
pub use writer::{normalize_body, serialize_document};

/// Line marker opening and closing the metadata header.
pub const HEADER_MARKER: &str = "---";

/// Structural defect found while splitting or parsing a header.
///
/// Line numbers are 1-based positions in the document after leading
/// whitespace has been skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Document does not start with a complete `---` ... `---` block.
    MissingHeader,
    /// Indentation increased by something other than exactly two spaces.
    InvalidIndentation { line: usize },
    /// `- value` line without an owning `key:` line.
    ListItemWithoutKey { line: usize },
    /// Line is neither `key: value`, `key:` nor a list item.
    UnparseableLine { line: usize, text: String },
}

impl Display for FrontmatterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "document is missing a frontmatter header"),
            Self::InvalidIndentation { line } => {
                write!(f, "invalid indentation in frontmatter at line {line}")
            }
            Self::ListItemWithoutKey { line } => {
                write!(f, "list item at line {line} must be associated with a key")
            }
            Self::UnparseableLine { line, text } => {
                write!(f, "unable to parse frontmatter line {line}: `{text}`")
            }
        }
    }
}

impl Error for FrontmatterError {}
