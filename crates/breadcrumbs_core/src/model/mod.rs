//! Document models for notes, chains and the derived index.
//!
//! # Responsibility
//! - Define canonical records for note/chain documents and index entries.
//! - Validate untyped frontmatter into immutable, normalized records.
//!
//! # Invariants
//! - Every document is identified by a non-empty, trimmed `id`.
//! - Validation never coerces a value of the wrong shape.
//!
//! # See also
//! - crate::codec for the header grammar.

pub mod chain;
mod error;
mod fields;
pub mod index;
pub mod note;

pub use chain::{parse_chain_markdown, serialize_chain_markdown, Chain, ChainMetadata};
pub use error::{DocumentError, ValidationError};
pub use fields::validate_timestamp;
pub use index::{ChainIndexEntry, NoteIndexEntry, NotebookIndex, INDEX_VERSION};
pub use note::{
    parse_note_markdown, serialize_note_markdown, Note, NoteKind, NoteMetadata, Snippet,
    SnippetMeta,
};
