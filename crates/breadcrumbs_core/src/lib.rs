//! Core data layer for breadcrumbs notebooks.
//! Notes, chains and the derived index live here; editors and CLIs are thin
//! callers on top.

pub mod codec;
pub mod config;
pub mod hash;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod util;

pub use codec::{FrontmatterError, FrontmatterMap, FrontmatterValue};
pub use config::NotebookLayout;
pub use hash::compute_snippet_hash;
pub use logging::{
    default_log_level, init_logging, logging_status, LoggingConfig, LoggingError,
};
pub use model::{
    parse_chain_markdown, parse_note_markdown, serialize_chain_markdown, serialize_note_markdown,
    Chain, ChainIndexEntry, ChainMetadata, DocumentError, Note, NoteIndexEntry, NoteKind,
    NoteMetadata, NotebookIndex, Snippet, SnippetMeta, ValidationError,
};
pub use repo::notebook_store::{ChainSummary, NoteSummary, NotebookStore};
pub use repo::{StoreError, StoreResult};
pub use service::{
    detect_note_conflict, detect_snippet_conflict, IndexError, IndexResult, IndexStatus,
    NotebookIndexManager, SnippetConflict,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
