//! Use-case services built on top of the store.
//!
//! # Responsibility
//! - Maintain the derived notebook index (build, cache, persist, self-heal).
//! - Reconcile externally edited snippet source with stored metadata.
//!
//! # See also
//! - `repo::notebook_store` for the listings both services consume.

pub mod conflict;
pub mod index_manager;

pub use conflict::{detect_note_conflict, detect_snippet_conflict, SnippetConflict};
pub use index_manager::{
    build_index, compute_backlinks, compute_checksum, IndexError, IndexResult, IndexStatus,
    NotebookIndexManager,
};
