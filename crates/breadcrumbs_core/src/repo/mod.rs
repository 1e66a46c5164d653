//! Filesystem persistence for note and chain documents.
//!
//! # Responsibility
//! - Provide save/read/delete/list APIs over the notebook directory layout.
//! - Keep atomic-write and not-found handling inside the persistence boundary.
//!
//! # Invariants
//! - Saves are full replacements written via temp file + rename.
//! - A missing document is `Ok(None)`; other I/O errors propagate.
//! - Parse errors of listed files propagate instead of being skipped.

use crate::model::DocumentError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub(crate) mod fs;
pub mod notebook_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for document persistence and listing.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    /// Id has no slug characters and cannot be mapped to a file name.
    InvalidId(String),
    /// Document at `path` failed to parse or serialize.
    Document {
        path: PathBuf,
        source: DocumentError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, source: DocumentError) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidId(id) => write!(f, "id `{id}` cannot be mapped to a file name"),
            Self::Document { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidId(_) => None,
            Self::Document { source, .. } => Some(source),
        }
    }
}
