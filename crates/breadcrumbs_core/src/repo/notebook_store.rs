//! Note/chain store over the `.breadcrumbs` directory.
//!
//! # Responsibility
//! - Map ids to slugged file paths and persist documents atomically.
//! - Produce lightweight summaries for index building.
//!
//! # Invariants
//! - Notes and chains live in separate directories and never mix.
//! - Files removed between listing and reading are skipped silently.

use super::fs::{delete_if_exists, ensure_dir, list_visible_files, read_if_exists, write_atomic};
use super::{StoreError, StoreResult};
use crate::config::{NotebookLayout, CHAIN_EXTENSION, NOTE_EXTENSION};
use crate::model::{
    parse_chain_markdown, parse_note_markdown, serialize_chain_markdown, serialize_note_markdown,
    Chain, Note, NoteKind,
};
use log::{debug, error};
use std::path::{Path, PathBuf};

/// Listing projection of one note file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub kind: NoteKind,
    pub tags: Vec<String>,
    /// Absolute path of the note file.
    pub path: PathBuf,
    pub snippet_hash: Option<String>,
    pub snippet_commit: Option<String>,
}

impl NoteSummary {
    fn from_note(note: Note, path: PathBuf) -> Self {
        let (snippet_hash, snippet_commit) = match note.metadata.snippet {
            Some(meta) => (Some(meta.hash), meta.commit),
            None => (None, None),
        };
        Self {
            id: note.metadata.id,
            title: note.metadata.title,
            kind: note.metadata.kind,
            tags: note.metadata.tags,
            path,
            snippet_hash,
            snippet_commit,
        }
    }
}

/// Listing projection of one chain file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub notes: Vec<String>,
    pub tags: Vec<String>,
    /// Absolute path of the chain file.
    pub path: PathBuf,
}

impl ChainSummary {
    fn from_chain(chain: Chain, path: PathBuf) -> Self {
        Self {
            id: chain.metadata.id,
            title: chain.metadata.title,
            description: chain.metadata.description,
            notes: chain.metadata.notes,
            tags: chain.metadata.tags,
            path,
        }
    }
}

/// Filesystem-backed CRUD for notes and chains.
#[derive(Debug, Clone)]
pub struct NotebookStore {
    layout: NotebookLayout,
}

impl NotebookStore {
    pub fn new(layout: NotebookLayout) -> Self {
        Self { layout }
    }

    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        Self::new(NotebookLayout::for_workspace(workspace_root))
    }

    pub fn layout(&self) -> &NotebookLayout {
        &self.layout
    }

    /// Serializes and atomically writes a note, returning its file path.
    ///
    /// # Errors
    /// - `InvalidId` when the note id has an empty slug.
    /// - `Document` for validation or snippet hash failures; nothing is written.
    pub async fn save_note(&self, note: &Note) -> StoreResult<PathBuf> {
        let id = note.metadata.id.as_str();
        let path = self.note_path(id)?;
        let serialized =
            serialize_note_markdown(note).map_err(|err| StoreError::document(&path, err))?;
        self.write_document("note_save", id, &path, &serialized)
            .await?;
        Ok(path)
    }

    pub async fn read_note(&self, id: &str) -> StoreResult<Option<Note>> {
        let path = self.note_path(id)?;
        let Some(raw) = read_if_exists(&path)
            .await
            .map_err(|err| StoreError::io(&path, err))?
        else {
            return Ok(None);
        };
        parse_note_markdown(&raw)
            .map(Some)
            .map_err(|err| StoreError::document(&path, err))
    }

    /// Deletes a note file; missing files are not an error.
    pub async fn delete_note(&self, id: &str) -> StoreResult<()> {
        let path = self.note_path(id)?;
        self.delete_document("note_delete", id, &path).await
    }

    /// Lists and parses every note file.
    ///
    /// # Errors
    /// - The first parse failure, tagged with its file path.
    pub async fn list_notes(&self) -> StoreResult<Vec<NoteSummary>> {
        let notes_dir = self.layout.notes_dir();
        let files = self.list_documents(&notes_dir, |name| {
            name.ends_with(NOTE_EXTENSION) && !name.ends_with(CHAIN_EXTENSION)
        })
        .await?;

        let mut summaries = Vec::with_capacity(files.len());
        for (path, raw) in files {
            let note = parse_note_markdown(&raw).map_err(|err| StoreError::document(&path, err))?;
            summaries.push(NoteSummary::from_note(note, path));
        }
        debug!(
            "event=notebook_list module=repo status=ok kind=note count={}",
            summaries.len()
        );
        Ok(summaries)
    }

    pub async fn save_chain(&self, chain: &Chain) -> StoreResult<PathBuf> {
        let id = chain.metadata.id.as_str();
        let path = self.chain_path(id)?;
        let serialized =
            serialize_chain_markdown(chain).map_err(|err| StoreError::document(&path, err))?;
        self.write_document("chain_save", id, &path, &serialized)
            .await?;
        Ok(path)
    }

    pub async fn read_chain(&self, id: &str) -> StoreResult<Option<Chain>> {
        let path = self.chain_path(id)?;
        let Some(raw) = read_if_exists(&path)
            .await
            .map_err(|err| StoreError::io(&path, err))?
        else {
            return Ok(None);
        };
        parse_chain_markdown(&raw)
            .map(Some)
            .map_err(|err| StoreError::document(&path, err))
    }

    pub async fn delete_chain(&self, id: &str) -> StoreResult<()> {
        let path = self.chain_path(id)?;
        self.delete_document("chain_delete", id, &path).await
    }

    pub async fn list_chains(&self) -> StoreResult<Vec<ChainSummary>> {
        let chains_dir = self.layout.chains_dir();
        let files = self
            .list_documents(&chains_dir, |name| name.ends_with(CHAIN_EXTENSION))
            .await?;

        let mut summaries = Vec::with_capacity(files.len());
        for (path, raw) in files {
            let chain =
                parse_chain_markdown(&raw).map_err(|err| StoreError::document(&path, err))?;
            summaries.push(ChainSummary::from_chain(chain, path));
        }
        debug!(
            "event=notebook_list module=repo status=ok kind=chain count={}",
            summaries.len()
        );
        Ok(summaries)
    }

    fn note_path(&self, id: &str) -> StoreResult<PathBuf> {
        self.layout
            .note_path(id)
            .ok_or_else(|| StoreError::InvalidId(id.to_string()))
    }

    fn chain_path(&self, id: &str) -> StoreResult<PathBuf> {
        self.layout
            .chain_path(id)
            .ok_or_else(|| StoreError::InvalidId(id.to_string()))
    }

    async fn write_document(
        &self,
        event: &str,
        id: &str,
        path: &Path,
        contents: &str,
    ) -> StoreResult<()> {
        match write_atomic(path, contents).await {
            Ok(()) => {
                debug!(
                    "event={event} module=repo status=ok id={id} path={}",
                    path.display()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={event} module=repo status=error id={id} path={} error={err}",
                    path.display()
                );
                Err(StoreError::io(path, err))
            }
        }
    }

    async fn delete_document(&self, event: &str, id: &str, path: &Path) -> StoreResult<()> {
        let removed = delete_if_exists(path)
            .await
            .map_err(|err| StoreError::io(path, err))?;
        debug!("event={event} module=repo status=ok id={id} removed={removed}");
        Ok(())
    }

    /// Reads every visible file in `dir` accepted by `accept`.
    ///
    /// Ensures `dir` exists first. Files that vanish before being read are
    /// skipped.
    async fn list_documents(
        &self,
        dir: &Path,
        accept: impl Fn(&str) -> bool,
    ) -> StoreResult<Vec<(PathBuf, String)>> {
        ensure_dir(dir).await.map_err(|err| StoreError::io(dir, err))?;
        let files = list_visible_files(dir)
            .await
            .map_err(|err| StoreError::io(dir, err))?;

        let mut documents = Vec::new();
        for path in files {
            let accepted = path
                .file_name()
                .map(|name| accept(&name.to_string_lossy()))
                .unwrap_or(false);
            if !accepted {
                continue;
            }
            match read_if_exists(&path).await {
                Ok(Some(raw)) => documents.push((path, raw)),
                Ok(None) => continue,
                Err(err) => return Err(StoreError::io(&path, err)),
            }
        }
        Ok(documents)
    }
}
