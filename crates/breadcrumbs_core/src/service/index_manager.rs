//! Derived notebook index with on-disk persistence and an in-memory cache.
//!
//! # Responsibility
//! - Build the index (entries, backlinks, checksum) from store listings.
//! - Persist it atomically to `index.json` and reuse it while storage is unchanged.
//! - Self-heal when the persisted index disagrees with current storage.
//!
//! # Invariants
//! - The checksum only covers semantic fields, sorted by id; paths, file times
//!   and `generatedAt` never influence it.
//! - The index is rebuilt wholesale; cached instances are never mutated.
//! - A stale or unreadable persisted index is rebuilt, not reported as an error.
//!
//! # Concurrency
//! - Operations take `&mut self`; callers sharing a manager must serialize
//!   access themselves. Notes and chains are listed one after the other with no
//!   snapshot across the two listings.

use crate::config::NotebookLayout;
use crate::hash::digest_json;
use crate::model::{ChainIndexEntry, NoteIndexEntry, NoteKind, NotebookIndex, INDEX_VERSION};
use crate::repo::fs::{modified_signature, read_if_exists, write_atomic};
use crate::repo::notebook_store::{ChainSummary, NoteSummary, NotebookStore};
use crate::repo::StoreError;
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub type IndexResult<T> = Result<T, IndexError>;

/// Index manager error.
#[derive(Debug)]
pub enum IndexError {
    /// Listing notes/chains failed (I/O or a malformed document).
    Store(StoreError),
    /// Reading/writing the index file or a file signature failed.
    Io { path: PathBuf, source: io::Error },
    Serialize(serde_json::Error),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Serialize(err) => write!(f, "failed to encode notebook index: {err}"),
        }
    }
}

impl Error for IndexError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<StoreError> for IndexError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Per-file signature strings keyed by absolute document path.
type SignatureMap = BTreeMap<PathBuf, String>;

/// Cache state owned by one manager instance.
#[derive(Debug, Default)]
enum IndexState {
    #[default]
    Unloaded,
    Cached {
        index: Arc<NotebookIndex>,
        signatures: SignatureMap,
    },
}

/// Observable cache status, see [`NotebookIndexManager::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// Nothing cached yet.
    Unloaded,
    /// Cached index matches every tracked file signature.
    Cached,
    /// Storage changed since the cached index was built.
    Stale,
}

struct Listing {
    notes: Vec<NoteSummary>,
    chains: Vec<ChainSummary>,
}

/// Builds, caches, validates and persists the notebook index.
#[derive(Debug)]
pub struct NotebookIndexManager {
    store: NotebookStore,
    state: IndexState,
}

impl NotebookIndexManager {
    pub fn new(layout: NotebookLayout) -> Self {
        Self {
            store: NotebookStore::new(layout),
            state: IndexState::Unloaded,
        }
    }

    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        Self::new(NotebookLayout::for_workspace(workspace_root))
    }

    /// Store used for listings; shares this manager's layout.
    pub fn store(&self) -> &NotebookStore {
        &self.store
    }

    pub fn layout(&self) -> &NotebookLayout {
        self.store.layout()
    }

    /// Currently cached index, without touching storage.
    pub fn cached(&self) -> Option<Arc<NotebookIndex>> {
        match &self.state {
            IndexState::Unloaded => None,
            IndexState::Cached { index, .. } => Some(Arc::clone(index)),
        }
    }

    /// Drops the in-memory cache; the next `refresh` always rebuilds.
    pub fn invalidate(&mut self) {
        self.state = IndexState::Unloaded;
    }

    /// Returns the cached index, or adopts the persisted one if it still
    /// matches storage.
    ///
    /// Returns `Ok(None)` when nothing is cached and no index file exists;
    /// callers then use [`refresh`](Self::refresh). A persisted index whose
    /// checksum disagrees with storage, or which fails to decode, is replaced
    /// by a forced rebuild.
    pub async fn load(&mut self) -> IndexResult<Option<Arc<NotebookIndex>>> {
        if let Some(index) = self.cached() {
            return Ok(Some(index));
        }

        let index_path = self.layout().index_path();
        let raw = read_if_exists(&index_path)
            .await
            .map_err(|source| IndexError::Io {
                path: index_path.clone(),
                source,
            })?;
        let Some(raw) = raw else {
            info!("event=index_load module=service status=absent");
            return Ok(None);
        };

        let listing = self.list_documents().await?;
        let expected = compute_checksum(&listing.notes, &listing.chains)?;
        match NotebookIndex::from_json(&raw) {
            Ok(persisted) if persisted.checksum == expected => {
                let signatures = capture_signatures(&listing).await?;
                let index = Arc::new(persisted);
                self.state = IndexState::Cached {
                    index: Arc::clone(&index),
                    signatures,
                };
                info!(
                    "event=index_load module=service status=ok notes={} chains={}",
                    index.notes.len(),
                    index.chains.len()
                );
                Ok(Some(index))
            }
            Ok(_) => {
                warn!("event=index_rebuild_reason module=service reason=checksum_mismatch");
                self.rebuild(listing).await.map(Some)
            }
            Err(err) => {
                warn!("event=index_rebuild_reason module=service reason=invalid_index error={err}");
                self.rebuild(listing).await.map(Some)
            }
        }
    }

    /// Recomputes the index unless every file signature is unchanged.
    ///
    /// With `force == false` and an unchanged signature set, the cached
    /// instance is returned as-is (same `Arc`).
    pub async fn refresh(&mut self, force: bool) -> IndexResult<Arc<NotebookIndex>> {
        let started_at = Instant::now();
        let listing = self.list_documents().await?;
        let signatures = capture_signatures(&listing).await?;

        if !force {
            if let IndexState::Cached {
                index,
                signatures: cached,
            } = &self.state
            {
                if *cached == signatures {
                    info!(
                        "event=index_refresh module=service status=ok cache=hit duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    return Ok(Arc::clone(index));
                }
            }
        }

        let index = self.rebuild_with(listing, signatures).await?;
        info!(
            "event=index_refresh module=service status=ok cache=miss forced={} notes={} chains={} duration_ms={}",
            force,
            index.notes.len(),
            index.chains.len(),
            started_at.elapsed().as_millis()
        );
        Ok(index)
    }

    /// Compares the cached signatures with current storage without rebuilding.
    pub async fn status(&self) -> IndexResult<IndexStatus> {
        let IndexState::Cached { signatures, .. } = &self.state else {
            return Ok(IndexStatus::Unloaded);
        };
        let listing = self.list_documents().await?;
        let current = capture_signatures(&listing).await?;
        if *signatures == current {
            Ok(IndexStatus::Cached)
        } else {
            Ok(IndexStatus::Stale)
        }
    }

    async fn list_documents(&self) -> IndexResult<Listing> {
        let notes = self.store.list_notes().await?;
        let chains = self.store.list_chains().await?;
        Ok(Listing { notes, chains })
    }

    async fn rebuild(&mut self, listing: Listing) -> IndexResult<Arc<NotebookIndex>> {
        let signatures = capture_signatures(&listing).await?;
        self.rebuild_with(listing, signatures).await
    }

    async fn rebuild_with(
        &mut self,
        listing: Listing,
        signatures: SignatureMap,
    ) -> IndexResult<Arc<NotebookIndex>> {
        let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let index = build_index(self.layout(), &listing.notes, &listing.chains, generated_at)?;

        let index_path = self.layout().index_path();
        let encoded = index.to_json_pretty()?;
        write_atomic(&index_path, &encoded)
            .await
            .map_err(|source| IndexError::Io {
                path: index_path.clone(),
                source,
            })?;

        let index = Arc::new(index);
        self.state = IndexState::Cached {
            index: Arc::clone(&index),
            signatures,
        };
        Ok(index)
    }
}

/// Builds an index value from listings.
///
/// Entries are keyed by id; when two files share an id, the one with the
/// greater path wins. Every known note id gets a backlink list, and chain
/// references to unknown ids add entries for those ids too.
pub fn build_index(
    layout: &NotebookLayout,
    notes: &[NoteSummary],
    chains: &[ChainSummary],
    generated_at: String,
) -> Result<NotebookIndex, serde_json::Error> {
    let checksum = compute_checksum(notes, chains)?;

    let mut sorted_notes: Vec<&NoteSummary> = notes.iter().collect();
    sorted_notes.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    let mut note_entries = BTreeMap::new();
    for note in sorted_notes {
        let entry = NoteIndexEntry {
            id: note.id.clone(),
            title: note.title.clone(),
            kind: note.kind,
            tags: note.tags.clone(),
            path: layout.relative_to_workspace(&note.path),
            snippet_hash: note.snippet_hash.clone(),
            snippet_commit: note.snippet_commit.clone(),
        };
        if note_entries.insert(note.id.clone(), entry).is_some() {
            warn!("event=index_duplicate_id module=service kind=note id={}", note.id);
        }
    }

    let mut sorted_chains: Vec<&ChainSummary> = chains.iter().collect();
    sorted_chains.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    let mut chain_entries = BTreeMap::new();
    for chain in sorted_chains {
        let entry = ChainIndexEntry {
            id: chain.id.clone(),
            title: chain.title.clone(),
            description: chain.description.clone(),
            notes: chain.notes.clone(),
            tags: chain.tags.clone(),
            path: layout.relative_to_workspace(&chain.path),
        };
        if chain_entries.insert(chain.id.clone(), entry).is_some() {
            warn!("event=index_duplicate_id module=service kind=chain id={}", chain.id);
        }
    }

    Ok(NotebookIndex {
        version: INDEX_VERSION,
        generated_at,
        notes: note_entries,
        chains: chain_entries,
        backlinks: compute_backlinks(notes, chains),
        checksum,
    })
}

/// Maps every note id (known or referenced) to the sorted chain ids citing it.
pub fn compute_backlinks(
    notes: &[NoteSummary],
    chains: &[ChainSummary],
) -> BTreeMap<String, Vec<String>> {
    let mut backlinks: BTreeMap<String, Vec<String>> = notes
        .iter()
        .map(|note| (note.id.clone(), Vec::new()))
        .collect();
    for chain in chains {
        for note_id in &chain.notes {
            backlinks
                .entry(note_id.clone())
                .or_default()
                .push(chain.id.clone());
        }
    }
    for chain_ids in backlinks.values_mut() {
        chain_ids.sort();
        chain_ids.dedup();
    }
    backlinks
}

#[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
struct ChecksumNote<'a> {
    id: &'a str,
    title: &'a str,
    kind: NoteKind,
    tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snippet_hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snippet_commit: Option<&'a str>,
}

#[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct ChecksumChain<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    notes: &'a [String],
    tags: Vec<&'a str>,
}

#[derive(Serialize)]
struct ChecksumPayload<'a> {
    notes: Vec<ChecksumNote<'a>>,
    chains: Vec<ChecksumChain<'a>>,
}

/// Digest over the id-sorted semantic projection of all notes and chains.
///
/// Independent of listing order, file paths and file times.
pub fn compute_checksum(
    notes: &[NoteSummary],
    chains: &[ChainSummary],
) -> Result<String, serde_json::Error> {
    let mut note_rows: Vec<ChecksumNote<'_>> = notes
        .iter()
        .map(|note| ChecksumNote {
            id: &note.id,
            title: &note.title,
            kind: note.kind,
            tags: sorted_tags(&note.tags),
            snippet_hash: note.snippet_hash.as_deref(),
            snippet_commit: note.snippet_commit.as_deref(),
        })
        .collect();
    note_rows.sort();

    let mut chain_rows: Vec<ChecksumChain<'_>> = chains
        .iter()
        .map(|chain| ChecksumChain {
            id: &chain.id,
            title: &chain.title,
            description: chain.description.as_deref(),
            notes: &chain.notes,
            tags: sorted_tags(&chain.tags),
        })
        .collect();
    chain_rows.sort();

    digest_json(&ChecksumPayload {
        notes: note_rows,
        chains: chain_rows,
    })
}

/// Tags are an unordered set; chain `notes` keep their order.
fn sorted_tags(tags: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

async fn capture_signatures(listing: &Listing) -> IndexResult<SignatureMap> {
    let mut signatures = SignatureMap::new();
    for note in &listing.notes {
        let file_signature = file_signature(&note.path).await?;
        let payload = json!({
            "type": "note",
            "id": note.id,
            "title": note.title,
            "kind": note.kind,
            "tags": sorted_tags(&note.tags),
            "snippetHash": note.snippet_hash,
            "snippetCommit": note.snippet_commit,
            "fileSignature": file_signature,
        });
        signatures.insert(note.path.clone(), serde_json::to_string(&payload)?);
    }
    for chain in &listing.chains {
        let file_signature = file_signature(&chain.path).await?;
        let payload = json!({
            "type": "chain",
            "id": chain.id,
            "title": chain.title,
            "description": chain.description,
            "notes": chain.notes,
            "tags": sorted_tags(&chain.tags),
            "fileSignature": file_signature,
        });
        signatures.insert(chain.path.clone(), serde_json::to_string(&payload)?);
    }
    Ok(signatures)
}

async fn file_signature(path: &std::path::Path) -> IndexResult<Option<u64>> {
    modified_signature(path)
        .await
        .map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })
}
