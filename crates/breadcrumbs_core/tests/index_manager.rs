use breadcrumbs_core::service::compute_checksum;
use breadcrumbs_core::{
    compute_snippet_hash, Chain, ChainMetadata, ChainSummary, IndexStatus, Note, NoteKind,
    NoteMetadata, NoteSummary, NotebookIndex, NotebookIndexManager, NotebookStore, Snippet,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn context_note(snippet_source: &str, content: &str) -> Note {
    let mut metadata = NoteMetadata::new("note-a", "Establish Context", NoteKind::Observation);
    metadata.tags = vec!["context".to_string()];
    Note::new(metadata, content).with_snippet(Snippet::new(snippet_source).with_language("ts"))
}

fn investigation_chain(notes: &[&str]) -> Chain {
    let mut metadata = ChainMetadata::new("chain-a", "Investigation", notes.iter().copied());
    metadata.description = Some("Walk through discovery steps.".to_string());
    metadata.tags = vec!["workflow".to_string()];
    Chain::new(metadata, "Follow up with stakeholders.")
}

async fn seed_workspace(store: &NotebookStore) {
    store
        .save_note(&context_note(
            "function compute() { return 7; }",
            "Gather initial context from the issue tracker.",
        ))
        .await
        .unwrap();
    store
        .save_chain(&investigation_chain(&["note-a"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn refresh_builds_index_with_backlinks_and_persists_it() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;

    let index = manager.refresh(false).await.unwrap();
    assert_eq!(index.version, 1);
    let note = &index.notes["note-a"];
    assert!(note.path.contains("notes"));
    assert_eq!(note.path, ".breadcrumbs/notes/note-a.md");
    assert_eq!(
        note.snippet_hash.as_deref(),
        Some(compute_snippet_hash("function compute() { return 7; }").as_str())
    );
    assert_eq!(index.chains["chain-a"].path, ".breadcrumbs/chains/chain-a.chain.md");
    assert_eq!(index.backlinks["note-a"], vec!["chain-a"]);

    let raw = std::fs::read_to_string(workspace.path().join(".breadcrumbs/index.json")).unwrap();
    assert!(raw.contains("\"version\": 1"));
    assert_eq!(NotebookIndex::from_json(&raw).unwrap(), *index);
}

#[tokio::test]
async fn unchanged_storage_reuses_the_cached_index() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;

    let first = manager.refresh(false).await.unwrap();
    let second = manager.refresh(false).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let loaded = manager.load().await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &loaded));

    let forced = manager.refresh(true).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &forced));
    assert_eq!(forced.checksum, first.checksum);
}

#[tokio::test]
async fn note_changes_rebuild_with_a_new_checksum() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;
    let first = manager.refresh(false).await.unwrap();

    manager
        .store()
        .save_note(&context_note(
            "function compute() { return 8; }",
            "Gather updated context after the customer call.",
        ))
        .await
        .unwrap();
    assert_eq!(manager.status().await.unwrap(), IndexStatus::Stale);

    let second = manager.refresh(false).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(second.checksum, first.checksum);
    assert_eq!(
        second.notes["note-a"].snippet_hash.as_deref(),
        Some(compute_snippet_hash("function compute() { return 8; }").as_str())
    );
}

#[tokio::test]
async fn rewriting_identical_content_keeps_the_checksum() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;
    let first = manager.refresh(false).await.unwrap();

    seed_workspace(manager.store()).await;
    let second = manager.refresh(false).await.unwrap();
    assert_eq!(second.checksum, first.checksum);
}

#[tokio::test]
async fn dangling_chain_references_get_backlinks() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;
    manager
        .store()
        .save_chain(&investigation_chain(&["note-a", "ghost-note"]))
        .await
        .unwrap();

    let index = manager.refresh(false).await.unwrap();
    assert!(!index.notes.contains_key("ghost-note"));
    assert_eq!(index.backlinks["ghost-note"], vec!["chain-a"]);
    assert_eq!(index.backlinks["note-a"], vec!["chain-a"]);
}

#[tokio::test]
async fn notes_without_chains_have_empty_backlinks() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    manager
        .store()
        .save_note(&context_note("let a = 1;", "Lonely note."))
        .await
        .unwrap();

    let index = manager.refresh(false).await.unwrap();
    assert!(index.chains.is_empty());
    assert!(index.backlinks["note-a"].is_empty());
}

#[tokio::test]
async fn load_without_persisted_index_returns_none() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;

    assert!(manager.load().await.unwrap().is_none());
    assert_eq!(manager.status().await.unwrap(), IndexStatus::Unloaded);
}

#[tokio::test]
async fn fresh_manager_adopts_a_matching_persisted_index() {
    let workspace = TempDir::new().unwrap();
    let mut writer = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(writer.store()).await;
    let built = writer.refresh(false).await.unwrap();

    let mut reader = NotebookIndexManager::for_workspace(workspace.path());
    let loaded = reader.load().await.unwrap().unwrap();
    assert_eq!(*loaded, *built);
    assert_eq!(loaded.generated_at, built.generated_at);
    assert_eq!(reader.status().await.unwrap(), IndexStatus::Cached);
}

#[tokio::test]
async fn stale_persisted_index_is_rebuilt_on_load() {
    let workspace = TempDir::new().unwrap();
    let mut writer = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(writer.store()).await;
    let built = writer.refresh(false).await.unwrap();

    writer
        .store()
        .save_note(&context_note(
            "function compute() { return 8; }",
            "Edited outside the manager.",
        ))
        .await
        .unwrap();

    let mut reader = NotebookIndexManager::for_workspace(workspace.path());
    let loaded = reader.load().await.unwrap().unwrap();
    assert_ne!(loaded.checksum, built.checksum);
    assert_eq!(
        loaded.notes["note-a"].snippet_hash.as_deref(),
        Some(compute_snippet_hash("function compute() { return 8; }").as_str())
    );

    let persisted = read_index(workspace.path());
    assert_eq!(persisted.checksum, loaded.checksum);
}

#[tokio::test]
async fn corrupt_persisted_index_is_rebuilt_on_load() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;
    std::fs::write(manager.layout().index_path(), "{ not json").unwrap();

    let loaded = manager.load().await.unwrap().unwrap();
    assert!(loaded.notes.contains_key("note-a"));
    assert_eq!(read_index(workspace.path()), *loaded);
}

#[tokio::test]
async fn invalidate_drops_the_cache() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    seed_workspace(manager.store()).await;

    let first = manager.refresh(false).await.unwrap();
    assert_eq!(manager.status().await.unwrap(), IndexStatus::Cached);

    manager.invalidate();
    assert!(manager.cached().is_none());
    assert_eq!(manager.status().await.unwrap(), IndexStatus::Unloaded);

    let second = manager.refresh(false).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.checksum, first.checksum);
}

#[test]
fn checksum_ignores_listing_order_and_paths() {
    let notes = vec![summary_note("b", "/one/b.md"), summary_note("a", "/one/a.md")];
    let chains = vec![summary_chain("z", &["a"]), summary_chain("y", &["b", "a"])];

    let mut moved_notes = vec![summary_note("a", "/two/a.md"), summary_note("b", "/two/b.md")];
    let moved_chains: Vec<_> = chains.iter().rev().cloned().collect();
    let baseline = compute_checksum(&notes, &chains).unwrap();
    assert_eq!(compute_checksum(&moved_notes, &moved_chains).unwrap(), baseline);

    moved_notes[0].title = "Renamed".to_string();
    assert_ne!(compute_checksum(&moved_notes, &moved_chains).unwrap(), baseline);

    let mut described = chains.clone();
    described[0].description = Some("Now with a description".to_string());
    assert_ne!(compute_checksum(&notes, &described).unwrap(), baseline);
}

#[test]
fn checksum_treats_tags_as_a_set_but_keeps_chain_note_order() {
    let mut notes = vec![summary_note("a", "/a.md")];
    let mut chains = vec![summary_chain("c", &["a", "b"])];
    notes[0].tags = vec!["beta".to_string(), "alpha".to_string()];
    chains[0].tags = vec!["y".to_string(), "x".to_string()];
    let baseline = compute_checksum(&notes, &chains).unwrap();

    notes[0].tags.reverse();
    chains[0].tags.reverse();
    assert_eq!(compute_checksum(&notes, &chains).unwrap(), baseline);

    chains[0].notes.reverse();
    assert_ne!(compute_checksum(&notes, &chains).unwrap(), baseline);
}

#[tokio::test]
async fn reordering_tags_keeps_the_checksum() {
    let workspace = TempDir::new().unwrap();
    let mut manager = NotebookIndexManager::for_workspace(workspace.path());
    let mut note = context_note("let a = 1;", "Tagged note.");
    note.metadata.tags = vec!["one".to_string(), "two".to_string()];
    manager.store().save_note(&note).await.unwrap();
    let first = manager.refresh(false).await.unwrap();

    note.metadata.tags.reverse();
    manager.store().save_note(&note).await.unwrap();
    let second = manager.refresh(false).await.unwrap();
    assert_eq!(second.checksum, first.checksum);
}

fn summary_note(id: &str, path: &str) -> NoteSummary {
    NoteSummary {
        id: id.to_string(),
        title: format!("Note {id}"),
        kind: NoteKind::Analysis,
        tags: vec!["t".to_string()],
        path: PathBuf::from(path),
        snippet_hash: None,
        snippet_commit: None,
    }
}

fn summary_chain(id: &str, notes: &[&str]) -> ChainSummary {
    ChainSummary {
        id: id.to_string(),
        title: format!("Chain {id}"),
        description: None,
        notes: notes.iter().map(|note| note.to_string()).collect(),
        tags: Vec::new(),
        path: PathBuf::from(format!("/chains/{id}.chain.md")),
    }
}

fn read_index(workspace: &Path) -> NotebookIndex {
    let raw = std::fs::read_to_string(workspace.join(".breadcrumbs").join("index.json")).unwrap();
    NotebookIndex::from_json(&raw).unwrap()
}
