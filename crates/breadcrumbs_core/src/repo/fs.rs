//! Async filesystem primitives used by the store and the index manager.
//!
//! # Invariants
//! - `write_atomic` never leaves a partially written destination file.
//! - "Not found" is an absent result, never an error, for reads and deletes.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub(crate) async fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir).await
}

/// Writes `contents` to a hidden sibling temp file, syncs it, then renames it
/// over `path`.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no parent"))?;
    ensure_dir(parent).await?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.{}", Uuid::new_v4()));

    let mut file = fs::File::create(&temp_path).await?;
    let written = async {
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await
    }
    .await;
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(err);
    }
    Ok(())
}

pub(crate) async fn read_if_exists(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Removes `path`; returns whether a file was actually removed.
pub(crate) async fn delete_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Lists non-hidden, non-directory entries sorted by path.
///
/// A missing directory yields an empty list.
pub(crate) async fn list_visible_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        match entry.file_type().await {
            Ok(kind) if kind.is_dir() => continue,
            Ok(_) => files.push(entry.path()),
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        }
    }
    files.sort();
    Ok(files)
}

/// Modification time in nanoseconds since the Unix epoch, `None` if absent.
pub(crate) async fn modified_signature(path: &Path) -> io::Result<Option<u64>> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let nanos = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0);
    Ok(Some(nanos))
}
