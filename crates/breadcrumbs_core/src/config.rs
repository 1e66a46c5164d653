//! On-disk layout configuration.
//!
//! ```text
//! <workspace>/<root>/notes/<slug(id)>.md
//! <workspace>/<root>/chains/<slug(id)>.chain.md
//! <workspace>/<root>/index.json
//! ```

use crate::util::slugify_id;
use std::path::{Path, PathBuf};

/// Hidden directory holding all notebook data inside a workspace.
pub const DEFAULT_ROOT_DIR: &str = ".breadcrumbs";
pub const NOTES_DIR: &str = "notes";
pub const CHAINS_DIR: &str = "chains";
pub const NOTE_EXTENSION: &str = ".md";
pub const CHAIN_EXTENSION: &str = ".chain.md";
pub const INDEX_FILE_NAME: &str = "index.json";

/// Resolved paths for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookLayout {
    workspace_root: PathBuf,
    data_root: PathBuf,
}

impl NotebookLayout {
    /// Layout rooted at `<workspace>/.breadcrumbs`.
    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let data_root = workspace_root.join(DEFAULT_ROOT_DIR);
        Self {
            workspace_root,
            data_root,
        }
    }

    /// Replaces the hidden root directory name.
    pub fn with_root_dir_name(mut self, name: &str) -> Self {
        self.data_root = self.workspace_root.join(name);
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.data_root.join(NOTES_DIR)
    }

    pub fn chains_dir(&self) -> PathBuf {
        self.data_root.join(CHAINS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_root.join(INDEX_FILE_NAME)
    }

    /// Note file path for `id`, or `None` when the id has an empty slug.
    pub fn note_path(&self, id: &str) -> Option<PathBuf> {
        slug_file_name(id, NOTE_EXTENSION).map(|name| self.notes_dir().join(name))
    }

    /// Chain file path for `id`, or `None` when the id has an empty slug.
    pub fn chain_path(&self, id: &str) -> Option<PathBuf> {
        slug_file_name(id, CHAIN_EXTENSION).map(|name| self.chains_dir().join(name))
    }

    /// Path relative to the workspace root, `/`-separated.
    ///
    /// Paths outside the workspace are returned unchanged.
    pub fn relative_to_workspace(&self, path: &Path) -> String {
        match path.strip_prefix(&self.workspace_root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            _ => path.to_string_lossy().into_owned(),
        }
    }
}

fn slug_file_name(id: &str, extension: &str) -> Option<String> {
    let slug = slugify_id(id);
    if slug.is_empty() {
        None
    } else {
        Some(format!("{slug}{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::NotebookLayout;
    use std::path::{Path, PathBuf};

    #[test]
    fn derives_slugged_document_paths() {
        let layout = NotebookLayout::for_workspace("/work");
        assert_eq!(
            layout.note_path("Note A"),
            Some(PathBuf::from("/work/.breadcrumbs/notes/note-a.md"))
        );
        assert_eq!(
            layout.chain_path("chain-a"),
            Some(PathBuf::from("/work/.breadcrumbs/chains/chain-a.chain.md"))
        );
        assert_eq!(layout.note_path("!!!"), None);
        assert_eq!(
            layout.index_path(),
            PathBuf::from("/work/.breadcrumbs/index.json")
        );
    }

    #[test]
    fn custom_root_dir_moves_every_path() {
        let layout = NotebookLayout::for_workspace("/work").with_root_dir_name(".crumbs");
        assert_eq!(layout.notes_dir(), PathBuf::from("/work/.crumbs/notes"));
    }

    #[test]
    fn relative_paths_fall_back_to_absolute_outside_workspace() {
        let layout = NotebookLayout::for_workspace("/work");
        assert_eq!(
            layout.relative_to_workspace(Path::new("/work/.breadcrumbs/notes/a.md")),
            ".breadcrumbs/notes/a.md"
        );
        assert_eq!(
            layout.relative_to_workspace(Path::new("/elsewhere/a.md")),
            "/elsewhere/a.md"
        );
    }
}
