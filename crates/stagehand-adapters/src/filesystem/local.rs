//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use stagehand_core::{
    application::{
        ApplicationError,
        ports::{TreeBacking, WorkspaceWriter},
    },
    domain::{ChangeKind, FileChange, WorkspacePath},
    error::{StagehandError, StagehandResult},
};

/// Production adapter rooted at a workspace directory on disk.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    /// Create an adapter for the workspace at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a workspace path.
    pub fn resolve(&self, path: &WorkspacePath) -> PathBuf {
        path.segments().fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn apply(&self, change: &FileChange) -> StagehandResult<()> {
        let target = self.resolve(&change.path);
        match (change.kind, &change.content) {
            (ChangeKind::Delete, _) => {
                if target.is_dir() {
                    fs::remove_dir_all(&target).map_err(|e| map_io_error(&target, e, "remove directory"))
                } else if target.exists() {
                    fs::remove_file(&target).map_err(|e| map_io_error(&target, e, "remove file"))
                } else {
                    debug!(path = %change.path, "already absent");
                    Ok(())
                }
            }
            (_, Some(content)) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e, "create directory"))?;
                }
                fs::write(&target, content).map_err(|e| map_io_error(&target, e, "write file"))
            }
            (kind, None) => Err(ApplicationError::FilesystemError {
                path: target,
                reason: format!("{kind} change carries no content"),
            }
            .into()),
        }
    }
}

impl TreeBacking for LocalFilesystem {
    fn read(&self, path: &WorkspacePath) -> Option<Vec<u8>> {
        let target = self.resolve(path);
        if !target.is_file() {
            return None;
        }
        match fs::read(&target) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %target.display(), error = %e, "unreadable file treated as absent");
                None
            }
        }
    }

    fn is_file(&self, path: &WorkspacePath) -> bool {
        self.resolve(path).is_file()
    }

    fn is_dir(&self, path: &WorkspacePath) -> bool {
        self.resolve(path).is_dir()
    }

    fn list_dir(&self, path: &WorkspacePath) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.resolve(path)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl WorkspaceWriter for LocalFilesystem {
    #[instrument(skip_all, fields(root = %self.root.display(), changes = changes.len()))]
    fn commit(&self, changes: &[FileChange]) -> StagehandResult<()> {
        for change in changes {
            self.apply(change)?;
            debug!(kind = %change.kind, path = %change.path, "applied");
        }
        Ok(())
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StagehandError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
