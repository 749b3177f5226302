//! In-memory workspace for testing.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use stagehand_core::{
    application::{
        ApplicationError,
        ports::{TreeBacking, WorkspaceWriter},
    },
    domain::{ChangeKind, FileChange, WorkspacePath},
    error::StagehandResult,
};

/// In-memory workspace. Directories exist implicitly through the files
/// below them.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<BTreeMap<WorkspacePath, Vec<u8>>>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file (testing helper).
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> StagehandResult<Self> {
        let path = WorkspacePath::parse(path)?;
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .insert(path, content.into());
        Ok(self)
    }

    /// Read a file as UTF-8 (testing helper).
    pub fn read_file(&self, path: &str) -> Option<String> {
        let path = WorkspacePath::parse(path).ok()?;
        let inner = self.inner.read().ok()?;
        inner.get(&path).and_then(|bytes| String::from_utf8(bytes.clone()).ok())
    }

    /// Every stored file path, sorted.
    pub fn list_files(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.keys().map(ToString::to_string).collect())
            .unwrap_or_default()
    }
}

impl TreeBacking for MemoryFilesystem {
    fn read(&self, path: &WorkspacePath) -> Option<Vec<u8>> {
        self.inner.read().ok()?.get(path).cloned()
    }

    fn is_file(&self, path: &WorkspacePath) -> bool {
        self.inner.read().is_ok_and(|inner| inner.contains_key(path))
    }

    fn is_dir(&self, path: &WorkspacePath) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.keys().any(|p| p != path && p.starts_with(path)))
    }

    fn list_dir(&self, path: &WorkspacePath) -> Vec<String> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut names: Vec<String> = inner
            .keys()
            .filter_map(|p| p.strip_prefix(path))
            .filter(|rest| !rest.is_empty())
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl WorkspaceWriter for MemoryFilesystem {
    fn commit(&self, changes: &[FileChange]) -> StagehandResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        for change in changes {
            match (change.kind, &change.content) {
                (ChangeKind::Delete, _) => {
                    inner.retain(|p, _| !p.starts_with(&change.path));
                }
                (_, Some(content)) => {
                    inner.insert(change.path.clone(), content.clone());
                }
                (kind, None) => {
                    return Err(ApplicationError::FilesystemError {
                        path: change.path.as_str().into(),
                        reason: format!("{kind} change carries no content"),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
