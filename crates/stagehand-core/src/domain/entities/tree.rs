//! The virtual workspace tree.
//!
//! Every read and write a generator performs goes through [`WorkspaceTree`].
//! Writes and deletes are *staged*: they shadow the optional read-only
//! [`TreeBacking`] (usually the real workspace on disk) and are only made
//! durable when the caller hands [`WorkspaceTree::list_changes`] to a
//! commit adapter. Dropping the tree abandons the run without side effects.
//!
//! ```text
//!   generator ──write/delete──▶ staged map ──list_changes──▶ commit adapter
//!       │                          ▲
//!       └──────read/exists─────────┴── falls through to TreeBacking
//! ```
//!
//! Only the last operation per path decides its final state: a delete
//! followed by a write resurrects the file, a write followed by a delete
//! removes it again.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::domain::entities::path::WorkspacePath;
use crate::domain::error::DomainError;

/// Read-only view of the durable workspace a tree is layered on.
///
/// Implemented by `stagehand_adapters::filesystem::LocalFilesystem` (disk)
/// and `stagehand_adapters::filesystem::MemoryFilesystem` (tests). Reads
/// never fail: unreadable entries are reported as absent.
pub trait TreeBacking: Send + Sync {
    /// File content, `None` if the path is not a readable file.
    fn read(&self, path: &WorkspacePath) -> Option<Vec<u8>>;

    fn is_file(&self, path: &WorkspacePath) -> bool;

    fn is_dir(&self, path: &WorkspacePath) -> bool;

    /// Names of the direct children of a directory.
    fn list_dir(&self, path: &WorkspacePath) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Staged {
    Write(Vec<u8>),
    Deleted,
}

/// Kind of a recorded tree operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOperation {
    Write,
    Delete,
}

/// One entry of the change log, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: WorkspacePath,
    pub operation: TreeOperation,
}

/// Net effect on one path, relative to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// A finalized change, ready for a commit adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: WorkspacePath,
    pub kind: ChangeKind,
    /// `None` for deletions.
    pub content: Option<Vec<u8>>,
}

/// Directory index over staged writes: for each directory, the names of
/// its direct children with the number of staged writes at or below each.
#[derive(Debug, Default)]
struct StagedDirs {
    children: HashMap<WorkspacePath, BTreeMap<String, usize>>,
}

impl StagedDirs {
    fn add(&mut self, file: &WorkspacePath) {
        self.walk_ancestors(file, |counts, name| {
            *counts.entry(name.to_string()).or_default() += 1;
        });
    }

    fn remove(&mut self, file: &WorkspacePath) {
        self.walk_ancestors(file, |counts, name| {
            if let Some(count) = counts.get_mut(name) {
                *count -= 1;
                if *count == 0 {
                    counts.remove(name);
                }
            }
        });
    }

    fn walk_ancestors(
        &mut self,
        file: &WorkspacePath,
        mut update: impl FnMut(&mut BTreeMap<String, usize>, &str),
    ) {
        let mut child = file.clone();
        while let Some(dir) = child.parent() {
            let Some(name) = child.file_name() else {
                break;
            };
            let counts = self.children.entry(dir.clone()).or_default();
            update(counts, name);
            if counts.is_empty() {
                self.children.remove(&dir);
            }
            child = dir;
        }
    }

    fn has_entries_below(&self, dir: &WorkspacePath) -> bool {
        self.children.contains_key(dir)
    }

    fn child_names(&self, dir: &WorkspacePath) -> impl Iterator<Item = &String> {
        self.children.get(dir).into_iter().flat_map(BTreeMap::keys)
    }
}

/// In-memory staging area for one scaffolding run.
pub struct WorkspaceTree {
    backing: Option<Arc<dyn TreeBacking>>,
    staged: HashMap<WorkspacePath, Staged>,
    dirs: StagedDirs,
    /// Sequence number of the last operation on each path.
    last_touch: HashMap<WorkspacePath, usize>,
    log: Vec<ChangeRecord>,
    /// Project name → project root.
    projects: BTreeMap<String, WorkspacePath>,
}

impl WorkspaceTree {
    /// An empty tree with nothing underneath it.
    pub fn new() -> Self {
        Self {
            backing: None,
            staged: HashMap::new(),
            dirs: StagedDirs::default(),
            last_touch: HashMap::new(),
            log: Vec::new(),
            projects: BTreeMap::new(),
        }
    }

    /// A tree layered on top of an existing workspace.
    pub fn with_backing(backing: Arc<dyn TreeBacking>) -> Self {
        Self {
            backing: Some(backing),
            ..Self::new()
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Current content of a file, `None` when it does not exist.
    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let path = WorkspacePath::parse(path)?;
        Ok(self.read_path(&path))
    }

    pub fn read_to_string(&self, path: &str) -> Result<Option<String>, DomainError> {
        Ok(self
            .read(path)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Deserialize a JSON file.
    pub fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        let bytes = self.read(path)?.ok_or_else(|| DomainError::FileNotFound {
            path: path.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| DomainError::MalformedJson {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn exists(&self, path: &str) -> Result<bool, DomainError> {
        let path = WorkspacePath::parse(path)?;
        Ok(self.is_file_path(&path) || self.is_dir_path(&path))
    }

    pub fn is_file(&self, path: &str) -> Result<bool, DomainError> {
        let path = WorkspacePath::parse(path)?;
        Ok(self.is_file_path(&path))
    }

    /// Sorted names of the direct children of a directory, honouring
    /// staged writes and deletes.
    pub fn children(&self, path: &str) -> Result<Vec<String>, DomainError> {
        let dir = WorkspacePath::parse(path)?;
        let mut candidates: BTreeSet<String> = BTreeSet::new();

        if let Some(backing) = &self.backing {
            candidates.extend(backing.list_dir(&dir));
        }
        candidates.extend(self.dirs.child_names(&dir).cloned());

        Ok(candidates
            .into_iter()
            .filter(|name| match dir.join(name) {
                Ok(child) => self.is_file_path(&child) || self.is_dir_path(&child),
                Err(_) => false,
            })
            .collect())
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Stage `content` at `path`, creating or overwriting it.
    pub fn write(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<(), DomainError> {
        let path = WorkspacePath::parse(path)?;
        if path.is_root() {
            return Err(DomainError::validation("path", "cannot write to the workspace root"));
        }
        trace!(path = %path, "stage write");
        self.record(path.clone(), TreeOperation::Write);
        self.stage(path, Staged::Write(content.into()));
        Ok(())
    }

    /// Serialize `value` as pretty JSON (2-space indent, trailing newline).
    pub fn write_json<T: Serialize>(&mut self, path: &str, value: &T) -> Result<(), DomainError> {
        let mut text = serde_json::to_string_pretty(value).map_err(|e| DomainError::MalformedJson {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        text.push('\n');
        self.write(path, text)
    }

    /// Read-modify-write a JSON file.
    pub fn update_json<T, F>(&mut self, path: &str, update: F) -> Result<(), DomainError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> Result<(), DomainError>,
    {
        let mut value: T = self.read_json(path)?;
        update(&mut value)?;
        self.write_json(path, &value)
    }

    /// Stage the removal of a file, or of a directory and everything in it.
    /// Deleting a path that does not exist is a no-op.
    pub fn delete(&mut self, path: &str) -> Result<(), DomainError> {
        let path = WorkspacePath::parse(path)?;
        if path.is_root() {
            return Err(DomainError::validation("path", "cannot delete the workspace root"));
        }

        if self.is_file_path(&path) {
            trace!(path = %path, "stage delete");
            self.mark_deleted(path);
            return Ok(());
        }

        if self.is_dir_path(&path) {
            let files = self.descendant_files(&path);
            debug!(path = %path, files = files.len(), "stage directory delete");
            for file in files {
                self.mark_deleted(file);
            }
            self.mark_deleted(path);
        }

        Ok(())
    }

    // ── Project side-table ────────────────────────────────────────────────

    pub fn register_project(&mut self, name: impl Into<String>, root: WorkspacePath) {
        self.projects.insert(name.into(), root);
    }

    /// Root of a project registered during this run, if its `project.json`
    /// still exists.
    pub fn registered_project_root(&self, name: &str) -> Option<WorkspacePath> {
        let root = self.projects.get(name)?;
        let config = root.join("project.json").ok()?;
        self.is_file_path(&config).then(|| root.clone())
    }

    // ── Change inspection ─────────────────────────────────────────────────

    /// Every write and delete in application order.
    pub fn change_log(&self) -> &[ChangeRecord] {
        &self.log
    }

    /// Net changes against the backing store, ordered by each path's last
    /// operation.
    pub fn list_changes(&self) -> Vec<FileChange> {
        let mut changes: Vec<(usize, FileChange)> = self
            .staged
            .iter()
            .filter_map(|(path, entry)| {
                let seq = self.last_touch.get(path).copied().unwrap_or_default();
                self.net_change(path, entry).map(|change| (seq, change))
            })
            .collect();
        changes.sort_by_key(|(seq, _)| *seq);
        changes.into_iter().map(|(_, change)| change).collect()
    }

    /// Paths currently staged as written, in order of their last write.
    pub fn written_files(&self) -> Vec<WorkspacePath> {
        let mut files: Vec<(usize, WorkspacePath)> = self
            .staged
            .iter()
            .filter(|(_, entry)| matches!(entry, Staged::Write(_)))
            .map(|(path, _)| {
                (self.last_touch.get(path).copied().unwrap_or_default(), path.clone())
            })
            .collect();
        files.sort_by_key(|(seq, _)| *seq);
        files.into_iter().map(|(_, path)| path).collect()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn record(&mut self, path: WorkspacePath, operation: TreeOperation) {
        self.last_touch.insert(path.clone(), self.log.len());
        self.log.push(ChangeRecord { path, operation });
    }

    fn mark_deleted(&mut self, path: WorkspacePath) {
        self.record(path.clone(), TreeOperation::Delete);
        self.stage(path, Staged::Deleted);
    }

    fn stage(&mut self, path: WorkspacePath, entry: Staged) {
        let was_write = matches!(self.staged.get(&path), Some(Staged::Write(_)));
        match (was_write, &entry) {
            (false, Staged::Write(_)) => self.dirs.add(&path),
            (true, Staged::Deleted) => self.dirs.remove(&path),
            _ => {}
        }
        self.staged.insert(path, entry);
    }

    pub(crate) fn read_path(&self, path: &WorkspacePath) -> Option<Vec<u8>> {
        match self.staged.get(path) {
            Some(Staged::Write(content)) => Some(content.clone()),
            Some(Staged::Deleted) => None,
            None => self.backing.as_ref().and_then(|b| b.read(path)),
        }
    }

    fn is_file_path(&self, path: &WorkspacePath) -> bool {
        match self.staged.get(path) {
            Some(Staged::Write(_)) => true,
            Some(Staged::Deleted) => false,
            None => self.backing.as_ref().is_some_and(|b| b.is_file(path)),
        }
    }

    fn is_dir_path(&self, path: &WorkspacePath) -> bool {
        if path.is_root() {
            return true;
        }
        if self.dirs.has_entries_below(path) {
            return true;
        }
        // A deleted ancestor hides backing directories below it.
        let mut current = Some(path.clone());
        while let Some(dir) = current {
            if matches!(self.staged.get(&dir), Some(Staged::Deleted)) {
                return false;
            }
            current = dir.parent();
        }
        self.backing.as_ref().is_some_and(|b| b.is_dir(path))
    }

    fn descendant_files(&self, dir: &WorkspacePath) -> Vec<WorkspacePath> {
        let mut files = Vec::new();
        let mut pending = vec![dir.clone()];
        while let Some(current) = pending.pop() {
            let Ok(names) = self.children(current.as_str()) else {
                continue;
            };
            for name in names {
                let Ok(child) = current.join(&name) else {
                    continue;
                };
                if self.is_file_path(&child) {
                    files.push(child);
                } else {
                    pending.push(child);
                }
            }
        }
        files.sort();
        files
    }

    fn net_change(&self, path: &WorkspacePath, entry: &Staged) -> Option<FileChange> {
        let backing = self.backing.as_ref();
        match entry {
            Staged::Write(content) => {
                let existed = backing.is_some_and(|b| b.is_file(path));
                if existed {
                    if backing.and_then(|b| b.read(path)).as_deref() == Some(content.as_slice()) {
                        return None;
                    }
                    Some(FileChange {
                        path: path.clone(),
                        kind: ChangeKind::Update,
                        content: Some(content.clone()),
                    })
                } else {
                    Some(FileChange {
                        path: path.clone(),
                        kind: ChangeKind::Create,
                        content: Some(content.clone()),
                    })
                }
            }
            Staged::Deleted => {
                // A directory that regained files after its delete is not
                // removed wholesale; its other files carry their own deletes.
                if self.dirs.has_entries_below(path) {
                    return None;
                }
                let existed = backing.is_some_and(|b| b.is_file(path) || b.is_dir(path));
                existed.then(|| FileChange {
                    path: path.clone(),
                    kind: ChangeKind::Delete,
                    content: None,
                })
            }
        }
    }
}

impl Default for WorkspaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkspaceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceTree")
            .field("backed", &self.backing.is_some())
            .field("staged", &self.staged.len())
            .field("operations", &self.log.len())
            .finish()
    }
}
