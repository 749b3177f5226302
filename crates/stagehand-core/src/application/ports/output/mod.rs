//! Driven (output) ports - implemented by infrastructure.

use std::collections::BTreeMap;

use crate::domain::{FileChange, TemplateId, TemplateSet, WorkspacePath};
use crate::error::StagehandResult;

pub use crate::domain::TreeBacking;

/// Port applying a finalized change list to durable storage.
///
/// Implemented by:
/// - `stagehand_adapters::filesystem::LocalFilesystem` (production)
/// - `stagehand_adapters::filesystem::MemoryFilesystem` (testing)
pub trait WorkspaceWriter: Send + Sync {
    /// Apply `changes` in order.
    fn commit(&self, changes: &[FileChange]) -> StagehandResult<()>;
}

/// Port for template set storage and retrieval.
///
/// Implemented by:
/// - `stagehand_adapters::template_store::InMemoryStore` (built-in sets,
///   optionally overlaid with sets loaded from disk)
pub trait TemplateStore: Send + Sync {
    /// Get a template set by ID.
    fn get(&self, id: &TemplateId) -> StagehandResult<TemplateSet>;

    /// IDs of every available set.
    fn list(&self) -> StagehandResult<Vec<TemplateId>>;

    /// Insert or replace a set.
    fn insert(&self, set: TemplateSet) -> StagehandResult<()>;
}

/// Package requirements gathered during planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runtime(mut self, package: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies.insert(package.into(), version.into());
        self
    }

    pub fn dev(mut self, package: impl Into<String>, version: impl Into<String>) -> Self {
        self.dev_dependencies.insert(package.into(), version.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len() + self.dev_dependencies.len()
    }
}

/// Port recording that the workspace now requires some packages.
///
/// Only ever called from deferred tasks, after the tree was committed.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyRegistry: Send + Sync {
    fn register(&self, set: &DependencySet) -> StagehandResult<()>;
}

/// Port normalizing the text of staged files.
pub trait Formatter: Send + Sync {
    /// Formatted content, or `None` when `path` is not handled.
    fn format(&self, path: &WorkspacePath, content: &str) -> Option<String>;
}
