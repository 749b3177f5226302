//! In-memory template store with built-in sets.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::{info, instrument};

use stagehand_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{DomainError, TemplateId, TemplateSet},
    error::StagehandResult,
};

use crate::builtin_templates;
use crate::template_loader::{FilesystemTemplateLoader, LoadedSet};

/// Thread-safe in-memory template store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<BTreeMap<TemplateId, TemplateSet>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the built-in sets loaded.
    pub fn with_builtin() -> StagehandResult<Self> {
        let store = Self::new();
        for set in builtin_templates::all_sets() {
            store.insert(set)?;
        }
        Ok(store)
    }

    /// Layer the sets found under `dir` over the current ones.
    ///
    /// A loaded set either replaces the stored set of the same id or has its
    /// files merged over it, as its manifest says.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn overlay_dir(&self, dir: &Path) -> StagehandResult<usize> {
        let loaded = FilesystemTemplateLoader::new(dir).load_all()?;
        let count = loaded.len();
        for set in loaded {
            self.overlay(set)?;
        }
        info!(sets = count, "template overrides applied");
        Ok(count)
    }

    fn overlay(&self, loaded: LoadedSet) -> StagehandResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        let id = loaded.set.id().clone();
        match inner.get_mut(&id) {
            Some(existing) if !loaded.replace => {
                for file in loaded.set.files() {
                    existing.upsert(file.clone());
                }
            }
            _ => {
                inner.insert(id, loaded.set);
            }
        }
        Ok(())
    }

    /// Get the number of sets.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for InMemoryStore {
    fn get(&self, id: &TemplateId) -> StagehandResult<TemplateSet> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError)?;
        inner.get(id).cloned().ok_or_else(|| {
            DomainError::TemplateNotFound {
                id: id.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> StagehandResult<Vec<TemplateId>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.keys().cloned().collect())
    }

    fn insert(&self, set: TemplateSet) -> StagehandResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(set.id().clone(), set);
        Ok(())
    }
}
