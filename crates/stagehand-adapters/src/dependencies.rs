//! Dependency registry adapters.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use stagehand_core::{
    application::{
        ApplicationError,
        ports::{DependencyRegistry, DependencySet},
    },
    error::StagehandResult,
};

/// Records requirements in the workspace's root `package.json`.
///
/// Packages already listed keep their version.
#[derive(Debug, Clone)]
pub struct PackageJsonRegistry {
    path: PathBuf,
}

impl PackageJsonRegistry {
    /// Registry for the `package.json` inside `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            path: workspace_root.into().join("package.json"),
        }
    }

    fn fail(&self, reason: impl Into<String>) -> ApplicationError {
        ApplicationError::DependencyRegistration {
            reason: format!("{}: {}", self.path.display(), reason.into()),
        }
    }
}

impl DependencyRegistry for PackageJsonRegistry {
    #[instrument(skip_all, fields(path = %self.path.display(), packages = set.len()))]
    fn register(&self, set: &DependencySet) -> StagehandResult<()> {
        let mut manifest = if self.path.is_file() {
            let raw = fs::read_to_string(&self.path).map_err(|e| self.fail(e.to_string()))?;
            serde_json::from_str::<Value>(&raw).map_err(|e| self.fail(e.to_string()))?
        } else {
            json!({})
        };
        let object = manifest
            .as_object_mut()
            .ok_or_else(|| self.fail("root is not an object"))?;

        let added = merge_section(object, "dependencies", &set.dependencies)
            + merge_section(object, "devDependencies", &set.dev_dependencies);

        let mut text = serde_json::to_string_pretty(&manifest).map_err(|e| self.fail(e.to_string()))?;
        text.push('\n');
        fs::write(&self.path, text).map_err(|e| self.fail(e.to_string()))?;
        info!(added, "package.json updated");
        Ok(())
    }
}

/// Add missing packages to `section`, keeping it sorted. Returns how many
/// were added.
fn merge_section(object: &mut Map<String, Value>, section: &str, packages: &BTreeMap<String, String>) -> usize {
    if packages.is_empty() {
        return 0;
    }
    let mut merged: BTreeMap<String, Value> = object
        .get(section)
        .and_then(Value::as_object)
        .map(|existing| existing.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    let mut added = 0;
    for (name, version) in packages {
        if merged.contains_key(name) {
            debug!(package = %name, "already declared");
            continue;
        }
        merged.insert(name.clone(), Value::String(version.clone()));
        added += 1;
    }
    object.insert(section.to_string(), Value::Object(merged.into_iter().collect()));
    added
}

/// Keeps every registered set in memory, for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    sets: Arc<Mutex<Vec<DependencySet>>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets registered so far, in registration order.
    pub fn sets(&self) -> Vec<DependencySet> {
        self.sets.lock().map(|sets| sets.clone()).unwrap_or_default()
    }
}

impl DependencyRegistry for RecordingRegistry {
    fn register(&self, set: &DependencySet) -> StagehandResult<()> {
        self.sets
            .lock()
            .map_err(|_| ApplicationError::DependencyRegistration {
                reason: "recording lock poisoned".into(),
            })?
            .push(set.clone());
        Ok(())
    }
}
