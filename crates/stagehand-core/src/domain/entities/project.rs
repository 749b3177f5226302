//! Project configuration records (`<projectRoot>/project.json`).
//!
//! Records are always merged, never replaced wholesale: fields and targets
//! this crate does not know about survive a read-modify-write untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::ProjectType;

/// File name of a project configuration record inside its project root.
pub const PROJECT_FILE: &str = "project.json";

/// One project's configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    pub name: String,

    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Directory holding `project.json`. Implied by the record's location,
    /// so never persisted.
    #[serde(skip)]
    pub root: String,

    /// Optional in Nx; records without it are still valid projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<BTreeMap<String, TargetConfiguration>>,

    /// Keys not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectConfiguration {
    pub fn new(name: impl Into<String>, root: impl Into<String>, project_type: ProjectType) -> Self {
        let root = root.into();
        Self {
            name: name.into(),
            schema: Some(schema_path(&root)),
            source_root: Some(format!("{root}/src")),
            root,
            project_type: Some(project_type),
            tags: Some(Vec::new()),
            targets: Some(BTreeMap::new()),
            extra: Map::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Structurally merge `targets` into this record.
    ///
    /// Targets not named in `targets` are left exactly as they were. A
    /// target present on both sides is merged with
    /// [`TargetConfiguration::merge`].
    pub fn merge_targets(&mut self, targets: impl IntoIterator<Item = (String, TargetConfiguration)>) {
        let existing_targets = self.targets.get_or_insert_with(BTreeMap::new);
        for (name, incoming) in targets {
            match existing_targets.get_mut(&name) {
                Some(existing) => existing.merge(incoming),
                None => {
                    existing_targets.insert(name, incoming);
                }
            }
        }
    }

    pub fn target(&self, name: &str) -> Option<&TargetConfiguration> {
        self.targets.as_ref()?.get(name)
    }

    pub fn is_application(&self) -> bool {
        self.project_type == Some(ProjectType::Application)
    }
}

/// A named build-system target: executor plus options and per-environment
/// overrides.
///
/// Every field is optional so a record read from disk is written back with
/// exactly the keys it had. Nx also accepts `command`-only targets, which
/// carry no executor at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations: Option<BTreeMap<String, Map<String, Value>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TargetConfiguration {
    pub fn new(executor: impl Into<String>) -> Self {
        let executor = executor.into();
        Self {
            executor: (!executor.is_empty()).then_some(executor),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.outputs.get_or_insert_with(Vec::new).push(output.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_configuration(mut self, name: impl Into<String>, overrides: Map<String, Value>) -> Self {
        self.configurations
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), overrides);
        self
    }

    pub fn executor(&self) -> Option<&str> {
        self.executor.as_deref()
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.as_ref()?.get(key)
    }

    pub fn outputs(&self) -> &[String] {
        self.outputs.as_deref().unwrap_or_default()
    }

    /// Merge `incoming` into `self`.
    ///
    /// The executor is taken from `incoming` when it names one; outputs are
    /// replaced only when `incoming` declares some; options and
    /// configurations are merged key by key with nested objects merged
    /// recursively. Fields `incoming` leaves out are not touched.
    pub fn merge(&mut self, incoming: TargetConfiguration) {
        if incoming.executor.is_some() {
            self.executor = incoming.executor;
        }
        if incoming.outputs.as_ref().is_some_and(|o| !o.is_empty()) {
            self.outputs = incoming.outputs;
        }
        if let Some(options) = incoming.options {
            merge_objects(self.options.get_or_insert_with(Map::new), options);
        }
        if let Some(configurations) = incoming.configurations {
            let existing = self.configurations.get_or_insert_with(BTreeMap::new);
            for (name, overrides) in configurations {
                merge_objects(existing.entry(name).or_default(), overrides);
            }
        }
        merge_objects(&mut self.extra, incoming.extra);
    }
}

/// Deep-merge `incoming` into `base`: objects merge key by key, anything
/// else is replaced.
pub fn merge_json(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => merge_objects(base, incoming),
        (base, incoming) => *base = incoming,
    }
}

fn merge_objects(base: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match base.get_mut(&key) {
            Some(existing) => merge_json(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Relative path from a project root to the project.json schema.
fn schema_path(root: &str) -> String {
    format!(
        "{}node_modules/nx/schemas/project-schema.json",
        crate::domain::entities::path::offset_from_root(root)
    )
}
