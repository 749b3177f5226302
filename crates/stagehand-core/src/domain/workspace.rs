//! Workspace-level records read and written through the tree: layout
//! settings, project configurations and the root TypeScript path map.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::domain::entities::path::{WorkspacePath, join_path_fragments};
use crate::domain::entities::project::{PROJECT_FILE, ProjectConfiguration};
use crate::domain::entities::tree::WorkspaceTree;
use crate::domain::error::DomainError;

pub const NX_JSON: &str = "nx.json";
pub const ROOT_PACKAGE_JSON: &str = "package.json";
pub const ROOT_TSCONFIG: &str = "tsconfig.base.json";

const DEFAULT_LIBS_DIR: &str = "libs";
const DEFAULT_APPS_DIR: &str = "apps";

/// Directories never searched for project records.
const SCAN_SKIP: &[&str] = &["node_modules", "dist", "tmp", "coverage"];

/// Where projects live and how they are imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub libs_dir: String,
    pub apps_dir: String,
    /// `acme` for a root package named `@acme/source`.
    pub npm_scope: Option<String>,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            libs_dir: DEFAULT_LIBS_DIR.into(),
            apps_dir: DEFAULT_APPS_DIR.into(),
            npm_scope: None,
        }
    }
}

impl WorkspaceLayout {
    /// Read `nx.json` and the root `package.json`; missing files fall back
    /// to defaults.
    pub fn read(tree: &WorkspaceTree) -> Result<Self, DomainError> {
        let mut layout = Self::default();

        if tree.is_file(NX_JSON)? {
            let nx: Value = tree.read_json(NX_JSON)?;
            if let Some(dir) = nx.pointer("/workspaceLayout/libsDir").and_then(Value::as_str) {
                layout.libs_dir = dir.trim_matches('/').to_string();
            }
            if let Some(dir) = nx.pointer("/workspaceLayout/appsDir").and_then(Value::as_str) {
                layout.apps_dir = dir.trim_matches('/').to_string();
            }
            layout.npm_scope = nx
                .get("npmScope")
                .and_then(Value::as_str)
                .map(|s| s.trim_start_matches('@').to_string())
                .filter(|s| !s.is_empty());
        }

        if tree.is_file(ROOT_PACKAGE_JSON)? {
            let package: Value = tree.read_json(ROOT_PACKAGE_JSON)?;
            let scope = package
                .get("name")
                .and_then(Value::as_str)
                .and_then(|name| name.strip_prefix('@'))
                .and_then(|rest| rest.split_once('/'))
                .map(|(scope, _)| scope.to_string());
            if scope.is_some() {
                layout.npm_scope = scope;
            }
        }

        Ok(layout)
    }
}

// ── Project configuration records ────────────────────────────────────────────

/// Register a new project and write its `project.json`.
pub fn add_project_configuration(
    tree: &mut WorkspaceTree,
    config: &ProjectConfiguration,
) -> Result<(), DomainError> {
    if project_exists(tree, &config.name)? {
        return Err(DomainError::ProjectExists {
            name: config.name.clone(),
        });
    }
    let root = WorkspacePath::parse(&config.root)?;
    let file = root.join(PROJECT_FILE)?;
    if tree.is_file(file.as_str())? {
        return Err(DomainError::FileExists {
            path: file.to_string(),
        });
    }
    tree.write_json(file.as_str(), config)?;
    tree.register_project(config.name.clone(), root);
    debug!(project = %config.name, root = %config.root, "project registered");
    Ok(())
}

/// Look a project up by name.
pub fn read_project_configuration(
    tree: &WorkspaceTree,
    name: &str,
) -> Result<ProjectConfiguration, DomainError> {
    if let Some(root) = tree.registered_project_root(name) {
        return read_record(tree, &root);
    }
    get_projects(tree)?
        .remove(name)
        .ok_or_else(|| DomainError::ProjectNotFound { name: name.to_string() })
}

/// Overwrite an existing project's record.
pub fn update_project_configuration(
    tree: &mut WorkspaceTree,
    config: &ProjectConfiguration,
) -> Result<(), DomainError> {
    let root = if config.root.is_empty() {
        read_project_configuration(tree, &config.name)?.root
    } else {
        config.root.clone()
    };
    let file = WorkspacePath::parse(&root)?.join(PROJECT_FILE)?;
    if !tree.is_file(file.as_str())? {
        return Err(DomainError::ProjectNotFound {
            name: config.name.clone(),
        });
    }
    tree.write_json(file.as_str(), config)
}

pub fn project_exists(tree: &WorkspaceTree, name: &str) -> Result<bool, DomainError> {
    match read_project_configuration(tree, name) {
        Ok(_) => Ok(true),
        Err(DomainError::ProjectNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Every project record in the workspace, keyed by name.
///
/// A record that does not parse fails the scan with
/// [`DomainError::MalformedJson`] rather than hiding the project.
pub fn get_projects(tree: &WorkspaceTree) -> Result<BTreeMap<String, ProjectConfiguration>, DomainError> {
    let mut projects = BTreeMap::new();
    let mut pending = vec![WorkspacePath::root()];

    while let Some(dir) = pending.pop() {
        for name in tree.children(dir.as_str())? {
            let child = dir.join(&name)?;
            if name == PROJECT_FILE && tree.is_file(child.as_str())? {
                let config = read_record(tree, &dir).inspect_err(|e| {
                    warn!(path = %child, error = %e, "unreadable project record");
                })?;
                projects.insert(config.name.clone(), config);
            } else if !name.starts_with('.')
                && !SCAN_SKIP.contains(&name.as_str())
                && !tree.is_file(child.as_str())?
            {
                pending.push(child);
            }
        }
    }

    Ok(projects)
}

fn read_record(tree: &WorkspaceTree, root: &WorkspacePath) -> Result<ProjectConfiguration, DomainError> {
    let file = root.join(PROJECT_FILE)?;
    let mut config: ProjectConfiguration = tree.read_json(file.as_str())?;
    config.root = root.to_string();
    Ok(config)
}

// ── TypeScript path map ──────────────────────────────────────────────────────

/// Create `tsconfig.base.json` with a minimal shape if it does not exist.
pub fn ensure_root_tsconfig(tree: &mut WorkspaceTree) -> Result<(), DomainError> {
    if tree.is_file(ROOT_TSCONFIG)? {
        return Ok(());
    }
    tree.write_json(
        ROOT_TSCONFIG,
        &json!({
            "compileOnSave": false,
            "compilerOptions": {
                "rootDir": ".",
                "sourceMap": true,
                "declaration": false,
                "moduleResolution": "node",
                "target": "es2015",
                "module": "esnext",
                "lib": ["es2020", "dom"],
                "skipLibCheck": true,
                "skipDefaultLibCheck": true,
                "baseUrl": ".",
                "paths": {}
            },
            "exclude": ["node_modules", "tmp"]
        }),
    )
}

/// Whether `tsconfig.base.json` already maps `import_path`. A missing
/// file maps nothing.
pub fn import_path_in_use(tree: &WorkspaceTree, import_path: &str) -> Result<bool, DomainError> {
    if !tree.is_file(ROOT_TSCONFIG)? {
        return Ok(false);
    }
    let root: Value = tree.read_json(ROOT_TSCONFIG)?;
    Ok(root
        .pointer("/compilerOptions/paths")
        .and_then(Value::as_object)
        .is_some_and(|paths| paths.contains_key(import_path)))
}

/// Map `import_path` to `targets` under `compilerOptions.paths`.
///
/// Fails with [`DomainError::ImportPathInUse`] if the path is already
/// mapped; other mappings are left untouched.
pub fn add_ts_config_path(
    tree: &mut WorkspaceTree,
    import_path: &str,
    targets: &[String],
) -> Result<(), DomainError> {
    tree.update_json(ROOT_TSCONFIG, |root: &mut Value| {
        let Some(root) = root.as_object_mut() else {
            return Err(DomainError::MalformedJson {
                path: ROOT_TSCONFIG.into(),
                reason: "expected a JSON object".into(),
            });
        };
        let options = object_entry(root, "compilerOptions")?;
        let paths = object_entry(options, "paths")?;
        if paths.contains_key(import_path) {
            return Err(DomainError::ImportPathInUse {
                import_path: import_path.to_string(),
                file: ROOT_TSCONFIG.into(),
            });
        }
        paths.insert(import_path.to_string(), json!(targets));
        Ok(())
    })
}

fn object_entry<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>, DomainError> {
    map.entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| DomainError::MalformedJson {
            path: ROOT_TSCONFIG.into(),
            reason: format!("'{key}' must be an object"),
        })
}

/// Relative path from a project root to `tsconfig.base.json`.
pub fn relative_root_tsconfig(project_root: &str) -> String {
    format!(
        "{}{ROOT_TSCONFIG}",
        crate::domain::entities::path::offset_from_root(project_root)
    )
}

/// Whether the root `package.json` declares `package` in any dependency
/// section.
pub fn root_declares_dependency(tree: &WorkspaceTree, package: &str) -> Result<bool, DomainError> {
    if !tree.is_file(ROOT_PACKAGE_JSON)? {
        return Ok(false);
    }
    let manifest: Value = tree.read_json(ROOT_PACKAGE_JSON)?;
    Ok(["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .any(|section| manifest.get(section).and_then(|deps| deps.get(package)).is_some()))
}

/// `<root>/src/index.ts` as the path map target for a project.
pub fn index_entry(project_root: &str) -> String {
    join_path_fragments(&[project_root, "src", "index.ts"])
}
