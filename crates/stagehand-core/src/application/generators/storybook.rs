//! Storybook setup for an existing project.
//!
//! Stages `.storybook/main.ts`, `.storybook/preview.ts` and
//! `tsconfig.storybook.json`, adds the `storybook` and `build-storybook`
//! targets, and defers recording the storybook packages.
//!
//! The preview optionally wraps stories in the qwik-city decorator:
//!
//! | `qwik_city_support` | decorator                                  | preview header     |
//! |---------------------|--------------------------------------------|--------------------|
//! | `true`              | yes                                        | none               |
//! | `false`             | no                                         | none               |
//! | `auto`              | if the project is an application or the    | detection result   |
//! |                     | root package.json depends on qwik-city     |                    |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::application::generators::dependencies::{register_dependencies_task, storybook_dependencies};
use crate::application::generators::{GeneratorContext, GeneratorUnit, format_files};
use crate::application::ports::DependencyRegistry;
use crate::application::scheduler::{Task, run_tasks_in_serial};
use crate::domain::workspace::{
    read_project_configuration, root_declares_dependency, update_project_configuration,
};
use crate::domain::{
    DomainError, Names, NormalizedOptions, ProjectConfiguration, QwikCitySupport, TargetConfiguration,
    TemplateContext, TemplateId, WorkspacePath, WorkspaceTree, generate_files, offset_from_root,
};
use crate::error::StagehandResult;

pub const STORYBOOK_TEMPLATES: &str = "storybook";
pub const STORYBOOK_EXECUTOR: &str = "@nx/storybook:storybook";
pub const STORYBOOK_BUILD_EXECUTOR: &str = "@nx/storybook:build";
pub const STORYBOOK_PORT: u16 = 4400;
pub const QWIK_CITY_PACKAGE: &str = "@builder.io/qwik-city";

/// Request for the standalone storybook generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorybookRequest {
    /// Existing project to configure.
    pub project: String,
    #[serde(default)]
    pub qwik_city_support: QwikCitySupport,
    #[serde(default)]
    pub skip_format: bool,
}

impl StorybookRequest {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            qwik_city_support: QwikCitySupport::default(),
            skip_format: false,
        }
    }
}

/// Configure storybook for an existing project.
#[instrument(skip_all, fields(project = %request.project))]
pub fn storybook_configuration_generator(
    tree: &mut WorkspaceTree,
    ctx: &GeneratorContext,
    request: &StorybookRequest,
) -> StagehandResult<Task> {
    let project = find_project(tree, &request.project)?;
    let tasks = configure_storybook(
        tree,
        ctx,
        Arc::clone(&ctx.dependencies),
        &project,
        request.qwik_city_support,
    )?;
    if !request.skip_format {
        format_files(tree, ctx.formatter.as_ref())?;
    }
    Ok(run_tasks_in_serial("storybook-configuration", tasks))
}

/// Storybook step of the library pipeline.
pub struct StorybookUnit<'a> {
    ctx: &'a GeneratorContext,
}

impl<'a> StorybookUnit<'a> {
    pub fn new(ctx: &'a GeneratorContext) -> Self {
        Self { ctx }
    }
}

impl GeneratorUnit for StorybookUnit<'_> {
    fn name(&self) -> &'static str {
        "storybook-configuration"
    }

    fn apply(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        let project = read_project_configuration(tree, &options.project_name)?;
        configure_storybook(
            tree,
            self.ctx,
            Arc::clone(&self.ctx.dependencies),
            &project,
            options.qwik_city_support,
        )
    }
}

/// Outcome of resolving the qwik-city policy for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QwikCityDecision {
    pub enabled: bool,
    /// Set only in `auto` mode: why the decorator was or was not added.
    pub detected_by: Option<&'static str>,
}

pub fn resolve_qwik_city(
    tree: &WorkspaceTree,
    project: &ProjectConfiguration,
    support: QwikCitySupport,
) -> Result<QwikCityDecision, DomainError> {
    Ok(match support {
        QwikCitySupport::True => QwikCityDecision {
            enabled: true,
            detected_by: None,
        },
        QwikCitySupport::False => QwikCityDecision {
            enabled: false,
            detected_by: None,
        },
        QwikCitySupport::Auto => {
            if project.is_application() {
                QwikCityDecision {
                    enabled: true,
                    detected_by: Some("application project"),
                }
            } else if root_declares_dependency(tree, QWIK_CITY_PACKAGE)? {
                QwikCityDecision {
                    enabled: true,
                    detected_by: Some("@builder.io/qwik-city dependency"),
                }
            } else {
                QwikCityDecision {
                    enabled: false,
                    detected_by: Some("no qwik-city usage found"),
                }
            }
        }
    })
}

fn configure_storybook(
    tree: &mut WorkspaceTree,
    ctx: &GeneratorContext,
    registry: Arc<dyn DependencyRegistry>,
    project: &ProjectConfiguration,
    support: QwikCitySupport,
) -> StagehandResult<Vec<Task>> {
    let root = WorkspacePath::parse(&project.root)?;
    let main = root.join(".storybook/main.ts")?;
    if tree.exists(main.as_str())? {
        return Err(DomainError::FileExists { path: main.to_string() }.into());
    }

    let qwik_city = resolve_qwik_city(tree, project, support)?;
    info!(project = %project.name, qwik_city = qwik_city.enabled, "configuring storybook");

    let mut context = TemplateContext::from_names(&Names::new(&project.name))
        .with("projectName", project.name.as_str())
        .with("projectRoot", root.as_str())
        .with("offsetFromRoot", offset_from_root(root.as_str()))
        .with("hasViteConfig", tree.exists(root.join("vite.config.ts")?.as_str())?)
        .with("qwikCity", qwik_city.enabled)
        .with("qwikCityAuto", qwik_city.detected_by.is_some());
    if let Some(reason) = qwik_city.detected_by {
        context.insert("qwikCityReason", reason);
    }

    let set = ctx.templates.get(&TemplateId::new(STORYBOOK_TEMPLATES))?;
    generate_files(tree, &set, &root, &context)?;

    link_tsconfigs(tree, &root)?;

    let mut config = project.clone();
    config.merge_targets(storybook_targets(&project.name, root.as_str()));
    update_project_configuration(tree, &config)?;

    Ok(vec![register_dependencies_task(
        "storybook-dependencies",
        registry,
        storybook_dependencies(),
    )])
}

/// `storybook` and `build-storybook` targets.
pub fn storybook_targets(project: &str, root: &str) -> Vec<(String, TargetConfiguration)> {
    let config_dir = format!("{root}/.storybook");
    vec![
        (
            "storybook".to_string(),
            TargetConfiguration::new(STORYBOOK_EXECUTOR)
                .with_option("port", json!(STORYBOOK_PORT))
                .with_option("configDir", config_dir.as_str())
                .with_configuration("ci", quiet()),
        ),
        (
            "build-storybook".to_string(),
            TargetConfiguration::new(STORYBOOK_BUILD_EXECUTOR)
                .with_output("{options.outputDir}")
                .with_option("configDir", config_dir.as_str())
                .with_option("outputDir", format!("dist/storybook/{project}"))
                .with_configuration("ci", quiet()),
        ),
    ]
}

fn quiet() -> Map<String, Value> {
    let mut ci = Map::new();
    ci.insert("quiet".into(), json!(true));
    ci
}

/// Reference the storybook tsconfig from the project's tsconfig and keep
/// storybook files out of the library build.
fn link_tsconfigs(tree: &mut WorkspaceTree, root: &WorkspacePath) -> StagehandResult<()> {
    let tsconfig = root.join("tsconfig.json")?;
    if tree.is_file(tsconfig.as_str())? {
        tree.update_json(tsconfig.as_str(), |value: &mut Value| {
            push_unique(value, "references", json!({"path": "./tsconfig.storybook.json"}));
            Ok(())
        })?;
    }

    let lib = root.join("tsconfig.lib.json")?;
    if tree.is_file(lib.as_str())? {
        tree.update_json(lib.as_str(), |value: &mut Value| {
            for pattern in [".storybook/**/*", "src/**/*.stories.ts", "src/**/*.stories.tsx"] {
                push_unique(value, "exclude", json!(pattern));
            }
            Ok(())
        })?;
    }
    debug!(root = %root, "storybook tsconfig linked");
    Ok(())
}

fn push_unique(value: &mut Value, key: &str, item: Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    let entry = object.entry(key.to_string()).or_insert_with(|| json!([]));
    if let Some(items) = entry.as_array_mut() {
        if !items.contains(&item) {
            items.push(item);
        }
    }
}

fn find_project(tree: &WorkspaceTree, name: &str) -> StagehandResult<ProjectConfiguration> {
    match read_project_configuration(tree, name) {
        Err(DomainError::ProjectNotFound { .. }) => Err(DomainError::validation(
            "project",
            format!("no project named '{name}' exists in the workspace"),
        )
        .into()),
        other => Ok(other?),
    }
}
