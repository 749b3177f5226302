//! Qwik component generator.
//!
//! Files land in `<sourceRoot>/<directory>/` when `flat`, otherwise in
//! `<sourceRoot>/<directory>/<fileName>/`. `directory` defaults to `lib`
//! and must stay inside the project root.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::generators::{GeneratorContext, GeneratorUnit, format_files};
use crate::application::scheduler::{Task, run_tasks_in_serial};
use crate::domain::workspace::read_project_configuration;
use crate::domain::{
    DomainError, DomainValidator, Names, NormalizedOptions, Style, TemplateContext, TemplateFile,
    TemplateId, WorkspacePath, WorkspaceTree, generate_files,
};
use crate::error::StagehandResult;

pub const COMPONENT_TEMPLATES: &str = "component";
const DEFAULT_DIRECTORY: &str = "lib";

/// Request for the component generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    pub name: String,
    /// Project that receives the component.
    pub project: String,
    /// Directory below the project's source root.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub skip_tests: bool,
    #[serde(default)]
    pub generate_stories: bool,
    #[serde(default)]
    pub flat: bool,
    /// Re-export the component from `src/index.ts`.
    #[serde(default = "default_export")]
    pub export: bool,
    #[serde(default)]
    pub skip_format: bool,
}

fn default_export() -> bool {
    true
}

impl ComponentRequest {
    pub fn new(name: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: project.into(),
            directory: None,
            style: Style::default(),
            skip_tests: false,
            generate_stories: false,
            flat: false,
            export: true,
            skip_format: false,
        }
    }
}

/// Component options resolved against the target project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedComponentOptions {
    pub names: Names,
    pub project_root: WorkspacePath,
    pub source_root: WorkspacePath,
    /// Directory the component files are written to.
    pub directory: WorkspacePath,
    pub style: Style,
    pub skip_tests: bool,
    pub generate_stories: bool,
    pub export: bool,
}

impl NormalizedComponentOptions {
    /// Path of the main component file.
    pub fn component_file(&self) -> Result<WorkspacePath, DomainError> {
        self.directory.join(&format!("{}.tsx", self.names.file_name))
    }
}

#[instrument(skip_all, fields(name = %request.name, project = %request.project))]
pub fn normalize_component_options(
    tree: &WorkspaceTree,
    request: &ComponentRequest,
) -> Result<NormalizedComponentOptions, DomainError> {
    DomainValidator::validate_name("name", request.name.trim())?;
    if request.project.trim().is_empty() {
        return Err(DomainError::validation("project", "must not be empty"));
    }

    let project = match read_project_configuration(tree, &request.project) {
        Err(DomainError::ProjectNotFound { .. }) => {
            return Err(DomainError::validation(
                "project",
                format!("no project named '{}' exists in the workspace", request.project),
            ));
        }
        other => other?,
    };

    let names = Names::new(request.name.trim());
    let project_root = WorkspacePath::parse(&project.root)?;
    let source_root = match &project.source_root {
        Some(source_root) => WorkspacePath::parse(source_root)?,
        None => project_root.join("src")?,
    };

    let relative = request.directory.as_deref().unwrap_or(DEFAULT_DIRECTORY);
    let mut directory = source_root.join_within(relative)?;
    if !directory.starts_with(&project_root) {
        return Err(DomainError::BoundaryViolation {
            path: directory.to_string(),
            boundary: project_root.to_string(),
        });
    }
    if !request.flat {
        directory = directory.join(&names.file_name)?;
    }

    Ok(NormalizedComponentOptions {
        names,
        project_root,
        source_root,
        directory,
        style: request.style,
        skip_tests: request.skip_tests,
        generate_stories: request.generate_stories,
        export: request.export,
    })
}

/// Generate a component in an existing project.
pub fn component_generator(
    tree: &mut WorkspaceTree,
    ctx: &GeneratorContext,
    request: &ComponentRequest,
) -> StagehandResult<Task> {
    let options = normalize_component_options(tree, request)?;
    let tasks = add_component(tree, ctx, &options)?;
    if !request.skip_format {
        format_files(tree, ctx.formatter.as_ref())?;
    }
    Ok(run_tasks_in_serial("component", tasks))
}

/// Stage the component files and, when asked, the index export.
pub fn add_component(
    tree: &mut WorkspaceTree,
    ctx: &GeneratorContext,
    options: &NormalizedComponentOptions,
) -> StagehandResult<Vec<Task>> {
    let component_file = options.component_file()?;
    if tree.exists(component_file.as_str())? {
        return Err(DomainError::FileExists {
            path: component_file.to_string(),
        }
        .into());
    }

    let set = ctx
        .templates
        .get(&TemplateId::new(COMPONENT_TEMPLATES))?
        .filter(|file| keep_file(file, options));

    let mut context = TemplateContext::from_names(&options.names)
        .with("hasStyle", options.style.extension().is_some())
        .with("generateStories", options.generate_stories);
    if let Some(ext) = options.style.extension() {
        context.insert("style", ext);
    }

    let written = generate_files(tree, &set, &options.directory, &context)?;
    info!(component = %options.names.class_name, files = written.len(), "component staged");

    if options.export {
        export_from_index(tree, options)?;
    }
    Ok(Vec::new())
}

fn keep_file(file: &TemplateFile, options: &NormalizedComponentOptions) -> bool {
    let path = file.path.as_str();
    if path.contains(".spec.") {
        return !options.skip_tests;
    }
    if path.contains(".stories.") {
        return options.generate_stories;
    }
    if path.contains("__style__") {
        return options.style.extension().is_some();
    }
    true
}

/// Append `export * from './lib/...'` to `<sourceRoot>/index.ts` if the
/// index exists and does not export the component yet.
fn export_from_index(tree: &mut WorkspaceTree, options: &NormalizedComponentOptions) -> StagehandResult<()> {
    let index = options.source_root.join("index.ts")?;
    let Some(current) = tree.read_to_string(index.as_str())? else {
        debug!(index = %index, "no index to export from");
        return Ok(());
    };

    let module = options.directory.join(&options.names.file_name)?;
    let Some(relative) = module.strip_prefix(&options.source_root) else {
        return Ok(());
    };
    let line = format!("export * from './{relative}';");
    if current.lines().any(|l| l.trim() == line) {
        return Ok(());
    }

    let mut updated = current;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&line);
    updated.push('\n');
    tree.write(index.as_str(), updated)?;
    Ok(())
}

/// Component step of the library pipeline: one flat component named after
/// the library.
pub struct ComponentUnit<'a> {
    ctx: &'a GeneratorContext,
}

impl<'a> ComponentUnit<'a> {
    pub fn new(ctx: &'a GeneratorContext) -> Self {
        Self { ctx }
    }

    fn request(options: &NormalizedOptions) -> ComponentRequest {
        let name = options.name.rsplit('/').next().unwrap_or(&options.name);
        ComponentRequest {
            name: name.to_string(),
            project: options.project_name.clone(),
            directory: None,
            style: options.style,
            skip_tests: !options.setup_vitest(),
            generate_stories: options.features.generate_stories,
            flat: true,
            export: true,
            skip_format: true,
        }
    }
}

impl GeneratorUnit for ComponentUnit<'_> {
    fn name(&self) -> &'static str {
        "component"
    }

    fn apply(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        let component = normalize_component_options(tree, &Self::request(options))?;
        add_component(tree, self.ctx, &component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectConfiguration;
    use crate::domain::ProjectType;
    use crate::domain::workspace::add_project_configuration;

    fn tree_with_project() -> WorkspaceTree {
        let mut tree = WorkspaceTree::new();
        let config = ProjectConfiguration::new("ui", "libs/ui", ProjectType::Library);
        add_project_configuration(&mut tree, &config).unwrap();
        tree
    }

    #[test]
    fn nested_and_flat_directories() {
        let tree = tree_with_project();
        let nested = normalize_component_options(&tree, &ComponentRequest::new("MyButton", "ui")).unwrap();
        assert_eq!(nested.directory.as_str(), "libs/ui/src/lib/my-button");
        assert_eq!(nested.component_file().unwrap().as_str(), "libs/ui/src/lib/my-button/my-button.tsx");

        let mut request = ComponentRequest::new("MyButton", "ui");
        request.flat = true;
        request.directory = Some("components".into());
        let flat = normalize_component_options(&tree, &request).unwrap();
        assert_eq!(flat.directory.as_str(), "libs/ui/src/components");
    }

    #[test]
    fn unknown_project_is_a_validation_error() {
        let tree = WorkspaceTree::new();
        assert!(matches!(
            normalize_component_options(&tree, &ComponentRequest::new("x", "ghost")),
            Err(DomainError::Validation { field: "project", .. })
        ));
    }

    #[test]
    fn directory_escaping_project_is_rejected() {
        let tree = tree_with_project();
        let mut request = ComponentRequest::new("x", "ui");
        request.directory = Some("../../other".into());
        assert!(matches!(
            normalize_component_options(&tree, &request),
            Err(DomainError::BoundaryViolation { .. })
        ));
    }

    #[test]
    fn file_selection_follows_options() {
        let tree = tree_with_project();
        let mut request = ComponentRequest::new("x", "ui");
        request.skip_tests = true;
        request.style = Style::None;
        let options = normalize_component_options(&tree, &request).unwrap();

        assert!(keep_file(&TemplateFile::literal("__fileName__.tsx__tmpl__", ""), &options));
        assert!(!keep_file(&TemplateFile::literal("__fileName__.spec.tsx__tmpl__", ""), &options));
        assert!(!keep_file(&TemplateFile::literal("__fileName__.stories.tsx__tmpl__", ""), &options));
        assert!(!keep_file(&TemplateFile::literal("__fileName__.__style__", ""), &options));
    }

    #[test]
    fn export_is_appended_once() {
        let mut tree = tree_with_project();
        tree.write("libs/ui/src/index.ts", "export * from './lib/other';").unwrap();
        let options = normalize_component_options(&tree, &ComponentRequest::new("my-button", "ui")).unwrap();

        export_from_index(&mut tree, &options).unwrap();
        export_from_index(&mut tree, &options).unwrap();
        assert_eq!(
            tree.read_to_string("libs/ui/src/index.ts").unwrap().as_deref(),
            Some("export * from './lib/other';\nexport * from './lib/my-button/my-button';\n")
        );
    }
}
