//! The library generator and its base scaffolding unit.

use tracing::{debug, info, instrument};

use crate::application::generators::{
    CommonDependenciesUnit, ComponentUnit, EslintUnit, GeneratorContext, GeneratorUnit,
    StorybookUnit, ViteUnit, format_files,
};
use crate::application::scheduler::{Pipeline, Task, run_tasks_in_serial};
use crate::domain::workspace::{
    add_project_configuration, add_ts_config_path, ensure_root_tsconfig, index_entry,
    relative_root_tsconfig,
};
use crate::domain::{
    LibraryRequest, Names, NormalizedOptions, ProjectConfiguration, ProjectType, TemplateContext,
    TemplateId, WorkspaceTree, generate_files, normalize_library_options, offset_from_root,
};
use crate::error::StagehandResult;

pub const LIBRARY_TEMPLATES: &str = "library";

/// Vite's library entry; Qwik expects it even when nothing renders it.
const ROOT_TSX: &str = "import { component$ } from '@builder.io/qwik';\n\
\n\
export default component$(() => {\n  return <></>;\n});\n";

/// Generate a Qwik library.
///
/// Normalizes `request`, runs the unit pipeline against `tree`, formats the
/// staged files unless asked not to, and returns the combined deferred
/// task. Nothing outside `tree` is touched until that task is run.
#[instrument(skip_all, fields(name = %request.name))]
pub fn library_generator(
    tree: &mut WorkspaceTree,
    ctx: &GeneratorContext,
    request: &LibraryRequest,
) -> StagehandResult<Task> {
    let options = normalize_library_options(tree, request)?;
    info!(project = %options.project_name, root = %options.project_root, "generating library");

    let pipeline = Pipeline::new()
        .then(ScaffoldLibraryUnit::new(ctx))
        .then_if(options.features.storybook, StorybookUnit::new(ctx))
        .then_if(options.features.generate_component, ComponentUnit::new(ctx))
        .then(ViteUnit)
        .then_if(options.uses_eslint(), EslintUnit)
        .then(CommonDependenciesUnit::new(ctx));
    debug!(units = ?pipeline.unit_names(), "pipeline assembled");

    let tasks = pipeline.run(tree, &options)?;

    if !options.skip_format {
        format_files(tree, ctx.formatter.as_ref())?;
    }

    Ok(run_tasks_in_serial("library", tasks))
}

/// Project record, path mapping, base files.
pub struct ScaffoldLibraryUnit<'a> {
    ctx: &'a GeneratorContext,
}

impl<'a> ScaffoldLibraryUnit<'a> {
    pub fn new(ctx: &'a GeneratorContext) -> Self {
        Self { ctx }
    }
}

impl GeneratorUnit for ScaffoldLibraryUnit<'_> {
    fn name(&self) -> &'static str {
        "scaffold-library"
    }

    fn apply(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        let root = options.project_root.as_str();

        ensure_root_tsconfig(tree)?;
        let config = ProjectConfiguration::new(&options.project_name, root, ProjectType::Library)
            .with_tags(options.tags.iter().cloned());
        add_project_configuration(tree, &config)?;
        add_ts_config_path(tree, &options.import_path, &[index_entry(root)])?;

        let set = self.ctx.templates.get(&TemplateId::new(LIBRARY_TEMPLATES))?;
        generate_files(tree, &set, &options.project_root, &library_context(options))?;

        let root_tsx = options.source_root.join("root.tsx")?;
        if !tree.exists(root_tsx.as_str())? {
            tree.write(root_tsx.as_str(), ROOT_TSX)?;
        }

        if !options.setup_vitest() {
            tree.delete(&format!("{root}/tsconfig.spec.json"))?;
        }
        if !options.buildable {
            tree.delete(&format!("{root}/package.json"))?;
            if !options.setup_vitest() {
                tree.delete(&format!("{root}/vite.config.ts"))?;
            }
        }

        Ok(Vec::new())
    }
}

fn library_context(options: &NormalizedOptions) -> TemplateContext {
    let root = options.project_root.as_str();
    TemplateContext::from_names(&Names::new(&options.project_name))
        .with("projectName", options.project_name.as_str())
        .with("projectRoot", root)
        .with("importPath", options.import_path.as_str())
        .with("offsetFromRoot", offset_from_root(root))
        .with("rootTsConfigPath", relative_root_tsconfig(root))
        .with("strict", options.strict)
        .with("buildable", options.buildable)
        .with("setupVitest", options.setup_vitest())
        .with("generateComponent", options.features.generate_component)
}
