//! Option normalization: raw requests in, fully resolved options out.
//!
//! Generators never see an `Option` for something they consume. Every
//! default, derived path and cross-option rule is settled here, once, and
//! the result is immutable.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::entities::path::{WorkspacePath, join_path_fragments};
use crate::domain::entities::tree::WorkspaceTree;
use crate::domain::error::DomainError;
use crate::domain::names::to_kebab_case;
use crate::domain::validation::DomainValidator;
use crate::domain::value_objects::{
    Linter, ProjectNameAndRootFormat, QwikCitySupport, Style, UnitTestRunner,
};
use crate::domain::workspace::{ROOT_TSCONFIG, WorkspaceLayout, import_path_in_use, project_exists};

/// A library request as supplied by a caller. Only `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibraryRequest {
    pub name: String,
    pub directory: Option<String>,
    /// Comma separated.
    pub tags: Option<String>,
    pub style: Option<Style>,
    pub linter: Option<Linter>,
    pub strict: Option<bool>,
    pub unit_test_runner: Option<UnitTestRunner>,
    pub generate_component: Option<bool>,
    pub generate_stories: Option<bool>,
    pub storybook_configuration: Option<bool>,
    pub buildable: Option<bool>,
    pub import_path: Option<String>,
    pub project_name_and_root_format: Option<ProjectNameAndRootFormat>,
    pub skip_format: Option<bool>,
}

impl LibraryRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Fully resolved library options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    /// Name as requested.
    pub name: String,
    /// Unique project name (`shared-my-lib`).
    pub project_name: String,
    /// Project directory below the libs directory (`shared/my-lib`).
    pub project_directory: String,
    pub project_root: WorkspacePath,
    pub source_root: WorkspacePath,
    pub import_path: String,
    pub tags: Vec<String>,
    pub style: Style,
    pub linter: Linter,
    pub unit_test_runner: UnitTestRunner,
    pub strict: bool,
    pub buildable: bool,
    pub features: Features,
    pub qwik_city_support: QwikCitySupport,
    pub project_name_and_root_format: ProjectNameAndRootFormat,
    pub skip_format: bool,
}

/// Feature flags that decide which generator units run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub setup_vitest: bool,
    pub generate_component: bool,
    pub generate_stories: bool,
    pub storybook: bool,
}

impl NormalizedOptions {
    pub fn uses_eslint(&self) -> bool {
        self.linter == Linter::EsLint
    }

    pub fn setup_vitest(&self) -> bool {
        self.features.setup_vitest
    }
}

/// Resolve `request` against the workspace in `tree`.
///
/// Reads `nx.json`, the root `package.json` and existing project records;
/// never writes.
#[instrument(skip_all, fields(name = %request.name))]
pub fn normalize_library_options(
    tree: &WorkspaceTree,
    request: &LibraryRequest,
) -> Result<NormalizedOptions, DomainError> {
    let name = request.name.trim();
    DomainValidator::validate_name("name", name)?;
    if let Some(directory) = &request.directory {
        DomainValidator::validate_directory(directory)?;
    }
    let tags = DomainValidator::parse_tags(request.tags.as_deref())?;

    let layout = WorkspaceLayout::read(tree)?;
    let format = request.project_name_and_root_format.unwrap_or_default();
    let directory = request
        .directory
        .as_deref()
        .map(|d| d.trim_matches('/'))
        .filter(|d| !d.is_empty());

    let (project_name, project_directory, project_root) = match format {
        ProjectNameAndRootFormat::Derived => {
            let name_dir = to_kebab_case(name);
            let project_directory = match directory {
                Some(dir) => {
                    let dir = dir.split('/').map(to_kebab_case).collect::<Vec<_>>().join("/");
                    format!("{dir}/{name_dir}")
                }
                None => name_dir,
            };
            let project_name = project_directory.replace('/', "-");
            let root = join_path_fragments(&[&layout.libs_dir, &project_directory]);
            (project_name, project_directory, root)
        }
        ProjectNameAndRootFormat::AsProvided => {
            let root = directory.unwrap_or(name).to_string();
            (name.to_string(), root.clone(), root)
        }
    };

    let project_root = WorkspacePath::parse(&project_root)?;
    if project_root.is_root() {
        return Err(DomainError::validation("directory", "project root cannot be the workspace root"));
    }
    let source_root = project_root.join("src")?;

    if project_exists(tree, &project_name)? {
        return Err(DomainError::ProjectExists { name: project_name });
    }

    let import_path = match &request.import_path {
        Some(path) => path.trim().to_string(),
        None => match &layout.npm_scope {
            Some(scope) => format!("@{scope}/{project_directory}"),
            None => project_directory.clone(),
        },
    };
    DomainValidator::validate_import_path(&import_path)?;
    if import_path_in_use(tree, &import_path)? {
        return Err(DomainError::ImportPathInUse {
            import_path,
            file: ROOT_TSCONFIG.into(),
        });
    }

    let unit_test_runner = request.unit_test_runner.unwrap_or_default();
    let features = resolve_features(request, unit_test_runner)?;

    let options = NormalizedOptions {
        name: name.to_string(),
        project_name,
        project_directory,
        project_root,
        source_root,
        import_path,
        tags,
        style: request.style.unwrap_or_default(),
        linter: request.linter.unwrap_or_default(),
        unit_test_runner,
        strict: request.strict.unwrap_or(true),
        buildable: request.buildable.unwrap_or(false),
        features,
        qwik_city_support: QwikCitySupport::default(),
        project_name_and_root_format: format,
        skip_format: request.skip_format.unwrap_or(false),
    };
    debug!(
        project = %options.project_name,
        root = %options.project_root,
        import_path = %options.import_path,
        "options normalized"
    );
    Ok(options)
}

/// Settle the dependent feature flags.
///
/// Stories need both a component and a storybook setup. Asking for stories
/// while *explicitly* declining either parent is contradictory and fails;
/// asking for stories while a parent is off only by default downgrades
/// stories to off.
fn resolve_features(
    request: &LibraryRequest,
    unit_test_runner: UnitTestRunner,
) -> Result<Features, DomainError> {
    let storybook = request.storybook_configuration.unwrap_or(false);
    let generate_component = request.generate_component.unwrap_or(true);

    let generate_stories = match request.generate_stories {
        None => storybook && generate_component,
        Some(false) => false,
        Some(true) => {
            if request.generate_component == Some(false) {
                return Err(DomainError::ConflictingOptions {
                    option: "generate_stories",
                    requires: "generate_component",
                });
            }
            if request.storybook_configuration == Some(false) {
                return Err(DomainError::ConflictingOptions {
                    option: "generate_stories",
                    requires: "storybook_configuration",
                });
            }
            if !storybook {
                warn!("generate_stories requested without storybook_configuration; stories disabled");
            }
            storybook && generate_component
        }
    };

    Ok(Features {
        setup_vitest: unit_test_runner == UnitTestRunner::Vitest,
        generate_component,
        generate_stories,
        storybook,
    })
}
