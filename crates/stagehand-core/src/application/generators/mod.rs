//! Generator units and the generators composed from them.
//!
//! | Unit                      | Runs when                      | Tasks                    |
//! |---------------------------|--------------------------------|--------------------------|
//! | `scaffold-library`        | always                         | none                     |
//! | `storybook-configuration` | `storybook_configuration`      | storybook dev deps       |
//! | `component`               | `generate_component`           | none                     |
//! | `configure-vite`          | always                         | none                     |
//! | `configure-eslint`        | linter is ESLint               | none                     |
//! | `common-dependencies`     | always                         | one dependency set       |

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ports::{DependencyRegistry, Formatter, TemplateStore};
use crate::application::scheduler::Task;
use crate::domain::{NormalizedOptions, WorkspaceTree};
use crate::error::StagehandResult;

pub mod component;
pub mod dependencies;
pub mod eslint;
pub mod library;
pub mod storybook;
pub mod vite;

pub use component::{ComponentRequest, ComponentUnit, component_generator};
pub use dependencies::CommonDependenciesUnit;
pub use eslint::EslintUnit;
pub use library::{ScaffoldLibraryUnit, library_generator};
pub use storybook::{StorybookRequest, StorybookUnit, storybook_configuration_generator};
pub use vite::ViteUnit;

/// One atomic piece of scaffolding logic.
///
/// `apply` stages its edits directly in `tree` and returns the side
/// effects that must wait until the tree was committed. Applying the same
/// unit to two identical fresh trees yields identical results.
pub trait GeneratorUnit {
    fn name(&self) -> &'static str;

    fn apply(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>>;
}

/// Ports shared by every generator of a run.
#[derive(Clone)]
pub struct GeneratorContext {
    pub templates: Arc<dyn TemplateStore>,
    pub dependencies: Arc<dyn DependencyRegistry>,
    pub formatter: Arc<dyn Formatter>,
}

impl GeneratorContext {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        dependencies: Arc<dyn DependencyRegistry>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            templates,
            dependencies,
            formatter,
        }
    }
}

/// Run `formatter` over every staged text file.
///
/// Only content is touched; files the formatter does not handle and files
/// that are not UTF-8 are left as they are.
#[instrument(skip_all)]
pub fn format_files(tree: &mut WorkspaceTree, formatter: &dyn Formatter) -> StagehandResult<usize> {
    let mut changed = 0;
    for path in tree.written_files() {
        let Some(bytes) = tree.read(path.as_str())? else {
            continue;
        };
        let Ok(text) = String::from_utf8(bytes) else {
            continue;
        };
        if let Some(formatted) = formatter.format(&path, &text) {
            if formatted != text {
                tree.write(path.as_str(), formatted)?;
                changed += 1;
            }
        }
    }
    debug!(changed, "files formatted");
    Ok(changed)
}
