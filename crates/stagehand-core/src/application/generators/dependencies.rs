use std::sync::Arc;

use tracing::info;

use crate::application::generators::{GeneratorContext, GeneratorUnit};
use crate::application::ports::{DependencyRegistry, DependencySet};
use crate::application::scheduler::Task;
use crate::domain::{NormalizedOptions, WorkspaceTree};
use crate::error::StagehandResult;

pub const QWIK_VERSION: &str = "~1.2.6";
pub const QWIK_CITY_VERSION: &str = "~1.2.6";
pub const VITE_VERSION: &str = "~4.3.9";
pub const VITEST_VERSION: &str = "~0.32.0";
pub const ESLINT_PLUGIN_QWIK_VERSION: &str = "~1.2.6";
pub const STORYBOOK_VERSION: &str = "^7.0.26";
pub const STORYBOOK_FRAMEWORK_QWIK_VERSION: &str = "^0.2.0";

/// Packages every Qwik library needs, for the options it was built with.
pub fn common_dependencies(options: &NormalizedOptions) -> DependencySet {
    let mut set = DependencySet::new()
        .runtime("@builder.io/qwik", QWIK_VERSION)
        .dev("vite", VITE_VERSION);
    if options.setup_vitest() {
        set = set
            .dev("vitest", VITEST_VERSION)
            .dev("@vitest/coverage-v8", VITEST_VERSION);
    }
    if options.uses_eslint() {
        set = set.dev("eslint-plugin-qwik", ESLINT_PLUGIN_QWIK_VERSION);
    }
    set
}

/// Packages a storybook setup needs.
pub fn storybook_dependencies() -> DependencySet {
    DependencySet::new()
        .dev("@storybook/addon-essentials", STORYBOOK_VERSION)
        .dev("@storybook/builder-vite", STORYBOOK_VERSION)
        .dev("@storybook/html", STORYBOOK_VERSION)
        .dev("storybook", STORYBOOK_VERSION)
        .dev("storybook-framework-qwik", STORYBOOK_FRAMEWORK_QWIK_VERSION)
}

/// A task that records `set` with `registry` when run.
pub fn register_dependencies_task(
    name: &str,
    registry: Arc<dyn DependencyRegistry>,
    set: DependencySet,
) -> Task {
    Task::new(name, move || {
        info!(
            dependencies = set.dependencies.len(),
            dev_dependencies = set.dev_dependencies.len(),
            "registering dependencies"
        );
        registry.register(&set)
    })
}

/// Registers the shared Qwik dependency set once everything else is done.
pub struct CommonDependenciesUnit {
    registry: Arc<dyn DependencyRegistry>,
}

impl CommonDependenciesUnit {
    pub fn new(ctx: &GeneratorContext) -> Self {
        Self {
            registry: Arc::clone(&ctx.dependencies),
        }
    }
}

impl GeneratorUnit for CommonDependenciesUnit {
    fn name(&self) -> &'static str {
        "common-dependencies"
    }

    fn apply(&self, _tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        Ok(vec![register_dependencies_task(
            self.name(),
            Arc::clone(&self.registry),
            common_dependencies(options),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockDependencyRegistry;
    use crate::domain::{LibraryRequest, Linter, UnitTestRunner, normalize_library_options};

    fn options(linter: Linter, runner: UnitTestRunner) -> NormalizedOptions {
        let mut request = LibraryRequest::new("a");
        request.linter = Some(linter);
        request.unit_test_runner = Some(runner);
        normalize_library_options(&WorkspaceTree::new(), &request).unwrap()
    }

    #[test]
    fn set_tracks_options() {
        let full = common_dependencies(&options(Linter::EsLint, UnitTestRunner::Vitest));
        assert!(full.dependencies.contains_key("@builder.io/qwik"));
        assert!(full.dev_dependencies.contains_key("vitest"));
        assert!(full.dev_dependencies.contains_key("eslint-plugin-qwik"));

        let bare = common_dependencies(&options(Linter::None, UnitTestRunner::None));
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn task_registers_exactly_once_when_run() {
        let mut registry = MockDependencyRegistry::new();
        registry
            .expect_register()
            .withf(|set| set.dependencies.contains_key("@builder.io/qwik"))
            .times(1)
            .returning(|_| Ok(()));

        let task = register_dependencies_task(
            "deps",
            Arc::new(registry),
            common_dependencies(&options(Linter::EsLint, UnitTestRunner::Vitest)),
        );
        task.run().unwrap();
    }
}
