//! Scaffold Service - main application orchestrator.
//!
//! 1. Run a generator against a tree
//! 2. Collapse the tree into its change list
//! 3. On commit, hand the changes to a [`WorkspaceWriter`] and then run
//!    the combined deferred task

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::application::generators::{
    ComponentRequest, GeneratorContext, StorybookRequest, component_generator, library_generator,
    storybook_configuration_generator,
};
use crate::application::ports::{DependencyRegistry, Formatter, TemplateStore, WorkspaceWriter};
use crate::application::scheduler::Task;
use crate::domain::{ChangeKind, FileChange, LibraryRequest, WorkspaceTree};
use crate::error::StagehandResult;

/// Finalized edits of one run plus the work deferred until they are
/// committed.
#[derive(Debug)]
pub struct Plan {
    pub changes: Vec<FileChange>,
    pub task: Task,
}

impl Plan {
    fn from_tree(tree: &WorkspaceTree, task: Task) -> Self {
        Self {
            changes: tree.list_changes(),
            task,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes of `kind`.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

/// Main scaffolding service.
///
/// Holds the ports every generator needs; each call takes the tree it
/// plans against, so one service can serve many runs.
pub struct ScaffoldService {
    ctx: GeneratorContext,
}

impl ScaffoldService {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        dependencies: Arc<dyn DependencyRegistry>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            ctx: GeneratorContext::new(templates, dependencies, formatter),
        }
    }

    pub fn context(&self) -> &GeneratorContext {
        &self.ctx
    }

    /// Plan a new library.
    #[instrument(skip_all, fields(name = %request.name))]
    pub fn library(&self, tree: &mut WorkspaceTree, request: &LibraryRequest) -> StagehandResult<Plan> {
        let task = library_generator(tree, &self.ctx, request)?;
        Ok(Plan::from_tree(tree, task))
    }

    /// Plan a component inside an existing project.
    #[instrument(skip_all, fields(name = %request.name, project = %request.project))]
    pub fn component(&self, tree: &mut WorkspaceTree, request: &ComponentRequest) -> StagehandResult<Plan> {
        let task = component_generator(tree, &self.ctx, request)?;
        Ok(Plan::from_tree(tree, task))
    }

    /// Plan a storybook setup for an existing project.
    #[instrument(skip_all, fields(project = %request.project))]
    pub fn storybook(&self, tree: &mut WorkspaceTree, request: &StorybookRequest) -> StagehandResult<Plan> {
        let task = storybook_configuration_generator(tree, &self.ctx, request)?;
        Ok(Plan::from_tree(tree, task))
    }

    /// Write `plan` through `writer`, then run its deferred task.
    ///
    /// A failed write leaves the task unrun. A failed task does not undo
    /// the write.
    #[instrument(skip_all, fields(changes = plan.changes.len()))]
    pub fn commit(&self, plan: Plan, writer: &dyn WorkspaceWriter) -> StagehandResult<()> {
        if plan.is_empty() {
            warn!("nothing to write");
        } else {
            writer.commit(&plan.changes)?;
            info!(
                created = plan.count(ChangeKind::Create),
                updated = plan.count(ChangeKind::Update),
                deleted = plan.count(ChangeKind::Delete),
                "changes committed"
            );
        }
        plan.task.run()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::application::ports::{DependencySet, MockDependencyRegistry};
    use crate::domain::{TemplateFile, TemplateId, TemplateSet, WorkspacePath};

    struct Sets;

    impl TemplateStore for Sets {
        fn get(&self, id: &TemplateId) -> StagehandResult<TemplateSet> {
            Ok(match id.as_str() {
                "library" => TemplateSet::new(
                    "library",
                    vec![
                        TemplateFile::parameterized("README.md__tmpl__", "# {{projectName}}\n"),
                        TemplateFile::literal("src/index.ts", ""),
                    ],
                ),
                "component" => TemplateSet::new(
                    "component",
                    vec![TemplateFile::parameterized(
                        "__fileName__.tsx__tmpl__",
                        "export const {{className}} = 1;\n",
                    )],
                ),
                other => TemplateSet::new(other, Vec::new()),
            })
        }

        fn list(&self) -> StagehandResult<Vec<TemplateId>> {
            Ok(vec![TemplateId::new("library"), TemplateId::new("component")])
        }

        fn insert(&self, _set: TemplateSet) -> StagehandResult<()> {
            Ok(())
        }
    }

    struct Identity;

    impl Formatter for Identity {
        fn format(&self, _path: &WorkspacePath, _content: &str) -> Option<String> {
            None
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl WorkspaceWriter for Recorder {
        fn commit(&self, changes: &[FileChange]) -> StagehandResult<()> {
            let mut seen = self.0.lock().unwrap();
            seen.extend(changes.iter().map(|c| c.path.to_string()));
            Ok(())
        }
    }

    fn service(registry: MockDependencyRegistry) -> ScaffoldService {
        ScaffoldService::new(Arc::new(Sets), Arc::new(registry), Arc::new(Identity))
    }

    #[test]
    fn planning_registers_nothing_and_commit_registers_once() {
        let mut registry = MockDependencyRegistry::new();
        registry
            .expect_register()
            .withf(|set: &DependencySet| set.dependencies.contains_key("@builder.io/qwik"))
            .times(1)
            .returning(|_| Ok(()));
        let service = service(registry);

        let mut tree = WorkspaceTree::new();
        let plan = service.library(&mut tree, &LibraryRequest::new("my-lib")).unwrap();
        assert!(plan.count(ChangeKind::Create) > 0);
        assert_eq!(plan.count(ChangeKind::Delete), 0);

        let writer = Recorder::default();
        service.commit(plan, &writer).unwrap();
        let written = writer.0.lock().unwrap();
        assert!(written.iter().any(|p| p == "libs/my-lib/README.md"));
        assert!(written.iter().any(|p| p == "libs/my-lib/src/lib/my-lib.tsx"));
    }

    #[test]
    fn failed_planning_returns_no_plan() {
        let service = service(MockDependencyRegistry::new());
        let mut tree = WorkspaceTree::new();
        assert!(service.library(&mut tree, &LibraryRequest::new("")).is_err());
        assert!(tree.list_changes().is_empty());
    }
}
