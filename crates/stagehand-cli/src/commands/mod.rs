//! Command handlers.
//!
//! Every generator command follows the same flow: open the workspace, plan
//! against a tree backed by it, print the change list, then commit unless
//! this is a dry run.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use stagehand_adapters::{
    InMemoryStore, LocalFilesystem, PackageJsonRegistry, RecordingRegistry, WhitespaceFormatter,
    builtin_templates,
};
use stagehand_core::application::{DependencyRegistry, Plan, ScaffoldService};
use stagehand_core::domain::{ChangeKind, WorkspaceTree};

use crate::cli::GlobalArgs;
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output::OutputManager;

pub mod completions;
pub mod component;
pub mod library;
pub mod storybook;

/// Adapters wired for one run against one workspace directory.
pub struct Workspace {
    root: PathBuf,
    filesystem: Arc<LocalFilesystem>,
    /// Set for dry runs: deferred work records packages instead of
    /// touching `package.json`.
    recorder: Option<RecordingRegistry>,
    service: ScaffoldService,
}

impl Workspace {
    #[instrument(skip_all, fields(dry_run = dry_run))]
    pub fn open(global: &GlobalArgs, config: &AppConfig, dry_run: bool) -> CliResult<Self> {
        let root = match &global.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        if !root.is_dir() {
            return Err(CliError::WorkspaceNotFound { path: root });
        }

        let store = InMemoryStore::with_builtin()?;
        let configured = config.templates.local_path.as_ref().map(|path| root.join(path));
        for dir in configured.into_iter().chain(builtin_templates::override_dir()) {
            let sets = store.overlay_dir(&dir)?;
            debug!(dir = %dir.display(), sets, "template overlay");
        }

        let recorder = dry_run.then(RecordingRegistry::new);
        let dependencies: Arc<dyn DependencyRegistry> = match &recorder {
            Some(recorder) => Arc::new(recorder.clone()),
            None => Arc::new(PackageJsonRegistry::new(&root)),
        };

        info!(root = %root.display(), "workspace opened");
        Ok(Self {
            filesystem: Arc::new(LocalFilesystem::new(&root)),
            root,
            recorder,
            service: ScaffoldService::new(Arc::new(store), dependencies, Arc::new(WhitespaceFormatter::new())),
        })
    }

    pub fn service(&self) -> &ScaffoldService {
        &self.service
    }

    /// A fresh tree reading through to the workspace directory.
    pub fn tree(&self) -> WorkspaceTree {
        WorkspaceTree::with_backing(self.filesystem.clone())
    }

    /// Print the plan, then commit it or, on a dry run, preview its
    /// deferred work.
    pub fn finish(self, plan: Plan, output: &OutputManager) -> CliResult<()> {
        let dry_run = self.recorder.is_some();
        output.changes(&plan.changes, dry_run)?;

        if let Some(recorder) = &self.recorder {
            plan.task.run()?;
            output.dependencies(&recorder.sets())?;
            output.warning("Dry run: no files were written")?;
            return Ok(());
        }

        let summary = format!(
            "{} created, {} updated, {} deleted in {}",
            plan.count(ChangeKind::Create),
            plan.count(ChangeKind::Update),
            plan.count(ChangeKind::Delete),
            self.root.display()
        );
        self.service.commit(plan, self.filesystem.as_ref())?;
        output.success(&summary)?;
        Ok(())
    }
}
