//! Composition scheduler.
//!
//! Generator units run strictly in order against one tree ([`Pipeline`]);
//! the deferred tasks they return are run strictly in order after the tree
//! was committed ([`SerialRunner`], [`run_tasks_in_serial`]). Both stop at
//! the first failure and report its 1-based position as
//! [`ApplicationError::CompositionFailure`].
//!
//! ```text
//!   Idle ──run──▶ Running(1) ─▶ Running(2) ─▶ … ─▶ Completed
//!                     │             │
//!                     └─────────────┴──error──▶ Failed(i)
//! ```
//!
//! There is no transition out of `Completed` or `Failed`: a failed run is
//! retried by starting over from a fresh tree.

use std::fmt;

use tracing::{debug, error, info_span, instrument};

use crate::application::ApplicationError;
use crate::application::generators::GeneratorUnit;
use crate::domain::{NormalizedOptions, WorkspaceTree};
use crate::error::{StagehandError, StagehandResult};

/// A deferred side effect registered during planning.
pub struct Task {
    name: String,
    run: Box<dyn FnOnce() -> StagehandResult<()> + Send>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        run: impl FnOnce() -> StagehandResult<()> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    /// A task that does nothing.
    pub fn noop(name: impl Into<String>) -> Self {
        Self::new(name, || Ok(()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume and execute the task.
    pub fn run(self) -> StagehandResult<()> {
        (self.run)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Runner state. Positions are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(usize),
    Completed,
    Failed(usize),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Runs tasks one after another, stopping at the first failure.
#[derive(Debug)]
pub struct SerialRunner {
    tasks: Vec<Task>,
    state: RunState,
}

impl SerialRunner {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task in registration order.
    ///
    /// Each task finishes before the next starts. The first error moves the
    /// runner to `Failed(i)` and is returned wrapped as a composition
    /// failure at position `i`; later tasks are dropped without running.
    pub fn run(&mut self) -> StagehandResult<()> {
        if self.state != RunState::Idle {
            return Err(ApplicationError::RunnerFinished.into());
        }

        let tasks = std::mem::take(&mut self.tasks);
        let total = tasks.len();
        for (index, task) in tasks.into_iter().enumerate() {
            let position = index + 1;
            self.state = RunState::Running(position);
            let name = task.name.clone();
            let _span = info_span!("task", position, total, name = %name).entered();

            if let Err(source) = task.run() {
                error!(position, task = %name, error = %source, "task failed");
                self.state = RunState::Failed(position);
                return Err(composition_failure(position, name, source));
            }
            debug!(position, task = %name, "task completed");
        }

        self.state = RunState::Completed;
        Ok(())
    }
}

/// Fold `tasks` into one task that runs them in order, fail-fast.
pub fn run_tasks_in_serial(name: impl Into<String>, tasks: Vec<Task>) -> Task {
    Task::new(name, move || SerialRunner::new(tasks).run())
}

/// An ordered list of generator units applied to one tree.
#[derive(Default)]
pub struct Pipeline<'a> {
    units: Vec<Box<dyn GeneratorUnit + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    pub fn then(mut self, unit: impl GeneratorUnit + 'a) -> Self {
        self.units.push(Box::new(unit));
        self
    }

    /// Add `unit` only when `enabled`.
    pub fn then_if(self, enabled: bool, unit: impl GeneratorUnit + 'a) -> Self {
        if enabled { self.then(unit) } else { self }
    }

    pub fn unit_names(&self) -> Vec<&'static str> {
        self.units.iter().map(|u| u.name()).collect()
    }

    /// Apply every unit in order and collect their tasks.
    ///
    /// Each unit sees every earlier unit's writes. A failing unit stops the
    /// pipeline; writes staged by earlier units stay in the tree, which the
    /// caller is expected to discard.
    #[instrument(skip_all, fields(project = %options.project_name, units = self.units.len()))]
    pub fn run(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        let mut tasks = Vec::new();
        for (index, unit) in self.units.iter().enumerate() {
            let position = index + 1;
            let _span = info_span!("unit", position, name = unit.name()).entered();
            match unit.apply(tree, options) {
                Ok(mut unit_tasks) => {
                    debug!(tasks = unit_tasks.len(), "unit applied");
                    tasks.append(&mut unit_tasks);
                }
                Err(source) => {
                    error!(position, unit = unit.name(), error = %source, "unit failed");
                    return Err(composition_failure(position, unit.name().to_string(), source));
                }
            }
        }
        Ok(tasks)
    }
}

fn composition_failure(position: usize, step: String, source: StagehandError) -> StagehandError {
    ApplicationError::CompositionFailure {
        position,
        step,
        source: Box::new(source),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::sync::{Arc, Mutex};

    fn recording(log: &Arc<Mutex<Vec<usize>>>, id: usize, fail: bool) -> Task {
        let log = Arc::clone(log);
        Task::new(format!("task-{id}"), move || {
            log.lock().unwrap().push(id);
            if fail {
                Err(DomainError::validation("task", format!("task {id} failed")).into())
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = (1..=4).map(|i| recording(&log, i, false)).collect();
        let mut runner = SerialRunner::new(tasks);
        assert_eq!(runner.state(), RunState::Idle);

        runner.run().unwrap();
        assert_eq!(runner.state(), RunState::Completed);
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn third_of_five_failing_stops_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = (1..=5).map(|i| recording(&log, i, i == 3)).collect();
        let mut runner = SerialRunner::new(tasks);

        let err = runner.run().unwrap_err();
        assert_eq!(runner.state(), RunState::Failed(3));
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        match err {
            StagehandError::Application(ApplicationError::CompositionFailure { position, step, source }) => {
                assert_eq!(position, 3);
                assert_eq!(step, "task-3");
                assert!(matches!(*source, StagehandError::Domain(DomainError::Validation { .. })));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn finished_runner_cannot_run_again() {
        let mut runner = SerialRunner::new(vec![Task::noop("a")]);
        runner.run().unwrap();
        assert!(runner.state().is_terminal());
        assert!(matches!(
            runner.run(),
            Err(StagehandError::Application(ApplicationError::RunnerFinished))
        ));
    }

    #[test]
    fn combined_task_defers_until_invoked() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let combined = run_tasks_in_serial("all", vec![recording(&log, 1, false), recording(&log, 2, false)]);
        assert!(log.lock().unwrap().is_empty());
        combined.run().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn empty_composition_completes() {
        run_tasks_in_serial("none", Vec::new()).run().unwrap();
    }

    struct Unit {
        name: &'static str,
        fail: bool,
    }

    impl GeneratorUnit for Unit {
        fn name(&self) -> &'static str {
            self.name
        }

        fn apply(&self, tree: &mut WorkspaceTree, _options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
            if self.fail {
                return Err(DomainError::validation("unit", "boom").into());
            }
            tree.write(&format!("{}.txt", self.name), self.name)?;
            Ok(vec![Task::noop(self.name)])
        }
    }

    fn options(tree: &WorkspaceTree) -> NormalizedOptions {
        crate::domain::normalize_library_options(tree, &crate::domain::LibraryRequest::new("a")).unwrap()
    }

    #[test]
    fn pipeline_collects_tasks_in_unit_order() {
        let mut tree = WorkspaceTree::new();
        let opts = options(&tree);
        let pipeline = Pipeline::new()
            .then(Unit { name: "one", fail: false })
            .then_if(false, Unit { name: "skipped", fail: false })
            .then(Unit { name: "two", fail: false });

        assert_eq!(pipeline.unit_names(), vec!["one", "two"]);
        let tasks = pipeline.run(&mut tree, &opts).unwrap();
        let names: Vec<&str> = tasks.iter().map(Task::name).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert!(!tree.exists("skipped.txt").unwrap());
    }

    #[test]
    fn pipeline_reports_failing_unit_position() {
        let mut tree = WorkspaceTree::new();
        let opts = options(&tree);
        let pipeline = Pipeline::new()
            .then(Unit { name: "one", fail: false })
            .then(Unit { name: "two", fail: true })
            .then(Unit { name: "three", fail: false });

        let err = pipeline.run(&mut tree, &opts).unwrap_err();
        assert_eq!(err.failing_steps(), vec![(2, "two")]);
        assert!(!tree.exists("three.txt").unwrap());
    }
}
