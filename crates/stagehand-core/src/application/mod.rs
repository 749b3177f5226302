//! Application layer for stagehand.
//!
//! This layer contains:
//! - **Generators**: the generator units and the library, component and
//!   storybook generators composed from them
//! - **Scheduler**: ordered unit execution and deferred task running
//! - **Services**: plan/commit orchestration (`ScaffoldService`)
//! - **Ports**: traits for external collaborators
//! - **Errors**: orchestration and port failures
//!
//! Scaffolding rules live in `crate::domain`; this layer decides which of
//! them run and in what order.

pub mod error;
pub mod generators;
pub mod ports;
pub mod scheduler;
pub mod services;

pub use generators::{
    ComponentRequest, GeneratorContext, GeneratorUnit, StorybookRequest, component_generator,
    format_files, library_generator, storybook_configuration_generator,
};
pub use scheduler::{Pipeline, RunState, SerialRunner, Task, run_tasks_in_serial};
pub use services::{Plan, ScaffoldService};

pub use ports::{
    DependencyRegistry, DependencySet, Formatter, TemplateStore, TreeBacking, WorkspaceWriter,
};

pub use error::ApplicationError;
