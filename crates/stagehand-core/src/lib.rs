//! Stagehand Core - staged scaffolding for Qwik libraries
//!
//! This crate provides the domain and application layers of stagehand,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          stagehand-cli (CLI)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │  ScaffoldService / generators           │
//! │  Pipeline of units, deferred tasks      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │  Application ports (traits)             │
//! │  TemplateStore, DependencyRegistry,     │
//! │  Formatter, WorkspaceWriter, TreeBacking│
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │  stagehand-adapters (infrastructure)    │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │  Domain (pure logic)                    │
//! │  WorkspaceTree, options, templates,     │
//! │  project configuration                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stagehand_core::prelude::*;
//! # fn run(service: ScaffoldService, writer: &dyn WorkspaceWriter) -> StagehandResult<()> {
//! let mut tree = WorkspaceTree::new();
//! let plan = service.library(&mut tree, &LibraryRequest::new("my-lib"))?;
//! for change in &plan.changes {
//!     println!("{} {}", change.kind, change.path);
//! }
//! service.commit(plan, writer)?;
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ComponentRequest, Plan, ScaffoldService, StorybookRequest, Task,
        ports::{DependencyRegistry, DependencySet, Formatter, TemplateStore, TreeBacking, WorkspaceWriter},
    };
    pub use crate::domain::{
        ChangeKind, FileChange, LibraryRequest, Linter, NormalizedOptions, ProjectNameAndRootFormat,
        QwikCitySupport, Style, TemplateFile, TemplateId, TemplateSet, UnitTestRunner, WorkspacePath,
        WorkspaceTree,
    };
    pub use crate::error::{StagehandError, StagehandResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
