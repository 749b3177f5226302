//! Application ports (traits) for external collaborators.
//!
//! The core never performs durable I/O itself. Adapters in
//! `stagehand-adapters` implement these traits.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the core, implemented by infrastructure
//!   - `TreeBacking`: read-only view of the real workspace
//!   - `WorkspaceWriter`: applies a finalized change list
//!   - `TemplateStore`: template set lookup
//!   - `DependencyRegistry`: records package requirements at commit time
//!   - `Formatter`: cosmetic normalization before commit

pub mod output;

pub use output::{
    DependencyRegistry, DependencySet, Formatter, TemplateStore, TreeBacking, WorkspaceWriter,
};

#[cfg(test)]
pub use output::MockDependencyRegistry;
