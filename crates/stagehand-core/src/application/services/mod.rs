//! Application services - orchestrate use cases.
//!
//! A scaffolding run is plan, then commit: generators stage edits in a
//! [`WorkspaceTree`](crate::domain::WorkspaceTree), the caller inspects the
//! resulting change list, and only an explicit commit reaches durable
//! storage and runs the deferred tasks.

pub mod scaffold_service;

pub use scaffold_service::{Plan, ScaffoldService};
