//! Workspace storage adapters.
//!
//! Each adapter is both the read side of a tree ([`TreeBacking`]) and the
//! commit target for its change list ([`WorkspaceWriter`]).
//!
//! [`TreeBacking`]: stagehand_core::application::ports::TreeBacking
//! [`WorkspaceWriter`]: stagehand_core::application::ports::WorkspaceWriter

mod local;
mod memory;

pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;
