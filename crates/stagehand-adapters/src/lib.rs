//! Infrastructure adapters for stagehand.
//!
//! This crate implements the ports defined in
//! `stagehand_core::application::ports`. It contains every durable I/O
//! operation stagehand performs.

pub mod builtin_templates;
pub mod dependencies;
pub mod filesystem;
pub mod formatter;
pub mod template_loader;
pub mod template_store;

// Re-export commonly used adapters
pub use dependencies::{PackageJsonRegistry, RecordingRegistry};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use formatter::WhitespaceFormatter;
pub use template_loader::FilesystemTemplateLoader;
pub use template_store::InMemoryStore;
