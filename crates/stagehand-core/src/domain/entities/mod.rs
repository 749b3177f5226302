pub mod path;
pub mod project;
pub mod template;
pub mod tree;

pub use crate::domain::DomainError;
pub use path::WorkspacePath;
pub use project::{ProjectConfiguration, TargetConfiguration};
pub use template::{TemplateContext, TemplateSet};
pub use tree::{FileChange, WorkspaceTree};
