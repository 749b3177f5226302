//! Core domain layer for stagehand.
//!
//! Pure, synchronous scaffolding logic. Every read and write goes through
//! the in-memory [`WorkspaceTree`]; durable storage is reached only via the
//! [`TreeBacking`] port on the read side and through application ports on
//! the write side.
//!
//! ## Layout
//!
//! - `entities`: workspace paths, the virtual tree, project records, template sets
//! - `options`: request normalization
//! - `names`: identifier casing
//! - `workspace`: workspace files read and written through the tree

pub mod entities;
pub mod error;
pub mod names;
pub mod options;
pub mod value_objects;
pub mod workspace;

mod validation;

pub use entities::{
    path::{WorkspacePath, join_path_fragments, offset_from_root},
    project::{PROJECT_FILE, ProjectConfiguration, TargetConfiguration, merge_json},
    template::{
        RenderedFile, TemplateContent, TemplateContext, TemplateFile, TemplateId, TemplateSet,
        TemplateSource, TemplateValue, generate_files, render_path, render_str,
    },
    tree::{ChangeKind, ChangeRecord, FileChange, TreeBacking, TreeOperation, WorkspaceTree},
};

pub use error::{DomainError, ErrorCategory};
pub use names::Names;
pub use options::{Features, LibraryRequest, NormalizedOptions, normalize_library_options};
pub use validation::DomainValidator;
pub use value_objects::{
    Linter, ProjectNameAndRootFormat, ProjectType, QwikCitySupport, Style, UnitTestRunner,
};
pub use workspace::WorkspaceLayout;
