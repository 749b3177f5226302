// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (a composed run may surface the same failure twice: once from
///   the failing step and once wrapped in its composition position)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (bad or incompatible request options)
    // ========================================================================
    #[error("Invalid option '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Conflicting options: '{option}' requires '{requires}', which was explicitly disabled")]
    ConflictingOptions {
        option: &'static str,
        requires: &'static str,
    },

    #[error("Project '{name}' already exists")]
    ProjectExists { name: String },

    #[error("Import path '{import_path}' is already mapped in {file}")]
    ImportPathInUse { import_path: String, file: String },

    #[error("File already exists: {path}")]
    FileExists { path: String },

    // ========================================================================
    // Boundary Errors (computed paths escaping their subtree)
    // ========================================================================
    #[error("Path '{path}' escapes the boundary '{boundary}'")]
    BoundaryViolation { path: String, boundary: String },

    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("Template '{template}' failed at {location}: {reason}")]
    Template {
        template: String,
        location: String,
        reason: String,
    },

    #[error("Template set not found: {id}")]
    TemplateNotFound { id: String },

    // ========================================================================
    // Workspace records
    // ========================================================================
    #[error("Project '{name}' not found in workspace")]
    ProjectNotFound { name: String },

    #[error("Cannot find file in tree: {path}")]
    FileNotFound { path: String },

    #[error("Malformed JSON in {path}: {reason}")]
    MalformedJson { path: String, reason: String },
}

impl DomainError {
    /// Shorthand for a [`DomainError::Validation`].
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`DomainError::Template`].
    pub fn template(
        template: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Template {
            template: template.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation { field, reason } => vec![
                format!("Check the value passed for '{}'", field),
                format!("Details: {}", reason),
            ],
            Self::ConflictingOptions { option, requires } => vec![
                format!("'{}' cannot be enabled while '{}' is disabled", option, requires),
                format!("Enable '{}' or drop '{}'", requires, option),
            ],
            Self::ProjectExists { name } => vec![
                format!("A project named '{}' is already registered", name),
                "Choose a different name or directory".into(),
            ],
            Self::ImportPathInUse { import_path, .. } => vec![
                format!("'{}' is already mapped to another project", import_path),
                "Pass a different --import-path".into(),
            ],
            Self::BoundaryViolation { boundary, .. } => vec![
                format!("Generated paths must stay inside '{}'", boundary),
                "Remove '..' segments from names and directories".into(),
            ],
            Self::Template { template, .. } => vec![
                format!("Template set '{}' is malformed or incomplete", template),
                "Check the template placeholders and conditional blocks".into(),
            ],
            Self::TemplateNotFound { id } => vec![
                format!("No template set named '{}' is registered", id),
                "Check templates.local_path in your configuration".into(),
            ],
            Self::ProjectNotFound { name } => vec![
                format!("No project.json declares the name '{}'", name),
                "Create the project first with `stagehand library`".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. }
            | Self::ConflictingOptions { .. }
            | Self::ProjectExists { .. }
            | Self::ImportPathInUse { .. }
            | Self::FileExists { .. } => ErrorCategory::Validation,
            Self::BoundaryViolation { .. } => ErrorCategory::Boundary,
            Self::Template { .. } => ErrorCategory::Template,
            Self::TemplateNotFound { .. }
            | Self::ProjectNotFound { .. }
            | Self::FileNotFound { .. } => ErrorCategory::NotFound,
            Self::MalformedJson { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Boundary,
    Template,
    NotFound,
    Internal,
}
