//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports, not
//! in scaffolding rules. Rule violations are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::{ErrorCategory, StagehandError};

/// Errors that occur while composing and running generator units.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A generator unit or deferred task failed. `position` is 1-based.
    #[error("Step {position} ({step}) failed: {source}")]
    CompositionFailure {
        position: usize,
        step: String,
        source: Box<StagehandError>,
    },

    /// A runner was asked to run twice.
    #[error("Task runner already finished")]
    RunnerFinished,

    /// Template store access failed.
    #[error("Template store error: {reason}")]
    TemplateStore { reason: String },

    /// Store lock poisoned.
    #[error("Template store lock poisoned")]
    StoreLockError,

    /// Durable storage operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Recording dependencies failed.
    #[error("Dependency registration failed: {reason}")]
    DependencyRegistration { reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CompositionFailure { step, source, .. } => {
                let mut out = vec![format!("The '{}' step stopped the run", step)];
                out.extend(source.suggestions());
                out
            }
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::DependencyRegistration { .. } => vec![
                "Files were written, but package.json was not updated".into(),
                "Add the dependencies by hand or re-run on a fresh checkout".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CompositionFailure { .. } => ErrorCategory::Composition,
            Self::TemplateStore { .. } => ErrorCategory::NotFound,
            Self::RunnerFinished
            | Self::StoreLockError
            | Self::FilesystemError { .. }
            | Self::DependencyRegistration { .. } => ErrorCategory::Internal,
        }
    }
}
