//! Unified error handling for stagehand-core.
//!
//! [`StagehandError`] wraps domain and application errors so every public
//! operation returns one type with suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for stagehand-core operations.
#[derive(Debug, Error, Clone)]
pub enum StagehandError {
    /// Scaffolding rule violations: options, boundaries, templates.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Composition and port failures.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StagehandError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in stagehand".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Boundary => ErrorCategory::Boundary,
                crate::domain::ErrorCategory::Template => ErrorCategory::Template,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// The innermost error, looking through composition failures.
    pub fn root_cause(&self) -> &StagehandError {
        match self {
            Self::Application(ApplicationError::CompositionFailure { source, .. }) => source.root_cause(),
            other => other,
        }
    }

    /// 1-based positions of the failing steps, outermost first.
    pub fn failing_steps(&self) -> Vec<(usize, &str)> {
        let mut steps = Vec::new();
        let mut current = self;
        while let Self::Application(ApplicationError::CompositionFailure { position, step, source }) = current {
            steps.push((*position, step.as_str()));
            current = source.as_ref();
        }
        steps
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Boundary,
    Template,
    Composition,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StagehandResult<T> = Result<T, StagehandError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped() -> StagehandError {
        let inner: StagehandError = DomainError::validation("name", "empty").into();
        let middle: StagehandError = ApplicationError::CompositionFailure {
            position: 3,
            step: "component".into(),
            source: Box::new(inner),
        }
        .into();
        ApplicationError::CompositionFailure {
            position: 1,
            step: "library".into(),
            source: Box::new(middle),
        }
        .into()
    }

    #[test]
    fn root_cause_looks_through_composition() {
        let err = wrapped();
        assert_eq!(err.category(), ErrorCategory::Composition);
        assert_eq!(err.root_cause().category(), ErrorCategory::Validation);
    }

    #[test]
    fn failing_steps_are_listed_outermost_first() {
        assert_eq!(wrapped().failing_steps(), vec![(1, "library"), (3, "component")]);
    }

    #[test]
    fn composition_message_names_step_and_position() {
        let msg = wrapped().to_string();
        assert!(msg.starts_with("Step 1 (library) failed"));
        assert!(msg.contains("Step 3 (component) failed"));
    }
}
