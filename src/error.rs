//! Domain errors
//!
//! Every failure a learner can trigger is one of these variants. None of them
//! is fatal: callers turn them into an inline message, a redirect, or an HTTP
//! status.

use serde::Serialize;

use crate::routes::Route;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TutorError {
    /// Form input rejected; all offending fields are reported together
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// A step name outside topic/flashcards/video/quiz/analysis
    #[error("unknown learning step '{0}'")]
    UnknownStep(String),

    #[error("unknown topic '{0}'")]
    UnknownTopic(String),

    /// A prerequisite is missing; the caller should navigate instead
    #[error("redirect to {0}")]
    Redirect(Route),

    /// A VR hotspot whose feature is still locked
    #[error("'{0}' is locked")]
    Locked(String),
}

impl TutorError {
    /// Shorthand for a single-field validation error
    pub fn invalid(field: &str, message: &str) -> Self {
        TutorError::Validation(vec![FieldError::new(field, message)])
    }

    /// Field errors, empty for non-validation variants
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            TutorError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
