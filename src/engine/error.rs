use thiserror::Error;

use crate::browser::error::BrowserError;

/// Everything that can stop a step.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Unsupported selector type: {0}")]
    UnsupportedSelectorKind(String),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// The action needs an element and none was resolvable
    #[error("Step '{step}' requires a locator: {reason}")]
    MissingLocator { step: String, reason: String },

    #[error("{context} requires a '{field}' key")]
    MissingRequiredField { field: String, context: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Step '{0}' sets both 'iterate' and 'iterativeGroup'")]
    ConflictingIteration(String),

    #[error("Invalid embedded content for file '{name}': {reason}")]
    InvalidFileContent { name: String, reason: String },

    #[error("Element '{0}' is not fillable and contains no visible fillable element")]
    NotFillable(String),

    #[error("Upload step '{0}' has no files to set")]
    NoFilesProvided(String),

    #[error("No custom handler registered under '{0}'")]
    PluginNotFound(String),

    #[error("{0}")]
    AssertionFailed(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl StepError {
    /// Configuration errors describe a broken scenario rather than a broken
    /// page, and are never softened by `soft: true`.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StepError::UnsupportedSelectorKind(_)
                | StepError::UnsupportedAction(_)
                | StepError::MissingLocator { .. }
                | StepError::MissingRequiredField { .. }
                | StepError::InvalidPattern { .. }
                | StepError::ConflictingIteration(_)
                | StepError::InvalidFileContent { .. }
                | StepError::PluginNotFound(_)
        )
    }

    pub(crate) fn missing(field: &str, context: impl Into<String>) -> Self {
        StepError::MissingRequiredField {
            field: field.to_string(),
            context: context.into(),
        }
    }
}
