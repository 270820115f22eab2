//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Step not found: {0}")]
    StepNotFound(String),

    #[error("Step execution failed: {step} - {message}")]
    StepExecutionFailed { step: String, message: String },

    #[error("Pipeline validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Parallel branches in '{group}' both wrote key '{key}'")]
    MergeConflict { group: String, key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Create a step execution failure.
    pub fn step_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepExecutionFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
