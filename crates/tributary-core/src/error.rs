//! Error types for the pipeline document and its transform chain.
//!
//! Two layers are distinguished:
//! - [`TransformError`] is what a single step returns when it cannot
//!   produce a document.
//! - [`PipelineError`] is what callers of the chain see. A step failure is
//!   wrapped together with the name of the step that produced it.
//!
//! # Example
//!
//! ```
//! use tributary_core::{PipelineError, TransformError};
//!
//! let error = PipelineError::step_failed("injectSecret", TransformError::secret_not_found("token"));
//! assert_eq!(error.failed_step(), Some("injectSecret"));
//! assert!(error.to_string().contains("injectSecret"));
//! ```

use thiserror::Error;

/// Failure reported by an individual transform step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A container requested a secret that is not available.
    #[error("secret not found: {name}")]
    SecretNotFound {
        /// Name of the missing secret
        name: String,
    },

    /// The document does not satisfy a structural rule.
    #[error("invalid value for '{field}': {message}")]
    Validation {
        /// Document field that failed validation
        field: String,
        /// Description of the failure
        message: String,
    },

    /// Any other step-specific failure.
    #[error("{0}")]
    Other(String),
}

impl TransformError {
    /// Creates a SecretNotFound error.
    pub fn secret_not_found(name: impl Into<String>) -> Self {
        Self::SecretNotFound { name: name.into() }
    }

    /// Creates a Validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an Other error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Errors produced while reading or transforming a pipeline document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document could not be parsed.
    #[error("failed to parse pipeline configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A transform step failed; the partially transformed document was discarded.
    #[error("transform step '{step}' failed: {cause}")]
    TransformStepFailed {
        /// Registered name of the failing step
        step: String,
        /// What the step reported
        #[source]
        cause: TransformError,
    },
}

impl PipelineError {
    /// Creates a TransformStepFailed error.
    pub fn step_failed(step: impl Into<String>, cause: TransformError) -> Self {
        Self::TransformStepFailed {
            step: step.into(),
            cause,
        }
    }

    /// Returns the name of the failing step, if this is a step failure.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::TransformStepFailed { step, .. } => Some(step),
            Self::Parse(_) => None,
        }
    }

    /// Returns the step cause, if this is a step failure.
    pub fn cause(&self) -> Option<&TransformError> {
        match self {
            Self::TransformStepFailed { cause, .. } => Some(cause),
            Self::Parse(_) => None,
        }
    }
}

/// Type alias for Results with PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;
