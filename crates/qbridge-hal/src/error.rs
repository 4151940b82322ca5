//! Error types for the HAL crate.
//!
//! Only the first group of variants ever escapes a bridge call: they are
//! structural problems found before anything is submitted. The rest are
//! raised inside adapters and end up recorded in an
//! [`ExecutionResult`](crate::ExecutionResult) instead.

use qbridge_ir::ValidationError;
use thiserror::Error;

use crate::provider::Provider;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Malformed circuit.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A gate kind has no mapping on the selected provider.
    #[error("Gate '{gate}' is not supported by provider {provider}")]
    UnsupportedGate {
        /// Name of the gate.
        gate: String,
        /// Provider that rejected it.
        provider: Provider,
    },

    /// Required vendor support or configuration is absent.
    #[error("Adapter unavailable: {0}")]
    AdapterUnavailable(String),

    /// Circuit exceeds backend capabilities.
    #[error("Circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Job submission failed.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Whether this error is a structural problem detected before submission.
    pub fn is_pre_submission(&self) -> bool {
        matches!(
            self,
            HalError::Validation(_)
                | HalError::UnsupportedGate { .. }
                | HalError::AdapterUnavailable(_)
                | HalError::CircuitTooLarge(_)
                | HalError::Configuration(_)
        )
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
