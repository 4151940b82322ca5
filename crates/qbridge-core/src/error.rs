//! Errors that abort a bridge call.
//!
//! Everything here is raised before a job is submitted, so no receipt
//! exists when one of these is returned. Failures after submission are
//! recorded in the receipt instead.

use qbridge_hal::{HalError, Provider};
use qbridge_ir::ValidationError;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Fatal, pre-submission errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed circuit.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A gate has no mapping on the selected provider.
    #[error("Gate '{gate}' is not supported by provider {provider}")]
    UnsupportedGate { gate: String, provider: Provider },

    /// Vendor support is compiled out or its configuration is incomplete.
    #[error("Adapter unavailable: {0}")]
    AdapterUnavailable(String),

    /// Circuit is wider than the provider accepts.
    #[error("Circuit too large: {0}")]
    CircuitTooLarge(String),

    /// Shot count is zero.
    #[error("Invalid shots: {0} (must be at least 1)")]
    InvalidShots(u32),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<HalError> for BridgeError {
    fn from(e: HalError) -> Self {
        match e {
            HalError::Validation(err) => BridgeError::Validation(err),
            HalError::UnsupportedGate { gate, provider } => {
                BridgeError::UnsupportedGate { gate, provider }
            }
            HalError::AdapterUnavailable(msg) => BridgeError::AdapterUnavailable(msg),
            HalError::CircuitTooLarge(msg) => BridgeError::CircuitTooLarge(msg),
            HalError::Configuration(msg) => BridgeError::Config(msg),
            // Adapter construction failures (bad token header, TLS setup)
            // also leave the vendor unusable.
            other => BridgeError::AdapterUnavailable(other.to_string()),
        }
    }
}
