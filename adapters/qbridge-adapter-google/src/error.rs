//! Error types for the Google Quantum Engine adapter.

use qbridge_hal::HalError;
use thiserror::Error;

/// Result type for Google Quantum Engine operations.
pub type GoogleResult<T> = Result<T, GoogleError>;

/// Errors that can occur when using Google Quantum Engine.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// A required setting is absent.
    #[error("Google Quantum Engine {0} not configured. Set GOOGLE_QUANTUM_PROJECT and GOOGLE_QUANTUM_TOKEN.")]
    MissingCredentials(&'static str),

    /// Token rejected or not usable as a header value.
    #[error("Invalid Google Quantum Engine token")]
    InvalidToken,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("Quantum Engine API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Result document did not have the expected shape.
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<GoogleError> for HalError {
    fn from(e: GoogleError) -> Self {
        match e {
            GoogleError::MissingCredentials(_) => HalError::AdapterUnavailable(e.to_string()),
            GoogleError::InvalidToken => HalError::AuthenticationFailed(e.to_string()),
            GoogleError::HttpError(err) => HalError::Network(err),
            GoogleError::JobNotFound(id) => HalError::JobNotFound(id),
            GoogleError::JsonError(err) => HalError::Serialization(err),
            _ => HalError::Backend(e.to_string()),
        }
    }
}
