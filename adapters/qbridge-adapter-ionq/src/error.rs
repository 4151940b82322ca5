//! Error types for the IonQ adapter.

use qbridge_hal::HalError;
use thiserror::Error;

/// Result type for IonQ operations.
pub type IonqResult<T> = Result<T, IonqError>;

/// Errors that can occur when interacting with IonQ.
#[derive(Debug, Error)]
pub enum IonqError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing IonQ API key.
    #[error("Missing IonQ API key: set IONQ_API_KEY environment variable")]
    MissingApiKey,

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Histogram could not be turned into counts.
    #[error("Malformed histogram: {0}")]
    MalformedHistogram(String),
}

impl From<IonqError> for HalError {
    fn from(e: IonqError) -> Self {
        match e {
            IonqError::MissingApiKey => HalError::AdapterUnavailable(e.to_string()),
            IonqError::ApiError { status: 401, .. } => HalError::AuthenticationFailed(e.to_string()),
            IonqError::Http(err) => HalError::Network(err),
            IonqError::Json(err) => HalError::Serialization(err),
            IonqError::JobNotFound(id) => HalError::JobNotFound(id),
            _ => HalError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_display() {
        assert!(IonqError::MissingApiKey.to_string().contains("IONQ_API_KEY"));
    }

    #[test]
    fn test_missing_api_key_to_hal() {
        let hal: HalError = IonqError::MissingApiKey.into();
        assert!(matches!(hal, HalError::AdapterUnavailable(_)));
    }

    #[test]
    fn test_unauthorized_to_hal() {
        let hal: HalError = IonqError::ApiError {
            status: 401,
            message: "bad key".into(),
        }
        .into();
        assert!(matches!(hal, HalError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_job_not_found_to_hal() {
        let hal: HalError = IonqError::JobNotFound("j1".into()).into();
        assert!(matches!(hal, HalError::JobNotFound(id) if id == "j1"));
    }

    #[test]
    fn test_api_error_to_hal() {
        let hal: HalError = IonqError::ApiError {
            status: 500,
            message: "internal".into(),
        }
        .into();
        assert!(matches!(hal, HalError::Backend(msg) if msg.contains("internal")));
    }
}
