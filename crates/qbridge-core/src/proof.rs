//! Proof service handoff.
//!
//! One `POST {url}/proof/submit` per receipt, carrying
//! `{job_id, proof_type: "QuantumCompute", receipt}`. Only the HTTP status
//! of the response is looked at.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use qbridge_receipt::Receipt;

/// Proof type recorded for quantum executions.
pub const PROOF_TYPE: &str = "QuantumCompute";

/// Request timeout of the handoff.
pub const PROOF_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the proof service.
#[derive(Debug, Error)]
pub enum ProofError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-2xx status.
    #[error("Proof service returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct ProofSubmission<'a> {
    job_id: &'a str,
    proof_type: &'static str,
    receipt: &'a Receipt,
}

/// Client for the proof service.
#[derive(Debug, Clone)]
pub struct ProofClient {
    client: Client,
    base_url: String,
}

impl ProofClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProofError> {
        Self::with_timeout(base_url, PROOF_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProofError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a receipt.
    #[instrument(skip(self, receipt), fields(job_id = %receipt.job_id))]
    pub async fn submit(&self, receipt: &Receipt) -> Result<(), ProofError> {
        let url = format!("{}/proof/submit", self.base_url);
        let body = ProofSubmission {
            job_id: &receipt.job_id,
            proof_type: PROOF_TYPE,
            receipt,
        };
        debug!("POST {}", url);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(ProofError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_hal::{Counts, ExecutionResult, Provider};

    #[test]
    fn test_submission_body_shape() {
        let result = ExecutionResult::success(
            Provider::Simulator,
            Counts::from_pairs([("00", 1)]),
            1,
        );
        let receipt = qbridge_receipt::generate(&result, "job-9");
        let body = ProofSubmission {
            job_id: &receipt.job_id,
            proof_type: PROOF_TYPE,
            receipt: &receipt,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["job_id"], "job-9");
        assert_eq!(value["proof_type"], "QuantumCompute");
        assert_eq!(value["receipt"]["digest"], receipt.digest.as_str());
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = ProofClient::new("http://localhost:8085/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8085");
    }
}
