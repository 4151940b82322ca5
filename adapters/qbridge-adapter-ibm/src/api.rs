//! IBM Quantum Platform API client.
//!
//! This module implements the parts of the IBM Quantum REST API the bridge
//! needs:
//! - Listing backends
//! - Submitting Sampler primitive jobs
//! - Polling job status and retrieving results

use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("qbridge/", env!("CARGO_PKG_VERSION"));

/// IBM Quantum API client.
pub struct IbmClient {
    /// HTTP client.
    client: Client,
    /// API endpoint URL, without trailing slash.
    endpoint: String,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl IbmClient {
    /// Create a new client authenticating with a bearer token.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| IbmError::InvalidToken)?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get available backends.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;
        let response = check(response).await?;

        let backends: BackendsResponse = response.json().await?;
        Ok(backends.backends)
    }

    /// Submit a job using the Sampler primitive.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let request = SamplerJobRequest {
            program_id: "sampler".to_string(),
            backend: backend.to_string(),
            params: SamplerParams { circuits, shots },
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let response = check(response).await?;
        response.json().await.map_err(IbmError::from)
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        let response = check(response).await?;
        response.json().await.map_err(IbmError::from)
    }

    /// Get job results as the raw JSON document.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<serde_json::Value> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        let response = check(response).await?;
        response.json().await.map_err(IbmError::from)
    }
}

/// Turn a non-2xx response into an error.
async fn check(response: reqwest::Response) -> IbmResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(IbmError::InvalidToken);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    let error = serde_json::from_str::<ApiErrorResponse>(&body).unwrap_or(ApiErrorResponse {
        code: None,
        message: body,
    });
    Err(IbmError::ApiError {
        code: error.code,
        message: format!("{status}: {}", error.message),
    })
}

// ============================================================================
// Request types
// ============================================================================

/// Sampler job request.
#[derive(Debug, Serialize)]
struct SamplerJobRequest {
    /// Program ID.
    program_id: String,
    /// Backend name.
    backend: String,
    /// Sampler parameters.
    params: SamplerParams,
}

/// Sampler primitive parameters.
#[derive(Debug, Serialize)]
struct SamplerParams {
    /// `OpenQASM` 3.0 circuits.
    circuits: Vec<String>,
    /// Number of shots.
    shots: u32,
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Backends list response (`{"backends": [...]}`).
#[derive(Debug, Deserialize)]
struct BackendsResponse {
    backends: Vec<BackendInfo>,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    #[serde(default)]
    pub num_qubits: Option<u32>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status, case varies between API versions.
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Error information if failed.
    #[serde(default)]
    pub error: Option<JobError>,
    /// State object with reason.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job error information.
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error message.
    pub message: String,
}

/// Job state with reason.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    /// Normalized uppercase status for comparison.
    pub fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Get the error/failure reason message.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// Results from the sampler primitive, one per circuit.
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// Map of classical register names to per-shot hex samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// Quasi-probability distribution (bitstring -> probability).
    #[serde(default)]
    pub quasi_dists: Option<Vec<HashMap<String, f64>>>,
    /// Measurement counts (bitstring -> count).
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// Metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Classical register data.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// Raw measurement samples as hex strings (e.g., `["0x0", "0x3", ...]`).
    pub samples: Vec<String>,
}
