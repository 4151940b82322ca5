//! IonQ REST API client.
//!
//! Implements the v0.3 jobs API (`{endpoint}/v0.3/jobs`): submitting
//! circuits in the `ionq.circuit.v0` format, polling job status and reading
//! result histograms.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{IonqError, IonqResult};

/// IonQ API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.ionq.co";

/// Circuit format accepted by the jobs API.
pub const CIRCUIT_FORMAT: &str = "ionq.circuit.v0";

/// IonQ REST API client.
///
/// Authenticates with `Authorization: apiKey <key>`.
pub struct IonqClient {
    client: Client,
    /// API base URL (without trailing slash).
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for IonqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IonqClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl IonqClient {
    /// Create a client targeting `endpoint`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> IonqResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_header(&self) -> String {
        format!("apiKey {}", self.api_key)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v0.3/{}", self.endpoint, path.trim_start_matches('/'))
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> IonqResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> IonqResult<T> {
        let url = self.url(path);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> IonqResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(IonqError::JobNotFound(message)),
            _ => Err(IonqError::ApiError {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Submit a job.
    #[instrument(skip(self, request), fields(target = %request.target, shots = request.shots))]
    pub async fn submit_job(&self, request: &JobRequest) -> IonqResult<SubmitResponse> {
        self.post("jobs", request).await
    }

    /// Get a job's current state.
    #[instrument(skip(self))]
    pub async fn get_job(&self, job_id: &str) -> IonqResult<JobResponse> {
        self.get(&format!("jobs/{job_id}")).await
    }

    /// Get the result histogram of a completed job, as returned.
    #[instrument(skip(self))]
    pub async fn get_results(&self, job_id: &str) -> IonqResult<Value> {
        self.get(&format!("jobs/{job_id}/results")).await
    }
}

// ============================================================================
// Request types
// ============================================================================

/// Job submission body.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    /// `qpu`, `simulator` or a named QPU such as `qpu.aria-1`.
    pub target: String,
    pub shots: u32,
    pub input: CircuitInput,
}

/// Circuit in the `ionq.circuit.v0` format.
#[derive(Debug, Serialize)]
pub struct CircuitInput {
    pub format: &'static str,
    pub qubits: u32,
    pub circuit: Vec<IonqGate>,
}

/// One gate of an `ionq.circuit.v0` circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IonqGate {
    pub gate: String,
    pub target: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

// ============================================================================
// Response types
// ============================================================================

/// Response to a job submission.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Job state.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    pub id: String,
    /// `submitted`, `ready`, `running`, `completed`, `failed` or `canceled`.
    pub status: String,
    /// Failure details (`{"error": ..., "code": ...}`).
    #[serde(default)]
    pub failure: Option<Value>,
    /// Older error field, either a string or an object with `message`.
    #[serde(default)]
    pub error: Option<Value>,
}

impl JobResponse {
    /// Failure reason reported by the service, if any.
    pub fn failure_message(&self) -> Option<String> {
        let from = |v: &Value| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map
                .get("error")
                .or_else(|| map.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        self.failure
            .as_ref()
            .and_then(from)
            .or_else(|| self.error.as_ref().and_then(from))
    }
}

/// Probability histogram keyed by the decimal value of the outcome.
pub type Histogram = HashMap<String, f64>;
