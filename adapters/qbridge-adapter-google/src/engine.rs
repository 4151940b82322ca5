//! Quantum Engine REST client.
//!
//! A job is run as two resources: a program holding the circuit document and
//! a job under it holding the run context. The client talks to the v1alpha1
//! surface:
//! - `POST projects/{p}/programs`
//! - `POST projects/{p}/programs/{id}/jobs`
//! - `GET {job}` for the execution status
//! - `GET {job}/result`

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{GoogleError, GoogleResult};

/// Default Quantum Engine endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.googleapis.com/v1alpha1";

/// Processor used when none is configured.
pub const DEFAULT_PROCESSOR: &str = "rainbow";

const USER_AGENT: &str = concat!("qbridge/", env!("CARGO_PKG_VERSION"));

/// Sampling surface of the engine.
///
/// The adapter depends on this trait rather than on [`EngineClient`] so a
/// different transport can stand in for the REST API.
#[async_trait]
pub trait EngineSampler: Send + Sync {
    /// Processor jobs are scheduled on.
    fn processor(&self) -> &str;

    /// Upload `program` and start a job sampling it `repetitions` times.
    /// Returns the job's resource name.
    async fn create_job(&self, program: &Value, repetitions: u32) -> GoogleResult<String>;

    /// Current execution status of a job.
    async fn job_state(&self, job_name: &str) -> GoogleResult<ExecutionStatus>;

    /// Result document of a finished job.
    async fn job_result(&self, job_name: &str) -> GoogleResult<Value>;
}

/// Quantum Engine REST client bound to one project and processor.
pub struct EngineClient {
    client: Client,
    endpoint: String,
    project_id: String,
    processor: String,
}

impl fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineClient")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("processor", &self.processor)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl EngineClient {
    /// Create a client authenticating with an OAuth bearer token.
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        processor: impl Into<String>,
        token: &str,
    ) -> GoogleResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GoogleError::InvalidToken)?,
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
            project_id: project_id.into(),
            processor: processor.into(),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn project_path(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    async fn create_program(&self, program: &Value) -> GoogleResult<String> {
        let url = format!("{}/{}/programs", self.endpoint, self.project_path());
        let request = CreateProgram {
            name: format!("{}/programs/prog-{}", self.project_path(), uuid::Uuid::new_v4()),
            code: program,
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let created: Resource = check(response).await?.json().await?;
        Ok(created.name)
    }
}

#[async_trait]
impl EngineSampler for EngineClient {
    fn processor(&self) -> &str {
        &self.processor
    }

    async fn create_job(&self, program: &Value, repetitions: u32) -> GoogleResult<String> {
        let program_name = self.create_program(program).await?;
        debug!(program = %program_name, "created Quantum Engine program");

        let url = format!("{}/{}/jobs", self.endpoint, program_name);
        let request = CreateJob {
            name: format!("{program_name}/jobs/job-{}", uuid::Uuid::new_v4()),
            run_context: RunContext { repetitions },
            scheduling_config: SchedulingConfig {
                processor_selector: ProcessorSelector {
                    processor_names: vec![format!(
                        "{}/processors/{}",
                        self.project_path(),
                        self.processor
                    )],
                },
            },
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let created: Resource = check(response).await?.json().await?;
        Ok(created.name)
    }

    async fn job_state(&self, job_name: &str) -> GoogleResult<ExecutionStatus> {
        let url = format!("{}/{}", self.endpoint, job_name);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GoogleError::JobNotFound(job_name.to_string()));
        }
        let job: JobResource = check(response).await?.json().await?;
        Ok(job.execution_status)
    }

    async fn job_result(&self, job_name: &str) -> GoogleResult<Value> {
        let url = format!("{}/{}/result", self.endpoint, job_name);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GoogleError::JobNotFound(job_name.to_string()));
        }
        check(response).await?.json().await.map_err(GoogleError::from)
    }
}

async fn check(response: reqwest::Response) -> GoogleResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GoogleError::InvalidToken);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    Err(GoogleError::ApiError {
        status: status.as_u16(),
        message,
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateProgram<'a> {
    name: String,
    code: &'a Value,
}

#[derive(Debug, Serialize)]
struct CreateJob {
    name: String,
    run_context: RunContext,
    scheduling_config: SchedulingConfig,
}

#[derive(Debug, Serialize)]
struct RunContext {
    repetitions: u32,
}

#[derive(Debug, Serialize)]
struct SchedulingConfig {
    processor_selector: ProcessorSelector,
}

#[derive(Debug, Serialize)]
struct ProcessorSelector {
    processor_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct JobResource {
    execution_status: ExecutionStatus,
}

/// Execution status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutionStatus {
    /// `READY`, `RUNNING`, `SUCCESS`, `FAILURE` or `CANCELLED`.
    pub state: String,
    /// Failure details when `state` is `FAILURE`.
    #[serde(default)]
    pub failure: Option<Failure>,
}

/// Failure details of a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Failure {
    /// Human readable reason.
    #[serde(default)]
    pub error_message: String,
}
