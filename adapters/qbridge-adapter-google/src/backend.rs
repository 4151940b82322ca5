//! Google Quantum Engine adapter implementation.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use qbridge_hal::orchestrator::{self, PollPolicy, VendorJobs, VendorOutput};
use qbridge_hal::{
    Capabilities, ExecutionResult, GateSet, HalError, HalResult, JobId, Provider,
    ProviderAdapter, VendorCircuit, VendorPayload, VendorStatus,
};
use qbridge_ir::Circuit;

use crate::cirq;
use crate::engine::{
    DEFAULT_ENDPOINT, DEFAULT_PROCESSOR, EngineClient, EngineSampler, ExecutionStatus,
};
use crate::error::{GoogleError, GoogleResult};

/// Qubit count of the default processor.
const DEFAULT_MAX_QUBITS: u32 = 53;

/// Google Quantum Engine settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// API endpoint, including the API version.
    pub endpoint: String,
    /// Cloud project owning programs and jobs.
    pub project_id: Option<String>,
    /// Processor jobs are scheduled on.
    pub processor: String,
    /// OAuth bearer token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Widest circuit accepted at translation time.
    pub max_qubits: u32,
    /// Overrides the bridge-wide poll policy.
    pub poll: Option<PollPolicy>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: None,
            processor: DEFAULT_PROCESSOR.to_string(),
            token: None,
            max_qubits: DEFAULT_MAX_QUBITS,
            poll: None,
        }
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("processor", &self.processor)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("max_qubits", &self.max_qubits)
            .field("poll", &self.poll)
            .finish()
    }
}

/// Google Quantum Engine adapter.
pub struct GoogleAdapter {
    sampler: Box<dyn EngineSampler>,
    capabilities: Capabilities,
    poll: PollPolicy,
}

impl GoogleAdapter {
    /// Create an adapter talking to the REST API.
    pub fn new(config: GoogleConfig, default_poll: PollPolicy) -> GoogleResult<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(GoogleError::MissingCredentials("project"))?;
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(GoogleError::MissingCredentials("token"))?;
        let client = EngineClient::new(&config.endpoint, project_id, &config.processor, token)?;
        Ok(Self::with_sampler(config, Box::new(client), default_poll))
    }

    /// Create an adapter running jobs through `sampler`.
    pub fn with_sampler(
        config: GoogleConfig,
        sampler: Box<dyn EngineSampler>,
        default_poll: PollPolicy,
    ) -> Self {
        let capabilities =
            Capabilities::device(sampler.processor(), config.max_qubits, GateSet::all());
        Self {
            sampler,
            capabilities,
            poll: config.poll.unwrap_or(default_poll),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "google"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn translate(&self, circuit: &Circuit) -> HalResult<VendorCircuit> {
        self.capabilities.check(circuit, Provider::Google)?;
        let ops = cirq::to_ops(circuit)?;
        let program = cirq::to_program(circuit.num_qubits, &ops);

        Ok(VendorCircuit {
            provider: Provider::Google,
            num_qubits: circuit.num_qubits,
            ops,
            payload: VendorPayload::Json(program),
        })
    }

    #[instrument(skip(self, circuit), fields(num_qubits = circuit.num_qubits))]
    async fn execute(&self, circuit: &VendorCircuit, shots: u32) -> ExecutionResult {
        let jobs = GoogleJobs {
            sampler: self.sampler.as_ref(),
        };
        orchestrator::drive(&jobs, circuit, shots, &self.poll).await
    }
}

struct GoogleJobs<'a> {
    sampler: &'a dyn EngineSampler,
}

#[async_trait]
impl VendorJobs for GoogleJobs<'_> {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn backend_name(&self) -> Option<String> {
        Some(self.sampler.processor().to_string())
    }

    async fn submit(&self, circuit: &VendorCircuit, shots: u32) -> HalResult<JobId> {
        let VendorPayload::Json(program) = &circuit.payload else {
            return Err(HalError::SubmissionFailed(
                "Quantum Engine jobs require a program document".into(),
            ));
        };
        let job_name = self
            .sampler
            .create_job(program, shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;
        info!(processor = %self.sampler.processor(), job = %job_name, "submitted Quantum Engine job");
        Ok(JobId(job_name))
    }

    async fn poll(&self, job_id: &JobId) -> HalResult<VendorStatus> {
        let status = self.sampler.job_state(&job_id.0).await?;
        Ok(map_state(&status))
    }

    async fn fetch(
        &self,
        job_id: &JobId,
        circuit: &VendorCircuit,
        _shots: u32,
    ) -> HalResult<VendorOutput> {
        let raw = self.sampler.job_result(&job_id.0).await?;
        let counts = cirq::counts_from_result(&raw, circuit.num_qubits)?;
        Ok(VendorOutput {
            counts,
            backend: None,
            raw: Some(raw),
        })
    }
}

fn map_state(status: &ExecutionStatus) -> VendorStatus {
    match status.state.to_uppercase().as_str() {
        "READY" | "QUEUED" | "STATE_UNSPECIFIED" => VendorStatus::Queued,
        "SUCCESS" => VendorStatus::Completed,
        "FAILURE" => VendorStatus::Failed(
            status
                .failure
                .as_ref()
                .map(|f| f.error_message.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Job status: {}", status.state)),
        ),
        "CANCELLED" | "CANCELING" => VendorStatus::Cancelled,
        _ => VendorStatus::Running,
    }
}
