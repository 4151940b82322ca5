//! IonQ backend implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use qbridge_hal::orchestrator::{self, PollPolicy, VendorJobs, VendorOutput};
use qbridge_hal::{
    Capabilities, Counts, ExecutionResult, GateSet, HalError, HalResult, JobId, NativeOp,
    Provider, ProviderAdapter, VendorCircuit, VendorPayload, VendorStatus,
};
use qbridge_ir::{Circuit, GateKind};

use crate::api::{
    CIRCUIT_FORMAT, CircuitInput, DEFAULT_ENDPOINT, Histogram, IonqClient, IonqGate, JobRequest,
    JobResponse,
};
use crate::error::{IonqError, IonqResult};

/// Target used when none is configured.
pub const DEFAULT_TARGET: &str = "qpu";

/// Qubit count of the largest generally available system.
const DEFAULT_MAX_QUBITS: u32 = 36;

/// IonQ settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IonqConfig {
    /// API base URL.
    pub endpoint: String,
    /// API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Job target (`qpu`, `simulator`, `qpu.aria-1`, ...).
    pub target: String,
    /// Widest circuit accepted at translation time.
    pub max_qubits: u32,
    /// Overrides the bridge-wide poll policy.
    pub poll: Option<PollPolicy>,
}

impl Default for IonqConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            target: DEFAULT_TARGET.to_string(),
            max_qubits: DEFAULT_MAX_QUBITS,
            poll: None,
        }
    }
}

impl std::fmt::Debug for IonqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IonqConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("target", &self.target)
            .field("max_qubits", &self.max_qubits)
            .field("poll", &self.poll)
            .finish()
    }
}

/// Gates expressible in `ionq.circuit.v0` with a single control.
pub fn gate_set() -> GateSet {
    GateSet::new([
        GateKind::H,
        GateKind::X,
        GateKind::CX,
        GateKind::Rz,
        GateKind::Ry,
    ])
}

/// IonQ adapter.
pub struct IonqAdapter {
    client: IonqClient,
    target: String,
    capabilities: Capabilities,
    poll: PollPolicy,
}

impl IonqAdapter {
    /// Create an adapter. `default_poll` applies unless the config overrides it.
    pub fn new(config: IonqConfig, default_poll: PollPolicy) -> IonqResult<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(IonqError::MissingApiKey)?;
        let client = IonqClient::new(config.endpoint, api_key)?;
        let capabilities = Capabilities::device(&config.target, config.max_qubits, gate_set());

        Ok(Self {
            client,
            target: config.target,
            capabilities,
            poll: config.poll.unwrap_or(default_poll),
        })
    }
}

#[async_trait]
impl ProviderAdapter for IonqAdapter {
    fn provider(&self) -> Provider {
        Provider::Ionq
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ionq"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn translate(&self, circuit: &Circuit) -> HalResult<VendorCircuit> {
        self.capabilities.check(circuit, Provider::Ionq)?;

        let ops = circuit
            .gates
            .iter()
            .map(|gate| {
                let name = match gate.kind {
                    GateKind::H => "h",
                    GateKind::X => "x",
                    GateKind::CX => "cnot",
                    GateKind::Rz => "rz",
                    GateKind::Ry => "ry",
                    _ => {
                        return Err(HalError::UnsupportedGate {
                            gate: gate.name().to_string(),
                            provider: Provider::Ionq,
                        });
                    }
                };
                let op = NativeOp::new(name, gate.qubits.clone());
                Ok(match gate.angle {
                    Some(theta) => op.with_param(theta),
                    None => op,
                })
            })
            .collect::<HalResult<Vec<_>>>()?;

        let gates: Vec<IonqGate> = ops.iter().map(to_ionq_gate).collect::<HalResult<_>>()?;
        let payload = serde_json::to_value(&gates)?;

        Ok(VendorCircuit {
            provider: Provider::Ionq,
            num_qubits: circuit.num_qubits,
            ops,
            payload: VendorPayload::Json(payload),
        })
    }

    #[instrument(skip(self, circuit), fields(num_qubits = circuit.num_qubits, target = %self.target))]
    async fn execute(&self, circuit: &VendorCircuit, shots: u32) -> ExecutionResult {
        orchestrator::drive(self, circuit, shots, &self.poll).await
    }
}

#[async_trait]
impl VendorJobs for IonqAdapter {
    fn provider(&self) -> Provider {
        Provider::Ionq
    }

    fn backend_name(&self) -> Option<String> {
        Some(self.target.clone())
    }

    async fn submit(&self, circuit: &VendorCircuit, shots: u32) -> HalResult<JobId> {
        let gates = circuit
            .ops
            .iter()
            .map(to_ionq_gate)
            .collect::<HalResult<Vec<_>>>()?;
        let request = JobRequest {
            target: self.target.clone(),
            shots,
            input: CircuitInput {
                format: CIRCUIT_FORMAT,
                qubits: circuit.num_qubits,
                circuit: gates,
            },
        };
        let response = self
            .client
            .submit_job(&request)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;
        info!(target = %self.target, job_id = %response.id, "submitted IonQ job");
        Ok(JobId(response.id))
    }

    async fn poll(&self, job_id: &JobId) -> HalResult<VendorStatus> {
        let job = self.client.get_job(&job_id.0).await?;
        Ok(map_status(&job))
    }

    async fn fetch(
        &self,
        job_id: &JobId,
        circuit: &VendorCircuit,
        shots: u32,
    ) -> HalResult<VendorOutput> {
        let raw = self.client.get_results(&job_id.0).await?;
        let histogram: Histogram = serde_json::from_value(raw.clone())?;
        let counts = histogram_to_counts(&histogram, circuit.num_qubits as usize, shots)?;
        Ok(VendorOutput {
            counts,
            backend: None,
            raw: Some(raw),
        })
    }
}

/// Wire form of a native op.
fn to_ionq_gate(op: &NativeOp) -> HalResult<IonqGate> {
    let malformed = || HalError::Backend(format!("malformed IonQ op '{}'", op.name));
    match (op.name.as_str(), op.qubits.as_slice()) {
        ("cnot", &[control, target]) => Ok(IonqGate {
            gate: op.name.clone(),
            target,
            control: Some(control),
            rotation: None,
        }),
        ("h" | "x", &[target]) => Ok(IonqGate {
            gate: op.name.clone(),
            target,
            control: None,
            rotation: None,
        }),
        ("rz" | "ry", &[target]) => Ok(IonqGate {
            gate: op.name.clone(),
            target,
            control: None,
            rotation: Some(*op.params.first().ok_or_else(malformed)?),
        }),
        _ => Err(malformed()),
    }
}

fn map_status(job: &JobResponse) -> VendorStatus {
    match job.status.to_lowercase().as_str() {
        "submitted" | "ready" | "queued" => VendorStatus::Queued,
        "completed" => VendorStatus::Completed,
        "failed" => VendorStatus::Failed(
            job.failure_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        "canceled" | "cancelled" => VendorStatus::Cancelled,
        _ => VendorStatus::Running,
    }
}

/// Scale a probability histogram to counts summing to `shots`.
///
/// Keys are the decimal value of the outcome with qubit 0 as the least
/// significant bit, so the padded binary form puts qubit 0 rightmost.
fn histogram_to_counts(histogram: &Histogram, width: usize, shots: u32) -> HalResult<Counts> {
    let mut distribution = Vec::with_capacity(histogram.len());
    for (key, &probability) in histogram {
        let value: u128 = key
            .parse()
            .map_err(|_| IonqError::MalformedHistogram(format!("outcome key '{key}'")))?;
        if !(0.0..=1.0 + 1e-9).contains(&probability) {
            return Err(IonqError::MalformedHistogram(format!(
                "probability {probability} for outcome {key}"
            ))
            .into());
        }
        distribution.push((format!("{value:0>width$b}"), probability));
    }
    Ok(Counts::from_distribution(distribution, u64::from(shots)))
}
