//! IBM Quantum adapter implementation.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use qbridge_hal::orchestrator::{self, PollPolicy, VendorJobs, VendorOutput};
use qbridge_hal::{
    Capabilities, Counts, ExecutionResult, GateSet, HalError, HalResult, JobId, NativeOp,
    Provider, ProviderAdapter, VendorCircuit, VendorPayload, VendorStatus,
};
use qbridge_ir::Circuit;

use crate::api::{DEFAULT_ENDPOINT, IbmClient, JobResultResponse, JobStatusResponse};
use crate::error::{IbmError, IbmResult};
use crate::qasm;

/// Backend used when none is configured, and the default fallback.
pub const DEFAULT_BACKEND: &str = "ibmq_qasm_simulator";

/// Qubit ceiling advertised before any backend has been contacted.
const DEFAULT_MAX_QUBITS: u32 = 127;

/// IBM Quantum settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IbmConfig {
    /// API endpoint.
    pub endpoint: String,
    /// API token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Preferred backend name.
    pub backend: String,
    /// Backend used when the preferred one is not listed.
    pub fallback_backend: Option<String>,
    /// Widest circuit accepted at translation time.
    pub max_qubits: u32,
    /// Overrides the bridge-wide poll policy.
    pub poll: Option<PollPolicy>,
}

impl Default for IbmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            backend: DEFAULT_BACKEND.to_string(),
            fallback_backend: Some(DEFAULT_BACKEND.to_string()),
            max_qubits: DEFAULT_MAX_QUBITS,
            poll: None,
        }
    }
}

impl fmt::Debug for IbmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("backend", &self.backend)
            .field("fallback_backend", &self.fallback_backend)
            .field("max_qubits", &self.max_qubits)
            .field("poll", &self.poll)
            .finish()
    }
}

/// IBM Quantum adapter.
///
/// Resolves the target backend on every execution: the configured name if
/// the account lists it, otherwise the fallback.
pub struct IbmAdapter {
    client: IbmClient,
    config: IbmConfig,
    capabilities: Capabilities,
    poll: PollPolicy,
}

impl IbmAdapter {
    /// Create an adapter. `default_poll` applies unless the config overrides it.
    pub fn new(config: IbmConfig, default_poll: PollPolicy) -> IbmResult<Self> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(IbmError::MissingToken)?;
        let client = IbmClient::new(&config.endpoint, token)?;
        let capabilities = Capabilities::device(&config.backend, config.max_qubits, GateSet::all());
        let poll = config.poll.unwrap_or(default_poll);

        Ok(Self {
            client,
            config,
            capabilities,
            poll,
        })
    }

    /// Settings in use.
    pub fn config(&self) -> &IbmConfig {
        &self.config
    }

    /// Pick the configured backend, or the fallback when it is not listed.
    pub async fn resolve_backend(&self) -> IbmResult<String> {
        let backends = self.client.list_backends().await?;
        let listed = |name: &str| backends.iter().any(|b| b.name == name);

        if listed(self.config.backend.as_str()) {
            return Ok(self.config.backend.clone());
        }
        match &self.config.fallback_backend {
            Some(fallback) if listed(fallback.as_str()) => {
                warn!(
                    requested = %self.config.backend,
                    fallback = %fallback,
                    "requested IBM backend not available, using fallback"
                );
                Ok(fallback.clone())
            }
            _ => Err(IbmError::BackendUnavailable(self.config.backend.clone())),
        }
    }
}

#[async_trait]
impl ProviderAdapter for IbmAdapter {
    fn provider(&self) -> Provider {
        Provider::Ibm
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ibm"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn translate(&self, circuit: &Circuit) -> HalResult<VendorCircuit> {
        self.capabilities.check(circuit, Provider::Ibm)?;

        let ops: Vec<NativeOp> = circuit
            .gates
            .iter()
            .map(|gate| {
                let op = NativeOp::new(gate.name(), gate.qubits.clone());
                match gate.angle {
                    Some(theta) => op.with_param(theta),
                    None => op,
                }
            })
            .collect();
        let program = qasm::emit(circuit.num_qubits, &ops);

        Ok(VendorCircuit {
            provider: Provider::Ibm,
            num_qubits: circuit.num_qubits,
            ops,
            payload: VendorPayload::Qasm(program),
        })
    }

    #[instrument(skip(self, circuit), fields(num_qubits = circuit.num_qubits))]
    async fn execute(&self, circuit: &VendorCircuit, shots: u32) -> ExecutionResult {
        let backend = match self.resolve_backend().await {
            Ok(backend) => backend,
            Err(e) => {
                warn!(error = %e, "IBM backend resolution failed");
                return ExecutionResult::failure(Provider::Ibm, shots, e.to_string());
            }
        };
        debug!(%backend, "resolved IBM backend");

        let jobs = IbmJobs {
            client: &self.client,
            backend,
        };
        orchestrator::drive(&jobs, circuit, shots, &self.poll).await
    }
}

/// Job calls against one resolved backend.
struct IbmJobs<'a> {
    client: &'a IbmClient,
    backend: String,
}

#[async_trait]
impl VendorJobs for IbmJobs<'_> {
    fn provider(&self) -> Provider {
        Provider::Ibm
    }

    fn backend_name(&self) -> Option<String> {
        Some(self.backend.clone())
    }

    async fn submit(&self, circuit: &VendorCircuit, shots: u32) -> HalResult<JobId> {
        let VendorPayload::Qasm(program) = &circuit.payload else {
            return Err(HalError::SubmissionFailed(
                "IBM jobs require an OpenQASM payload".into(),
            ));
        };
        let response = self
            .client
            .submit_sampler_job(&self.backend, vec![program.clone()], shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;
        info!(backend = %self.backend, job_id = %response.id, "submitted IBM sampler job");
        Ok(JobId(response.id))
    }

    async fn poll(&self, job_id: &JobId) -> HalResult<VendorStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;
        Ok(map_status(&status))
    }

    async fn fetch(
        &self,
        job_id: &JobId,
        circuit: &VendorCircuit,
        shots: u32,
    ) -> HalResult<VendorOutput> {
        let raw = self.client.get_job_results(&job_id.0).await?;
        let results: JobResultResponse = serde_json::from_value(raw.clone())?;
        let counts = results_to_counts(&results, circuit.num_qubits as usize, shots)?;
        Ok(VendorOutput {
            counts,
            backend: None,
            raw: Some(raw),
        })
    }
}

/// Map an IBM job status onto the vendor-neutral status.
fn map_status(status: &JobStatusResponse) -> VendorStatus {
    let normalized = status.normalized_status();
    match normalized.as_str() {
        "QUEUED" | "INITIALIZING" | "VALIDATING" => VendorStatus::Queued,
        "COMPLETED" | "DONE" => VendorStatus::Completed,
        "FAILED" | "ERROR" => VendorStatus::Failed(
            status
                .error_message()
                .unwrap_or_else(|| format!("Job status: {normalized}")),
        ),
        "CANCELLED" | "CANCELED" => VendorStatus::Cancelled,
        // RUNNING and anything unrecognised
        _ => VendorStatus::Running,
    }
}

/// Convert Sampler results to counts padded to the circuit width.
///
/// Accepts, in order of preference: per-shot hex samples, pre-aggregated
/// counts, and quasi-distributions scaled by the shot count.
fn results_to_counts(
    results: &JobResultResponse,
    num_qubits: usize,
    shots: u32,
) -> HalResult<Counts> {
    let result = results
        .results
        .first()
        .ok_or_else(|| HalError::Backend("IBM result contained no circuits".into()))?;

    let mut counts = Counts::new();

    if let Some(data) = &result.data {
        for register in data.values() {
            let mut tally: HashMap<String, u64> = HashMap::new();
            for sample in &register.samples {
                *tally.entry(to_bitstring(sample, num_qubits)?).or_insert(0) += 1;
            }
            for (bitstring, count) in tally {
                counts.insert(bitstring, count);
            }
        }
        return Ok(counts);
    }

    if let Some(raw_counts) = &result.counts {
        for (key, &count) in raw_counts {
            counts.insert(to_bitstring(key, num_qubits)?, count);
        }
        return Ok(counts);
    }

    if let Some(dist) = result.quasi_dists.as_ref().and_then(|d| d.first()) {
        let effective_shots = result
            .metadata
            .as_ref()
            .and_then(|m| m.get("shots"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(u64::from(shots));
        let distribution = dist
            .iter()
            .map(|(key, &prob)| Ok((to_bitstring(key, num_qubits)?, prob)))
            .collect::<HalResult<Vec<_>>>()?;
        return Ok(Counts::from_distribution(distribution, effective_shots));
    }

    Err(HalError::Backend(
        "IBM result carried no samples, counts or distribution".into(),
    ))
}

/// Convert a hex (`0x..`) or binary outcome to a bitstring of `width`
/// characters, qubit 0 rightmost.
///
/// Digits are expanded one at a time so registers wider than any machine
/// integer survive intact.
fn to_bitstring(key: &str, width: usize) -> HalResult<String> {
    let unrecognised = || HalError::Backend(format!("unrecognised outcome key '{key}'"));

    let bits = if let Some(hex) = key.strip_prefix("0x") {
        if hex.is_empty() {
            return Err(unrecognised());
        }
        let mut bits = String::with_capacity(hex.len() * 4);
        for c in hex.chars() {
            let digit = c.to_digit(16).ok_or_else(unrecognised)?;
            bits.push_str(&format!("{digit:04b}"));
        }
        bits
    } else if !key.is_empty() && key.chars().all(|c| c == '0' || c == '1') {
        key.to_string()
    } else {
        return Err(unrecognised());
    };

    let significant = bits.trim_start_matches('0');
    if significant.len() > width {
        return Err(HalError::Backend(format!(
            "outcome '{key}' does not fit in {width} qubits"
        )));
    }
    Ok(format!("{significant:0>width$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> IbmAdapter {
        let config = IbmConfig {
            token: Some("test-token".into()),
            ..IbmConfig::default()
        };
        IbmAdapter::new(config, PollPolicy::default()).unwrap()
    }

    fn status(s: &str) -> JobStatusResponse {
        serde_json::from_value(serde_json::json!({"id": "j", "status": s})).unwrap()
    }

    #[test]
    fn test_missing_token() {
        let err = IbmAdapter::new(IbmConfig::default(), PollPolicy::default()).err();
        assert!(matches!(err, Some(IbmError::MissingToken)));

        let empty = IbmConfig {
            token: Some(String::new()),
            ..IbmConfig::default()
        };
        assert!(IbmAdapter::new(empty, PollPolicy::default()).is_err());
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = IbmConfig {
            token: Some("secret-token".into()),
            ..IbmConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_translate_emits_qasm_for_every_gate() {
        let mut circuit = Circuit::new(3);
        circuit.h(0).x(1).cx(0, 1).cz(1, 2).rz(0.5, 2).ry(1.25, 0);

        let vendor = adapter().translate(&circuit).unwrap();
        assert_eq!(vendor.ops.len(), circuit.len());
        for (gate, op) in circuit.gates.iter().zip(&vendor.ops) {
            assert_eq!(op.name, gate.name());
            assert_eq!(op.qubits, gate.qubits);
        }

        let VendorPayload::Qasm(program) = &vendor.payload else {
            panic!("expected QASM payload");
        };
        assert!(program.contains("qubit[3] q;"));
        assert!(program.contains("cz q[1], q[2];"));
        assert!(program.contains("rz(0.5) q[2];"));
        assert!(program.contains("ry(1.25) q[0];"));
        assert!(program.ends_with("c = measure q;\n"));
    }

    #[test]
    fn test_translate_rejects_wide_circuit() {
        let config = IbmConfig {
            token: Some("t".into()),
            max_qubits: 2,
            ..IbmConfig::default()
        };
        let adapter = IbmAdapter::new(config, PollPolicy::default()).unwrap();
        let err = adapter.translate(&Circuit::ghz(3)).unwrap_err();
        assert!(matches!(err, HalError::CircuitTooLarge(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(&status("QUEUED")), VendorStatus::Queued);
        assert_eq!(map_status(&status("Running")), VendorStatus::Running);
        assert_eq!(map_status(&status("Completed")), VendorStatus::Completed);
        assert_eq!(map_status(&status("CANCELLED")), VendorStatus::Cancelled);
        assert_eq!(
            map_status(&status("ERROR")),
            VendorStatus::Failed("Job status: ERROR".into())
        );
    }

    #[test]
    fn test_to_bitstring_pads_to_width() {
        assert_eq!(to_bitstring("0x0", 2).unwrap(), "00");
        assert_eq!(to_bitstring("0x3", 2).unwrap(), "11");
        assert_eq!(to_bitstring("0x1", 3).unwrap(), "001");
        assert_eq!(to_bitstring("11", 4).unwrap(), "0011");
        assert!(to_bitstring("zz", 2).is_err());
        assert!(to_bitstring("0x", 2).is_err());
        assert!(to_bitstring("0x4", 2).is_err());
    }

    #[test]
    fn test_to_bitstring_wide_register() {
        let bits = to_bitstring("0x111111111111111111", 72).unwrap();
        assert_eq!(bits.len(), 72);
        assert_eq!(bits, "0001".repeat(18));

        let top = to_bitstring("0x1", 100).unwrap();
        assert_eq!(top.len(), 100);
        assert!(top.ends_with('1'));
        assert_eq!(top.matches('1').count(), 1);
    }

    #[test]
    fn test_results_from_samples() {
        let results: JobResultResponse = serde_json::from_value(serde_json::json!({
            "results": [{"data": {"c": {"samples": ["0x0", "0x3", "0x0", "0x1"]}}}]
        }))
        .unwrap();
        let counts = results_to_counts(&results, 2, 4).unwrap();
        assert_eq!(counts.get("00"), 2);
        assert_eq!(counts.get("11"), 1);
        assert_eq!(counts.get("01"), 1);
        assert_eq!(counts.total_shots(), 4);
    }

    #[test]
    fn test_results_from_quasi_dists() {
        let results: JobResultResponse = serde_json::from_value(serde_json::json!({
            "results": [{"quasi_dists": [{"0x0": 0.5, "0x3": 0.5}]}]
        }))
        .unwrap();
        let counts = results_to_counts(&results, 2, 1000).unwrap();
        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("11"), 500);
    }

    #[test]
    fn test_results_wide_register_counts() {
        let results: JobResultResponse = serde_json::from_value(serde_json::json!({
            "results": [{"data": {"c": {"samples": [
                "0x800000000000000001", "0x800000000000000001", "0x0"
            ]}}}]
        }))
        .unwrap();
        let counts = results_to_counts(&results, 72, 3).unwrap();
        let high = format!("1{}1", "0".repeat(70));
        assert_eq!(counts.get(&high), 2);
        assert_eq!(counts.get(&"0".repeat(72)), 1);
    }

    #[test]
    fn test_quasi_dists_thirds_sum_to_shots() {
        let third = 1.0 / 3.0;
        let results: JobResultResponse = serde_json::from_value(serde_json::json!({
            "results": [{"quasi_dists": [{"0x0": third, "0x1": third, "0x2": third}]}]
        }))
        .unwrap();
        let counts = results_to_counts(&results, 2, 100).unwrap();
        assert_eq!(counts.total_shots(), 100);
        for key in ["00", "01", "10"] {
            assert!((33..=34).contains(&counts.get(key)));
        }
    }

    #[test]
    fn test_results_empty_is_error() {
        let results: JobResultResponse =
            serde_json::from_value(serde_json::json!({"results": []})).unwrap();
        assert!(results_to_counts(&results, 2, 10).is_err());
    }
}
