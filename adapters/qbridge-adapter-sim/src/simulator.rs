//! Simulator adapter implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qbridge_hal::{
    Capabilities, Counts, ExecutionResult, HalResult, NativeOp, Provider, ProviderAdapter,
    VendorCircuit, VendorPayload,
};
use qbridge_ir::Circuit;

use crate::statevector::{Sampler, Statevector};

/// Default qubit ceiling.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// Hard ceiling on `max_qubits`; a statevector of 2^30 amplitudes is 16 GiB.
pub const QUBIT_LIMIT: u32 = 30;

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Largest circuit the simulator accepts.
    pub max_qubits: u32,
    /// Fixed sampling seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
        }
    }
}

/// Local statevector simulator.
///
/// Jobs run to completion inside `execute`; there is nothing to poll.
pub struct SimulatorAdapter {
    config: SimulatorConfig,
    capabilities: Capabilities,
}

impl SimulatorAdapter {
    /// Create a simulator with default settings.
    pub fn new() -> Self {
        Self::with_config(SimulatorConfig::default())
    }

    /// Create a simulator from explicit settings.
    ///
    /// `max_qubits` is clamped to [`QUBIT_LIMIT`].
    pub fn with_config(mut config: SimulatorConfig) -> Self {
        config.max_qubits = config.max_qubits.min(QUBIT_LIMIT);
        let capabilities = Capabilities::simulator(config.max_qubits);
        Self {
            config,
            capabilities,
        }
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::with_config(SimulatorConfig {
            max_qubits,
            ..SimulatorConfig::default()
        })
    }

    /// Use a fixed sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Current settings.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run simulation synchronously.
    fn run_simulation(&self, circuit: &VendorCircuit, shots: u32) -> Result<Counts, String> {
        if circuit.num_qubits > self.config.max_qubits {
            return Err(format!(
                "circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits, self.config.max_qubits
            ));
        }

        let start = Instant::now();
        let mut sv = Statevector::new(circuit.num_qubits as usize);
        for op in &circuit.ops {
            if !sv.apply(op) {
                return Err(format!("unsupported operation '{}'", op.name));
            }
        }
        debug!(ops = circuit.ops.len(), "statevector prepared");

        let sampler = Sampler::new(&sv.probabilities());
        let mut rng = self.rng();
        let mut tally: FxHashMap<usize, u64> = FxHashMap::default();
        for _ in 0..shots {
            *tally.entry(sampler.sample(&mut rng)).or_default() += 1;
        }

        let counts = tally
            .into_iter()
            .map(|(outcome, n)| (sv.outcome_to_bitstring(outcome), n))
            .collect();
        debug!("Simulation completed in {:?}", start.elapsed());
        Ok(counts)
    }
}

impl Default for SimulatorAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for SimulatorAdapter {
    fn provider(&self) -> Provider {
        Provider::Simulator
    }

    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn translate(&self, circuit: &Circuit) -> HalResult<VendorCircuit> {
        self.capabilities.check(circuit, Provider::Simulator)?;

        let ops = circuit
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

        Ok(VendorCircuit {
            provider: Provider::Simulator,
            num_qubits: circuit.num_qubits,
            ops,
            payload: VendorPayload::Native,
        })
    }

    #[instrument(skip(self, circuit), fields(num_qubits = circuit.num_qubits))]
    async fn execute(&self, circuit: &VendorCircuit, shots: u32) -> ExecutionResult {
        let job_id = Uuid::new_v4().to_string();
        debug!(%job_id, "running simulation");

        let result = match self.run_simulation(circuit, shots) {
            Ok(counts) => ExecutionResult::success(Provider::Simulator, counts, shots),
            Err(e) => ExecutionResult::failure(Provider::Simulator, shots, e),
        };
        result
            .with_backend(self.name().to_string())
            .with_vendor_job_id(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_hal::HalError;

    #[test]
    fn test_simulator_capabilities() {
        let adapter = SimulatorAdapter::new();
        let caps = adapter.capabilities();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert_eq!(adapter.provider(), Provider::Simulator);
    }

    #[test]
    fn test_translate_one_op_per_gate() {
        let adapter = SimulatorAdapter::new();
        let mut circuit = Circuit::new(3);
        circuit.h(0).cx(0, 2).rz(0.25, 1).cz(1, 2).ry(1.5, 0).x(2);

        let vendor = adapter.translate(&circuit).unwrap();
        assert_eq!(vendor.len(), circuit.len());
        for (gate, op) in circuit.gates.iter().zip(&vendor.ops) {
            assert_eq!(op.name, gate.name());
            assert_eq!(op.qubits, gate.qubits);
            assert_eq!(op.params.first().copied(), gate.angle);
        }
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let adapter = SimulatorAdapter::new();
        let vendor = adapter.translate(&Circuit::bell()).unwrap();

        let result = adapter.execute(&vendor, 1024).await;
        assert!(result.success);
        assert_eq!(result.shots, 1024);

        let counts = result.counts.unwrap();
        assert_eq!(counts.get("00") + counts.get("11"), 1024);
        assert!(counts.iter().all(|(k, _)| k == "00" || k == "11"));
    }

    #[tokio::test]
    async fn test_simulator_ghz_state() {
        let adapter = SimulatorAdapter::new();
        let vendor = adapter.translate(&Circuit::ghz(3)).unwrap();

        let counts = adapter.execute(&vendor, 1000).await.counts.unwrap();
        assert_eq!(counts.get("000") + counts.get("111"), 1000);
    }

    #[tokio::test]
    async fn test_empty_circuit_measures_zero() {
        let adapter = SimulatorAdapter::new();
        let vendor = adapter.translate(&Circuit::new(1)).unwrap();

        let result = adapter.execute(&vendor, 100).await;
        assert!(result.success);
        assert_eq!(result.counts.unwrap(), Counts::from_pairs([("0", 100)]));
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let adapter = SimulatorAdapter::new().with_seed(1234);
        let vendor = adapter.translate(&Circuit::ghz(4)).unwrap();

        let a = adapter.execute(&vendor, 500).await.counts.unwrap();
        let b = adapter.execute(&vendor, 500).await.counts.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_simulator_too_many_qubits() {
        let adapter = SimulatorAdapter::with_max_qubits(5);
        let err = adapter.translate(&Circuit::ghz(10)).unwrap_err();
        assert!(matches!(err, HalError::CircuitTooLarge(_)));
    }

    #[test]
    fn test_max_qubits_clamped_to_limit() {
        let adapter = SimulatorAdapter::with_max_qubits(64);
        let err = adapter.translate(&Circuit::new(QUBIT_LIMIT + 1)).unwrap_err();
        assert!(matches!(err, HalError::CircuitTooLarge(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config: SimulatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimulatorConfig::default());
    }
}
