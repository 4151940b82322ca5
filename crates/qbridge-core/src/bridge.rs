//! The bridge facade.

use tracing::{debug, info, instrument, warn};

use qbridge_adapter_sim::SimulatorAdapter;
use qbridge_hal::{ExecutionResult, Provider, ProviderAdapter};
use qbridge_ir::Circuit;
use qbridge_receipt::{Receipt, generate};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::proof::ProofClient;

/// One execution as requested by a caller.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Circuit to run.
    pub circuit: Circuit,
    /// Number of shots, at least 1.
    pub shots: u32,
    /// Provider to run on.
    pub provider: Provider,
}

impl ExecutionRequest {
    /// Create a request.
    pub fn new(circuit: Circuit, shots: u32, provider: Provider) -> Self {
        Self {
            circuit,
            shots,
            provider,
        }
    }
}

/// Runs circuits on the configured provider and issues receipts.
///
/// The adapter is built once, at construction. Pre-submission problems are
/// returned as [`BridgeError`]; anything that goes wrong after submission
/// is recorded in the result and still yields a receipt.
pub struct QuantumBridge {
    adapter: Box<dyn ProviderAdapter>,
    default_shots: u32,
    proof: Option<ProofClient>,
}

impl std::fmt::Debug for QuantumBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantumBridge")
            .field("provider", &self.adapter.provider())
            .field("adapter", &self.adapter.name())
            .field("default_shots", &self.default_shots)
            .field("proof", &self.proof.as_ref().map(ProofClient::base_url))
            .finish()
    }
}

impl QuantumBridge {
    /// Build the bridge and the adapter for `config.provider`.
    pub fn new(config: BridgeConfig) -> BridgeResult<Self> {
        let adapter = build_adapter(&config)?;
        Self::with_adapter(adapter, &config)
    }

    /// Build the bridge around an already constructed adapter.
    pub fn with_adapter(
        adapter: Box<dyn ProviderAdapter>,
        config: &BridgeConfig,
    ) -> BridgeResult<Self> {
        config.validate()?;
        let proof = config
            .proof_service_url()
            .map(ProofClient::new)
            .transpose()
            .map_err(|e| BridgeError::Config(format!("proof client: {e}")))?;
        info!(
            provider = %adapter.provider(),
            adapter = adapter.name(),
            proof = proof.is_some(),
            "quantum bridge ready"
        );
        Ok(Self {
            adapter,
            default_shots: config.default_shots,
            proof,
        })
    }

    /// Provider this bridge runs on.
    pub fn provider(&self) -> Provider {
        self.adapter.provider()
    }

    /// Shots used by [`QuantumBridge::run_default`].
    pub fn default_shots(&self) -> u32 {
        self.default_shots
    }

    /// Run a circuit and produce its receipt.
    ///
    /// The receipt is forwarded to the proof service when one is
    /// configured; a failed handoff is logged and does not affect the
    /// returned receipt.
    #[instrument(skip(self, circuit), fields(provider = %self.provider()))]
    pub async fn run(&self, circuit: &Circuit, shots: u32, job_id: &str) -> BridgeResult<Receipt> {
        let request = ExecutionRequest::new(circuit.clone(), shots, self.provider());
        let result = self.execute(&request).await?;
        let receipt = generate(&result, job_id);
        info!(
            job_id,
            success = receipt.success,
            digest = %receipt.digest,
            "receipt generated"
        );

        if let Some(proof) = &self.proof {
            match proof.submit(&receipt).await {
                Ok(()) => debug!(job_id, "receipt forwarded to proof service"),
                Err(e) => warn!(job_id, error = %e, "proof submission failed"),
            }
        }
        Ok(receipt)
    }

    /// Run a circuit with the configured default shot count.
    pub async fn run_default(&self, circuit: &Circuit, job_id: &str) -> BridgeResult<Receipt> {
        self.run(circuit, self.default_shots, job_id).await
    }

    /// Validate, translate and execute a request, returning the raw result.
    pub async fn execute(&self, request: &ExecutionRequest) -> BridgeResult<ExecutionResult> {
        if request.provider != self.adapter.provider() {
            return Err(BridgeError::AdapterUnavailable(format!(
                "bridge is configured for {}, not {}",
                self.adapter.provider(),
                request.provider
            )));
        }
        if request.shots == 0 {
            return Err(BridgeError::InvalidShots(request.shots));
        }
        request.circuit.validate()?;

        let vendor = self.adapter.translate(&request.circuit)?;
        debug!(ops = vendor.len(), "circuit translated");

        let result = self.adapter.execute(&vendor, request.shots).await;
        if !result.success {
            warn!(
                provider = %result.provider,
                error = result.error.as_deref().unwrap_or_default(),
                "execution failed"
            );
        }
        Ok(result)
    }
}

/// Construct the adapter for `config.provider`.
fn build_adapter(config: &BridgeConfig) -> BridgeResult<Box<dyn ProviderAdapter>> {
    let adapter: Box<dyn ProviderAdapter> = match config.provider {
        Provider::Simulator => Box::new(SimulatorAdapter::with_config(config.simulator.clone())),
        #[cfg(feature = "ibm")]
        Provider::Ibm => Box::new(
            qbridge_adapter_ibm::IbmAdapter::new(config.ibm.clone(), config.poll)
                .map_err(qbridge_hal::HalError::from)?,
        ),
        #[cfg(not(feature = "ibm"))]
        Provider::Ibm => {
            return Err(BridgeError::AdapterUnavailable(
                "IBM support not compiled in. Rebuild with --features ibm".into(),
            ));
        }
        #[cfg(feature = "google")]
        Provider::Google => Box::new(
            qbridge_adapter_google::GoogleAdapter::new(config.google.clone(), config.poll)
                .map_err(qbridge_hal::HalError::from)?,
        ),
        #[cfg(not(feature = "google"))]
        Provider::Google => {
            return Err(BridgeError::AdapterUnavailable(
                "Google support not compiled in. Rebuild with --features google".into(),
            ));
        }
        #[cfg(feature = "ionq")]
        Provider::Ionq => Box::new(
            qbridge_adapter_ionq::IonqAdapter::new(config.ionq.clone(), config.poll)
                .map_err(qbridge_hal::HalError::from)?,
        ),
        #[cfg(not(feature = "ionq"))]
        Provider::Ionq => {
            return Err(BridgeError::AdapterUnavailable(
                "IonQ support not compiled in. Rebuild with --features ionq".into(),
            ));
        }
    };
    Ok(adapter)
}
