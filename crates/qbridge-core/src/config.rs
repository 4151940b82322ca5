//! Bridge configuration.
//!
//! Supports loading configuration from:
//! 1. A YAML file
//! 2. Environment variables
//!
//! Environment variables override file values; absent variables leave the
//! file (or default) values unchanged. Configuration is read once, when the
//! bridge is built.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use qbridge_adapter_sim::{QUBIT_LIMIT, SimulatorConfig};
use qbridge_hal::{PollPolicy, Provider};

#[cfg(feature = "google")]
use qbridge_adapter_google::GoogleConfig;
#[cfg(feature = "ibm")]
use qbridge_adapter_ibm::IbmConfig;
#[cfg(feature = "ionq")]
use qbridge_adapter_ionq::IonqConfig;

use crate::error::{BridgeError, BridgeResult};

/// Shots used when the caller does not choose.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Complete bridge configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Provider every job of this bridge runs on.
    pub provider: Provider,

    /// Shots used when the caller does not choose.
    pub default_shots: u32,

    /// Poll policy shared by the remote adapters.
    pub poll: PollPolicy,

    /// Proof service base URL. `None` disables the handoff.
    pub proof_service_url: Option<String>,

    /// Local simulator settings.
    pub simulator: SimulatorConfig,

    /// IBM Quantum settings.
    #[cfg(feature = "ibm")]
    pub ibm: IbmConfig,

    /// Google Quantum Engine settings.
    #[cfg(feature = "google")]
    pub google: GoogleConfig,

    /// IonQ settings.
    #[cfg(feature = "ionq")]
    pub ionq: IonqConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Simulator,
            default_shots: DEFAULT_SHOTS,
            poll: PollPolicy::default(),
            proof_service_url: None,
            simulator: SimulatorConfig::default(),
            #[cfg(feature = "ibm")]
            ibm: IbmConfig::default(),
            #[cfg(feature = "google")]
            google: GoogleConfig::default(),
            #[cfg(feature = "ionq")]
            ionq: IonqConfig::default(),
        }
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("BridgeConfig");
        s.field("provider", &self.provider)
            .field("default_shots", &self.default_shots)
            .field("poll", &self.poll)
            .field("proof_service_url", &self.proof_service_url)
            .field("simulator", &self.simulator);
        // Vendor configs redact their own secrets.
        #[cfg(feature = "ibm")]
        s.field("ibm", &self.ibm);
        #[cfg(feature = "google")]
        s.field("google", &self.google);
        #[cfg(feature = "ionq")]
        s.field("ionq", &self.ionq);
        s.finish()
    }
}

impl BridgeConfig {
    /// Configuration for `provider` with everything else defaulted.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> BridgeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| BridgeError::Config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> BridgeResult<Self> {
        Self::default().merge_env()
    }

    /// Load configuration with the following precedence:
    /// 1. Environment variables
    /// 2. Configuration file, if given
    /// 3. Default values
    pub fn load(config_file: Option<&Path>) -> BridgeResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.merge_env()
    }

    /// Apply environment overrides from the process environment.
    pub fn merge_env(self) -> BridgeResult<Self> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `var`.
    ///
    /// Recognized names: `QPU_PROVIDER`, `PROOF_SERVICE_URL`,
    /// `IBM_QUANTUM_URL`, `IBM_QUANTUM_API_KEY`, `IBM_QUANTUM_BACKEND`,
    /// `GOOGLE_QUANTUM_URL`, `GOOGLE_QUANTUM_PROJECT`,
    /// `GOOGLE_QUANTUM_PROCESSOR`, `GOOGLE_QUANTUM_TOKEN`, `IONQ_API_URL`,
    /// `IONQ_API_KEY`.
    pub fn merge_vars<F>(mut self, var: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("QPU_PROVIDER") {
            self.provider = v.parse().map_err(|e: qbridge_hal::HalError| {
                BridgeError::Config(e.to_string())
            })?;
        }
        if let Some(v) = var("PROOF_SERVICE_URL") {
            self.proof_service_url = Some(v).filter(|url| !url.is_empty());
        }

        #[cfg(feature = "ibm")]
        {
            if let Some(v) = var("IBM_QUANTUM_URL") {
                self.ibm.endpoint = v;
            }
            if let Some(v) = var("IBM_QUANTUM_API_KEY") {
                self.ibm.token = Some(v);
            }
            if let Some(v) = var("IBM_QUANTUM_BACKEND") {
                self.ibm.backend = v;
            }
        }

        #[cfg(feature = "google")]
        {
            if let Some(v) = var("GOOGLE_QUANTUM_URL") {
                self.google.endpoint = v;
            }
            if let Some(v) = var("GOOGLE_QUANTUM_PROJECT") {
                self.google.project_id = Some(v);
            }
            if let Some(v) = var("GOOGLE_QUANTUM_PROCESSOR") {
                self.google.processor = v;
            }
            if let Some(v) = var("GOOGLE_QUANTUM_TOKEN") {
                self.google.token = Some(v);
            }
        }

        #[cfg(feature = "ionq")]
        {
            if let Some(v) = var("IONQ_API_URL") {
                self.ionq.endpoint = v;
            }
            if let Some(v) = var("IONQ_API_KEY") {
                self.ionq.api_key = Some(v);
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.default_shots == 0 {
            return Err(BridgeError::Config(
                "default_shots must be greater than 0".to_string(),
            ));
        }
        check_poll("poll", &self.poll)?;
        #[cfg(feature = "ibm")]
        if let Some(poll) = &self.ibm.poll {
            check_poll("ibm.poll", poll)?;
        }
        #[cfg(feature = "google")]
        if let Some(poll) = &self.google.poll {
            check_poll("google.poll", poll)?;
        }
        #[cfg(feature = "ionq")]
        if let Some(poll) = &self.ionq.poll {
            check_poll("ionq.poll", poll)?;
        }
        if self.simulator.max_qubits == 0 {
            return Err(BridgeError::Config(
                "simulator.max_qubits must be greater than 0".to_string(),
            ));
        }
        if self.simulator.max_qubits > QUBIT_LIMIT {
            return Err(BridgeError::Config(format!(
                "simulator.max_qubits must be at most {QUBIT_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Proof service base URL, if the handoff is enabled.
    pub fn proof_service_url(&self) -> Option<&str> {
        self.proof_service_url.as_deref()
    }
}

fn check_poll(name: &str, poll: &PollPolicy) -> BridgeResult<()> {
    if poll.interval_ms == 0 {
        return Err(BridgeError::Config(format!(
            "{name}.interval_ms must be greater than 0"
        )));
    }
    Ok(())
}
