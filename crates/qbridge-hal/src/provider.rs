//! Provider selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HalError;

/// The closed set of execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local in-process statevector simulator.
    #[default]
    Simulator,
    /// IBM Quantum (vendor A, enterprise QPU cloud).
    Ibm,
    /// Google Quantum Engine (vendor B, research QPU cloud).
    Google,
    /// IonQ (vendor C, REST QPU).
    Ionq,
}

impl Provider {
    /// All providers.
    pub const ALL: [Provider; 4] = [
        Provider::Simulator,
        Provider::Ibm,
        Provider::Google,
        Provider::Ionq,
    ];

    /// Canonical provider name, as written into receipts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Simulator => "simulator",
            Provider::Ibm => "ibm",
            Provider::Google => "google",
            Provider::Ionq => "ionq",
        }
    }

    /// Whether jobs on this provider leave the process.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Provider::Simulator)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulator" | "sim" | "qiskit_simulator" | "local" => Ok(Provider::Simulator),
            "ibm" | "ibmq" | "ibm_quantum" | "vendor-a" => Ok(Provider::Ibm),
            "google" | "cirq" | "quantum_engine" | "vendor-b" => Ok(Provider::Google),
            "ionq" | "vendor-c" => Ok(Provider::Ionq),
            other => Err(HalError::Configuration(format!(
                "Unknown provider: '{other}'. Available: simulator, ibm, google, ionq"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_aliases() {
        assert_eq!("qiskit_simulator".parse::<Provider>().unwrap(), Provider::Simulator);
        assert_eq!("IBM".parse::<Provider>().unwrap(), Provider::Ibm);
        assert_eq!("vendor-b".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!(" ionq ".parse::<Provider>().unwrap(), Provider::Ionq);
        assert!("dwave".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }
}
