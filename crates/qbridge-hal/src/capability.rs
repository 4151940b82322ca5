//! Backend capability introspection.
//!
//! Each adapter advertises a [`Capabilities`] record. Translation consults it
//! before producing any vendor payload, so width and gate-support problems
//! surface as pre-submission errors.

use qbridge_ir::{Circuit, GateKind};
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};
use crate::provider::Provider;

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Whether this is a simulator (`true`) vs real hardware (`false`).
    pub is_simulator: bool,
}

impl Capabilities {
    /// Create capabilities for the local simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::all(),
            is_simulator: true,
        }
    }

    /// Create capabilities for a remote device.
    pub fn device(name: impl Into<String>, num_qubits: u32, gate_set: GateSet) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set,
            is_simulator: false,
        }
    }

    /// Check a circuit against this backend's width and gate set.
    ///
    /// Returns the first problem found: width first, then gates in program
    /// order.
    pub fn check(&self, circuit: &Circuit, provider: Provider) -> HalResult<()> {
        if circuit.num_qubits > self.num_qubits {
            return Err(HalError::CircuitTooLarge(format!(
                "circuit uses {} qubits, {} supports at most {}",
                circuit.num_qubits, self.name, self.num_qubits
            )));
        }
        for gate in &circuit.gates {
            if !self.gate_set.contains(&gate.kind) {
                return Err(HalError::UnsupportedGate {
                    gate: gate.name().to_string(),
                    provider,
                });
            }
        }
        Ok(())
    }
}

/// Gate kinds an adapter knows how to translate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet {
    gates: Vec<GateKind>,
}

impl GateSet {
    /// Every standard gate of the IR.
    pub fn all() -> Self {
        Self {
            gates: GateKind::STANDARD.to_vec(),
        }
    }

    /// A gate set from an explicit list.
    pub fn new(gates: impl IntoIterator<Item = GateKind>) -> Self {
        Self {
            gates: gates.into_iter().collect(),
        }
    }

    /// Whether the set contains a gate kind.
    ///
    /// Custom gates are never contained, whatever was passed to [`GateSet::new`].
    pub fn contains(&self, kind: &GateKind) -> bool {
        kind.is_standard() && self.gates.contains(kind)
    }

    /// Iterate over the gate kinds.
    pub fn iter(&self) -> impl Iterator<Item = &GateKind> {
        self.gates.iter()
    }

    /// Number of gate kinds.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
