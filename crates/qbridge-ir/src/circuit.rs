//! Circuit type, builder API and validation.

use serde::{Deserialize, Serialize};

use crate::error::{IrResult, ValidationError};
use crate::gate::{Gate, GateKind};

/// A quantum circuit: a qubit count plus an ordered gate list.
///
/// Measurement is implicit: every backend measures all qubits once the gate
/// list has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits in the register.
    pub num_qubits: u32,
    /// Gates in application order.
    #[serde(default)]
    pub gates: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit on `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Parse a circuit from its JSON wire format.
    ///
    /// Parsing does not validate; call [`Circuit::validate`] before use.
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append an arbitrary gate.
    pub fn push(&mut self, gate: Gate) -> &mut Self {
        self.gates.push(gate);
        self
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: u32) -> &mut Self {
        self.push(Gate::new(GateKind::H, [qubit]))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: u32) -> &mut Self {
        self.push(Gate::new(GateKind::X, [qubit]))
    }

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: u32, target: u32) -> &mut Self {
        self.push(Gate::new(GateKind::CX, [control, target]))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: u32, target: u32) -> &mut Self {
        self.push(Gate::new(GateKind::CZ, [control, target]))
    }

    /// Apply Rz rotation.
    pub fn rz(&mut self, theta: f64, qubit: u32) -> &mut Self {
        self.push(Gate::rotation(GateKind::Rz, qubit, theta))
    }

    /// Apply Ry rotation.
    pub fn ry(&mut self, theta: f64, qubit: u32) -> &mut Self {
        self.push(Gate::rotation(GateKind::Ry, qubit, theta))
    }

    /// Check the circuit against the IR invariants. See [`validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }

    /// Create a Bell state circuit: `H(0)`, `CX(0, 1)`.
    ///
    /// This is also the default circuit when a caller supplies none.
    pub fn bell() -> Self {
        let mut circuit = Self::new(2);
        circuit.h(0).cx(0, 1);
        circuit
    }

    /// Create a GHZ state circuit on `n` qubits.
    pub fn ghz(n: u32) -> Self {
        let mut circuit = Self::new(n);
        if n == 0 {
            return circuit;
        }

        circuit.h(0);
        for i in 0..n - 1 {
            circuit.cx(i, i + 1);
        }
        circuit
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::bell()
    }
}

/// Validate a circuit.
///
/// Checks, stopping at the first violation in gate order:
/// - `num_qubits >= 1`
/// - the gate kind is known
/// - the gate has exactly as many qubits as its arity
/// - every qubit index is `< num_qubits`
/// - qubit indices are distinct within the gate
/// - rotation gates carry a finite `angle`
pub fn validate(circuit: &Circuit) -> Result<(), ValidationError> {
    if circuit.num_qubits == 0 {
        return Err(ValidationError::circuit("num_qubits must be at least 1"));
    }

    for (index, gate) in circuit.gates.iter().enumerate() {
        validate_gate(index, gate, circuit.num_qubits)?;
    }

    Ok(())
}

fn validate_gate(index: usize, gate: &Gate, num_qubits: u32) -> Result<(), ValidationError> {
    let Some(arity) = gate.kind.num_qubits() else {
        return Err(ValidationError::gate(
            index,
            format!("unknown gate kind '{}'", gate.kind),
        ));
    };

    if gate.qubits.len() != arity {
        return Err(ValidationError::gate(
            index,
            format!(
                "gate '{}' requires {} qubit(s), got {}",
                gate.kind,
                arity,
                gate.qubits.len()
            ),
        ));
    }

    for (pos, &qubit) in gate.qubits.iter().enumerate() {
        if qubit >= num_qubits {
            return Err(ValidationError::gate(
                index,
                format!(
                    "qubit {qubit} out of range for {num_qubits}-qubit circuit (gate '{}')",
                    gate.kind
                ),
            ));
        }
        if gate.qubits[..pos].contains(&qubit) {
            return Err(ValidationError::gate(
                index,
                format!("duplicate qubit {qubit} in gate '{}'", gate.kind),
            ));
        }
    }

    if gate.kind.is_rotation() {
        match gate.angle {
            None => {
                return Err(ValidationError::gate(
                    index,
                    format!("rotation gate '{}' requires an angle", gate.kind),
                ));
            }
            Some(angle) if !angle.is_finite() => {
                return Err(ValidationError::gate(
                    index,
                    format!("rotation gate '{}' has non-finite angle", gate.kind),
                ));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IrError;

    #[test]
    fn test_bell_circuit() {
        let circuit = Circuit::bell();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.gates[0].kind, GateKind::H);
        assert_eq!(circuit.gates[1].qubits, vec![0, 1]);
        assert!(circuit.validate().is_ok());
    }

    #[test]
    fn test_ghz_circuit() {
        let circuit = Circuit::ghz(4);
        assert_eq!(circuit.len(), 4);
        assert!(circuit.validate().is_ok());
    }

    #[test]
    fn test_bell_from_json() {
        let json = r#"{
            "num_qubits": 2,
            "gates": [
                {"type": "h", "qubits": [0]},
                {"type": "cx", "qubits": [0, 1]}
            ]
        }"#;
        let circuit = Circuit::from_json(json).unwrap();
        assert_eq!(circuit, Circuit::bell());
    }

    #[test]
    fn test_missing_gates_is_empty_circuit() {
        let circuit = Circuit::from_json(r#"{"num_qubits": 1}"#).unwrap();
        assert!(circuit.is_empty());
        assert!(circuit.validate().is_ok());
    }

    #[test]
    fn test_negative_qubit_is_parse_error() {
        let err = Circuit::from_json(r#"{"num_qubits": 2, "gates": [{"type": "h", "qubits": [-1]}]}"#)
            .unwrap_err();
        assert!(matches!(err, IrError::Parse(_)));
    }

    #[test]
    fn test_zero_qubits_rejected() {
        let err = Circuit::new(0).validate().unwrap_err();
        assert_eq!(err.gate, None);
    }

    #[test]
    fn test_unknown_gate_rejected() {
        let circuit =
            Circuit::from_json(r#"{"num_qubits": 2, "gates": [{"type": "swap", "qubits": [0, 1]}]}"#)
                .unwrap();
        let err = circuit.validate().unwrap_err();
        assert_eq!(err.gate, Some(0));
        assert!(err.reason.contains("swap"));
    }

    #[test]
    fn test_out_of_range_qubit_rejected() {
        let mut circuit = Circuit::new(2);
        circuit.h(0).cx(1, 2);
        let err = circuit.validate().unwrap_err();
        assert_eq!(err.gate, Some(1));
        assert!(err.reason.contains("out of range"));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::new(2);
        circuit.cx(1, 1);
        let err = circuit.validate().unwrap_err();
        assert!(err.reason.contains("duplicate"));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let mut circuit = Circuit::new(3);
        circuit.push(Gate::new(GateKind::CX, [0, 1, 2]));
        let err = circuit.validate().unwrap_err();
        assert!(err.reason.contains("requires 2"));

        let mut circuit = Circuit::new(2);
        circuit.push(Gate::new(GateKind::H, [0, 1]));
        assert!(circuit.validate().is_err());
    }

    #[test]
    fn test_rotation_requires_angle() {
        let mut circuit = Circuit::new(1);
        circuit.push(Gate::new(GateKind::Rz, [0]));
        let err = circuit.validate().unwrap_err();
        assert!(err.reason.contains("requires an angle"));

        let mut circuit = Circuit::new(1);
        circuit.ry(f64::NAN, 0);
        assert!(circuit.validate().is_err());
    }

    #[test]
    fn test_first_violation_wins() {
        let mut circuit = Circuit::new(2);
        circuit
            .h(0)
            .push(Gate::new(GateKind::Ry, [0]))
            .push(Gate::new(GateKind::from("swap"), [0, 1]));
        let err = circuit.validate().unwrap_err();
        assert_eq!(err.gate, Some(1));
    }

    #[test]
    fn test_json_round_trip_preserves_angle() {
        let mut circuit = Circuit::new(1);
        circuit.rz(1.5, 0);
        let json = circuit.to_json().unwrap();
        assert_eq!(Circuit::from_json(&json).unwrap(), circuit);
    }
}
