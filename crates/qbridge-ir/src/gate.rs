//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gate kinds understood by the bridge.
///
/// Serialized as the lowercase gate name (`"h"`, `"cx"`, ...). Names the IR
/// does not know deserialize into [`GateKind::Custom`] so that they reach
/// validation instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GateKind {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Controlled-X (CNOT) gate. Qubits are `[control, target]`.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// Rotation around Z axis.
    Rz,
    /// Rotation around Y axis.
    Ry,
    /// A gate name with no IR semantics.
    Custom(String),
}

impl GateKind {
    /// Every gate kind with known semantics.
    pub const STANDARD: [GateKind; 6] = [
        GateKind::H,
        GateKind::X,
        GateKind::CX,
        GateKind::CZ,
        GateKind::Rz,
        GateKind::Ry,
    ];

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::CX => "cx",
            GateKind::CZ => "cz",
            GateKind::Rz => "rz",
            GateKind::Ry => "ry",
            GateKind::Custom(name) => name,
        }
    }

    /// Number of qubits the gate acts on, or `None` for custom gates.
    #[inline]
    pub fn num_qubits(&self) -> Option<usize> {
        match self {
            GateKind::H | GateKind::X | GateKind::Rz | GateKind::Ry => Some(1),
            GateKind::CX | GateKind::CZ => Some(2),
            GateKind::Custom(_) => None,
        }
    }

    /// Whether the gate takes a rotation angle.
    #[inline]
    pub fn is_rotation(&self) -> bool {
        matches!(self, GateKind::Rz | GateKind::Ry)
    }

    /// Whether the gate has known semantics.
    #[inline]
    pub fn is_standard(&self) -> bool {
        !matches!(self, GateKind::Custom(_))
    }
}

impl From<String> for GateKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "h" => GateKind::H,
            "x" => GateKind::X,
            "cx" => GateKind::CX,
            "cz" => GateKind::CZ,
            "rz" => GateKind::Rz,
            "ry" => GateKind::Ry,
            _ => GateKind::Custom(name),
        }
    }
}

impl From<&str> for GateKind {
    fn from(name: &str) -> Self {
        GateKind::from(name.to_string())
    }
}

impl From<GateKind> for String {
    fn from(kind: GateKind) -> Self {
        match kind {
            GateKind::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A gate applied to an ordered list of qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// Which gate.
    #[serde(rename = "type")]
    pub kind: GateKind,
    /// Qubit operands, in gate order.
    pub qubits: Vec<u32>,
    /// Rotation angle in radians (rotation gates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

impl Gate {
    /// Create a gate without an angle.
    pub fn new(kind: GateKind, qubits: impl Into<Vec<u32>>) -> Self {
        Self {
            kind,
            qubits: qubits.into(),
            angle: None,
        }
    }

    /// Create a rotation gate.
    pub fn rotation(kind: GateKind, qubit: u32, angle: f64) -> Self {
        Self {
            kind,
            qubits: vec![qubit],
            angle: Some(angle),
        }
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }
}
