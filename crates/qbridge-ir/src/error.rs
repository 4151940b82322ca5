//! Error types for the IR crate.

use thiserror::Error;

/// A circuit that violates an IR invariant.
///
/// `gate` is the position of the offending gate, or `None` when the
/// violation concerns the circuit as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid circuit{}: {reason}", format_gate_context(.gate))]
pub struct ValidationError {
    /// Index of the offending gate, if any.
    pub gate: Option<usize>,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Error concerning the circuit as a whole.
    pub fn circuit(reason: impl Into<String>) -> Self {
        Self {
            gate: None,
            reason: reason.into(),
        }
    }

    /// Error concerning the gate at `index`.
    pub fn gate(index: usize, reason: impl Into<String>) -> Self {
        Self {
            gate: Some(index),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Circuit JSON could not be parsed.
    #[error("Failed to parse circuit: {0}")]
    Parse(#[from] serde_json::Error),

    /// Circuit failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[allow(clippy::ref_option)]
fn format_gate_context(gate: &Option<usize>) -> String {
    match gate {
        Some(index) => format!(" (gate {index})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::gate(3, "qubit 5 out of range");
        assert_eq!(
            err.to_string(),
            "Invalid circuit (gate 3): qubit 5 out of range"
        );

        let err = ValidationError::circuit("num_qubits must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid circuit: num_qubits must be at least 1"
        );
    }
}
