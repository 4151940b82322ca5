//! The provider adapter trait and translated circuit types.
//!
//! ```text
//!   capabilities() ──→ translate() ──→ execute()
//!    (sync, &ref)        (sync)         (async, infallible)
//! ```
//!
//! - `translate` is the last point at which a fatal error may occur. It
//!   rejects circuits the provider cannot run and produces a
//!   [`VendorCircuit`] with one native op per source gate.
//! - `execute` never returns an error. Anything that goes wrong after
//!   submission is recorded in the [`ExecutionResult`].

use async_trait::async_trait;
use qbridge_ir::Circuit;
use serde::{Deserialize, Serialize};

use crate::capability::{Capabilities, GateSet};
use crate::error::HalResult;
use crate::provider::Provider;
use crate::result::ExecutionResult;

/// One vendor-native operation.
///
/// Qubit targets are those of the source gate, in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeOp {
    /// Vendor's name for the operation.
    pub name: String,
    /// Target qubits.
    pub qubits: Vec<u32>,
    /// Angle parameters in radians.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
}

impl NativeOp {
    /// Create an operation without parameters.
    pub fn new(name: impl Into<String>, qubits: impl Into<Vec<u32>>) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.into(),
            params: Vec::new(),
        }
    }

    /// Attach an angle parameter.
    pub fn with_param(mut self, param: f64) -> Self {
        self.params.push(param);
        self
    }
}

/// The wire form a vendor receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "body", rename_all = "lowercase")]
pub enum VendorPayload {
    /// Executed in process from the op list.
    Native,
    /// OpenQASM program text.
    Qasm(String),
    /// JSON document.
    Json(serde_json::Value),
}

/// A circuit translated for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorCircuit {
    /// Provider the circuit was translated for.
    pub provider: Provider,
    /// Register width, equal to the source circuit's.
    pub num_qubits: u32,
    /// Native operations, one per source gate, in program order.
    pub ops: Vec<NativeOp>,
    /// Wire payload.
    pub payload: VendorPayload,
}

impl VendorCircuit {
    /// Number of native operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether there are no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// A backend the bridge can dispatch circuits to.
///
/// Implementations are selected once, at bridge construction, and are
/// shared read-only across jobs.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider this adapter serves.
    fn provider(&self) -> Provider;

    /// Human-readable adapter name.
    fn name(&self) -> &str;

    /// Capabilities, cached at construction time.
    fn capabilities(&self) -> &Capabilities;

    /// Gate kinds this adapter can translate.
    fn gate_set(&self) -> &GateSet {
        &self.capabilities().gate_set
    }

    /// Translate a validated circuit into the vendor's form.
    ///
    /// Fails with `UnsupportedGate` or `CircuitTooLarge`; nothing has been
    /// sent to the vendor at that point.
    fn translate(&self, circuit: &Circuit) -> HalResult<VendorCircuit>;

    /// Run a translated circuit to completion.
    async fn execute(&self, circuit: &VendorCircuit, shots: u32) -> ExecutionResult;
}
