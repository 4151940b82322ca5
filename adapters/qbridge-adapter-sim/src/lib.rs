//! qbridge Local Statevector Simulator
//!
//! In-process backend for testing and small experiments. Each job builds
//! the statevector once and samples it `shots` times, so results carry
//! sampling noise but no hardware noise.
//!
//! # Performance
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//!
//! The default qubit ceiling is 20.
//!
//! # Example
//!
//! ```
//! use qbridge_adapter_sim::SimulatorAdapter;
//! use qbridge_hal::ProviderAdapter;
//! use qbridge_ir::Circuit;
//!
//! let adapter = SimulatorAdapter::new().with_seed(7);
//! let vendor = adapter.translate(&Circuit::bell()).unwrap();
//! assert_eq!(vendor.ops.len(), 2);
//!
//! // Inside an async context:
//! // let result = adapter.execute(&vendor, 1024).await;
//! // Expect ~50% "00" and ~50% "11".
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, QUBIT_LIMIT, SimulatorAdapter, SimulatorConfig};
