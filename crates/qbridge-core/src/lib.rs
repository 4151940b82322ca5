//! qbridge Core
//!
//! The single entry point for running a circuit on a quantum provider and
//! getting back a tamper-evident [`Receipt`].
//!
//! # Overview
//!
//! A [`QuantumBridge`] is built from a [`BridgeConfig`]. It owns one adapter
//! for the configured [`Provider`] and, optionally, a [`ProofClient`] that
//! forwards every receipt to an external proof service.
//!
//! Each call to [`QuantumBridge::run`]:
//!
//! 1. validates the circuit and shot count,
//! 2. translates the circuit into the provider's vocabulary,
//! 3. executes it (submit, poll until terminal, fetch counts),
//! 4. seals the result into a [`Receipt`] with a SHA-256 digest.
//!
//! Steps 1 and 2 fail with a [`BridgeError`]. Once a job has been handed to
//! a provider, failures are recorded in the receipt instead.
//!
//! # Example
//!
//! ```
//! use qbridge_core::{BridgeConfig, Circuit, QuantumBridge};
//!
//! let bridge = QuantumBridge::new(BridgeConfig::default()).unwrap();
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build().unwrap();
//! let receipt = runtime
//!     .block_on(bridge.run(&Circuit::bell(), 100, "job-42"))
//!     .unwrap();
//!
//! assert!(receipt.success);
//! assert_eq!(receipt.counts.total_shots(), 100);
//! assert!(receipt.is_valid());
//! ```
//!
//! # Vendor Features
//!
//! The simulator is always available. Remote vendors are behind the `ibm`,
//! `google` and `ionq` features (all enabled by default). Selecting a
//! provider whose feature is off yields [`BridgeError::AdapterUnavailable`].

mod bridge;
mod config;
mod error;
mod proof;

pub use bridge::{ExecutionRequest, QuantumBridge};
pub use config::{BridgeConfig, DEFAULT_SHOTS};
pub use error::{BridgeError, BridgeResult};
pub use proof::{PROOF_TIMEOUT, PROOF_TYPE, ProofClient, ProofError};

pub use qbridge_hal::{Counts, ExecutionResult, PollPolicy, Provider};
pub use qbridge_ir::Circuit;
pub use qbridge_receipt::Receipt;
