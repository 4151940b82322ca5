//! Google Quantum Engine adapter for qbridge.
//!
//! Circuits are laid out as Cirq-style moments on a single row of grid
//! qubits (`0_0`, `0_1`, ...) and measured as one register under key `m`.
//! Per-shot measurement records are normalized into counts; the engine's
//! result document is kept on [`ExecutionResult::raw`](qbridge_hal::ExecutionResult).
//!
//! # Example
//!
//! ```ignore
//! use qbridge_adapter_google::{GoogleAdapter, GoogleConfig};
//! use qbridge_hal::{PollPolicy, ProviderAdapter};
//! use qbridge_ir::Circuit;
//!
//! let config = GoogleConfig {
//!     project_id: Some("my-project".into()),
//!     token: Some(std::env::var("GOOGLE_QUANTUM_TOKEN")?),
//!     ..GoogleConfig::default()
//! };
//! let adapter = GoogleAdapter::new(config, PollPolicy::default())?;
//! let vendor = adapter.translate(&Circuit::bell())?;
//! let result = adapter.execute(&vendor, 1000).await;
//! ```
//!
//! Jobs go through the [`EngineSampler`] trait; [`EngineClient`] is the REST
//! implementation.

mod backend;
pub mod cirq;
mod engine;
mod error;

pub use backend::{GoogleAdapter, GoogleConfig};
pub use engine::{
    DEFAULT_ENDPOINT, DEFAULT_PROCESSOR, EngineClient, EngineSampler, ExecutionStatus, Failure,
};
pub use error::{GoogleError, GoogleResult};
