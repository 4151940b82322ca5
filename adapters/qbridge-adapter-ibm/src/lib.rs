//! IBM Quantum adapter for qbridge.
//!
//! Translates circuits to OpenQASM 3.0, submits them through the Sampler
//! primitive and normalizes the per-shot samples into counts.
//!
//! # Authentication
//!
//! A bearer token is required, usually from `IBM_QUANTUM_API_KEY`:
//!
//! ```ignore
//! use qbridge_adapter_ibm::{IbmAdapter, IbmConfig};
//! use qbridge_hal::PollPolicy;
//!
//! let config = IbmConfig {
//!     token: Some(std::env::var("IBM_QUANTUM_API_KEY")?),
//!     backend: "ibm_torino".into(),
//!     ..IbmConfig::default()
//! };
//! let adapter = IbmAdapter::new(config, PollPolicy::default())?;
//! ```
//!
//! # Backend resolution
//!
//! On each execution the adapter lists the account's backends. When the
//! configured backend is missing it falls back to `fallback_backend`
//! (`ibmq_qasm_simulator` unless overridden).

mod api;
mod backend;
mod error;
mod qasm;

pub use api::{BackendInfo, DEFAULT_ENDPOINT, IbmClient};
pub use backend::{DEFAULT_BACKEND, IbmAdapter, IbmConfig};
pub use error::{IbmError, IbmResult};
