//! IonQ adapter for qbridge.
//!
//! Submits circuits to the IonQ v0.3 jobs API in the `ionq.circuit.v0`
//! format and scales the returned probability histogram to counts.
//!
//! # Supported gates
//!
//! `h`, `x`, `cx` (as `cnot`), `rz` and `ry`. `cz` is rejected at
//! translation time.
//!
//! # Example
//!
//! ```ignore
//! use qbridge_adapter_ionq::{IonqAdapter, IonqConfig};
//! use qbridge_hal::PollPolicy;
//!
//! let config = IonqConfig {
//!     api_key: Some(std::env::var("IONQ_API_KEY")?),
//!     target: "simulator".into(),
//!     ..IonqConfig::default()
//! };
//! let adapter = IonqAdapter::new(config, PollPolicy::default())?;
//! ```

mod api;
mod backend;
mod error;

pub use api::{CIRCUIT_FORMAT, DEFAULT_ENDPOINT, IonqClient};
pub use backend::{DEFAULT_TARGET, IonqAdapter, IonqConfig, gate_set};
pub use error::{IonqError, IonqResult};
