//! qbridge Hardware Abstraction Layer
//!
//! This crate provides the provider-neutral contract between the bridge and
//! its backends: the [`ProviderAdapter`] trait, the normalized
//! [`ExecutionResult`], and the poll-until-terminal orchestrator that every
//! remote adapter runs its jobs through.
//!
//! # Overview
//!
//! - [`ProviderAdapter`]: `translate` a [`Circuit`](qbridge_ir::Circuit) into a
//!   [`VendorCircuit`], then `execute` it. Execution never fails with an
//!   error; vendor failures are captured in the returned result.
//! - [`orchestrator::drive`]: the `Submitted → Running → {Done, Failed,
//!   TimedOut}` state machine, bounded by a [`PollPolicy`].
//! - [`HalError`]: the fatal, pre-submission error taxonomy.
//!
//! # Supported Providers
//!
//! | Provider | Crate | Authentication |
//! |----------|-------|----------------|
//! | Local simulator | `qbridge-adapter-sim` | None |
//! | IBM Quantum | `qbridge-adapter-ibm` | API token |
//! | Google Quantum Engine | `qbridge-adapter-google` | OAuth bearer token |
//! | IonQ | `qbridge-adapter-ionq` | API key |
//!
//! # Implementing a Remote Adapter
//!
//! ```ignore
//! use qbridge_hal::{
//!     orchestrator, ExecutionResult, HalResult, JobId, PollPolicy, Provider,
//!     VendorCircuit, VendorJobs, VendorOutput, VendorStatus,
//! };
//! use async_trait::async_trait;
//!
//! struct MyVendor { poll: PollPolicy }
//!
//! #[async_trait]
//! impl VendorJobs for MyVendor {
//!     fn provider(&self) -> Provider { Provider::Ionq }
//!
//!     async fn submit(&self, circuit: &VendorCircuit, shots: u32) -> HalResult<JobId> {
//!         # todo!()
//!     }
//!
//!     async fn poll(&self, job_id: &JobId) -> HalResult<VendorStatus> {
//!         # todo!()
//!     }
//!
//!     async fn fetch(
//!         &self,
//!         job_id: &JobId,
//!         circuit: &VendorCircuit,
//!         shots: u32,
//!     ) -> HalResult<VendorOutput> {
//!         # todo!()
//!     }
//! }
//!
//! // inside ProviderAdapter::execute:
//! // orchestrator::drive(&vendor, circuit, shots, &vendor.poll).await
//! ```

pub mod adapter;
pub mod capability;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod provider;
pub mod result;

pub use adapter::{NativeOp, ProviderAdapter, VendorCircuit, VendorPayload};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{JobHandle, JobId, JobStatus, VendorStatus};
pub use orchestrator::{PollPolicy, VendorJobs, VendorOutput};
pub use provider::Provider;
pub use result::{Counts, ExecutionResult, TIMEOUT_ERROR};
