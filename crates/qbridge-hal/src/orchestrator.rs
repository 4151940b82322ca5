//! Poll-until-terminal execution of remote jobs.
//!
//! Remote adapters implement [`VendorJobs`] and hand their jobs to
//! [`drive`], which owns the [`JobHandle`] state machine and the wait
//! bound. Waits are `interval` long, except that the last one is cut short
//! to end exactly on `max_wait`; the job times out only when the poll made
//! at the bound is still not terminal. With `max_wait = n × interval` a job
//! that never finishes is polled exactly `n` times.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapter::VendorCircuit;
use crate::error::HalResult;
use crate::job::{JobHandle, JobId, JobStatus, VendorStatus};
use crate::provider::Provider;
use crate::result::{Counts, ExecutionResult};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default wait bound.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Error recorded when a policy with a zero interval reaches [`drive`].
pub const ZERO_INTERVAL_ERROR: &str = "poll interval must be greater than zero";

/// Poll interval and wait bound, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Interval between polls.
    pub interval_ms: u64,
    /// Total wait bound.
    pub max_wait_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_WAIT)
    }
}

impl PollPolicy {
    /// Create a policy.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            max_wait_ms: max_wait.as_millis() as u64,
        }
    }

    /// A policy allowing exactly `n` polls at `interval`.
    pub fn intervals(interval: Duration, n: u32) -> Self {
        Self::new(interval, interval.saturating_mul(n))
    }

    /// Interval between polls.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Total wait bound.
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Results fetched for a completed vendor job.
#[derive(Debug, Clone, Default)]
pub struct VendorOutput {
    /// Normalized counts.
    pub counts: Counts,
    /// Backend the job ran on, when the vendor reports one.
    pub backend: Option<String>,
    /// Vendor-native result payload.
    pub raw: Option<serde_json::Value>,
}

impl VendorOutput {
    /// Output carrying counts only.
    pub fn new(counts: Counts) -> Self {
        Self {
            counts,
            ..Self::default()
        }
    }
}

/// The three vendor calls the orchestrator needs.
#[async_trait]
pub trait VendorJobs: Send + Sync {
    /// Provider these jobs run on.
    fn provider(&self) -> Provider;

    /// Backend name to record on results, if known before submission.
    fn backend_name(&self) -> Option<String> {
        None
    }

    /// Submit a translated circuit.
    async fn submit(&self, circuit: &VendorCircuit, shots: u32) -> HalResult<JobId>;

    /// Ask the vendor for the job's status.
    async fn poll(&self, job_id: &JobId) -> HalResult<VendorStatus>;

    /// Fetch and normalize the results of a completed job.
    async fn fetch(
        &self,
        job_id: &JobId,
        circuit: &VendorCircuit,
        shots: u32,
    ) -> HalResult<VendorOutput>;
}

/// Submit `circuit` and poll it to a terminal state.
///
/// Never fails: submission errors, vendor failures, transport errors and
/// timeouts are all recorded in the returned result. Jobs are never
/// resubmitted.
pub async fn drive<J>(
    jobs: &J,
    circuit: &VendorCircuit,
    shots: u32,
    policy: &PollPolicy,
) -> ExecutionResult
where
    J: VendorJobs + ?Sized,
{
    let provider = jobs.provider();
    let decorate = |result: ExecutionResult| match jobs.backend_name() {
        Some(backend) if result.backend.is_none() => result.with_backend(backend),
        _ => result,
    };

    let interval = policy.interval();
    if interval.is_zero() {
        warn!(%provider, "refusing to poll with a zero interval");
        return decorate(ExecutionResult::failure(
            provider,
            shots,
            ZERO_INTERVAL_ERROR,
        ));
    }

    let job_id = match jobs.submit(circuit, shots).await {
        Ok(id) => id,
        Err(e) => {
            warn!(%provider, error = %e, "job submission failed");
            return decorate(ExecutionResult::failure(provider, shots, e.to_string()));
        }
    };
    info!(%provider, job_id = %job_id, shots, "job submitted");

    let mut handle = JobHandle::new(job_id, policy.max_wait());

    loop {
        let Some(wait) = handle.next_wait(interval) else {
            handle.observe(JobStatus::TimedOut);
            warn!(
                %provider,
                job_id = %handle.vendor_job_id,
                polls = handle.polls(),
                elapsed_ms = handle.elapsed().as_millis() as u64,
                "job timed out"
            );
            return decorate(
                ExecutionResult::timeout(provider, shots)
                    .with_vendor_job_id(handle.vendor_job_id.as_str()),
            );
        };

        tokio::time::sleep(wait).await;
        handle.record_poll(wait);

        let status = match jobs.poll(&handle.vendor_job_id).await {
            Ok(status) => status,
            Err(e) => {
                handle.observe(JobStatus::Failed(e.to_string()));
                warn!(%provider, job_id = %handle.vendor_job_id, error = %e, "status poll failed");
                return decorate(
                    ExecutionResult::failure(provider, shots, e.to_string())
                        .with_vendor_job_id(handle.vendor_job_id.as_str()),
                );
            }
        };
        debug!(
            %provider,
            job_id = %handle.vendor_job_id,
            poll = handle.polls(),
            ?status,
            "polled job"
        );

        let message = match status {
            VendorStatus::Queued | VendorStatus::Running => {
                handle.observe(JobStatus::Running);
                continue;
            }
            VendorStatus::Completed => {
                return decorate(fetch_completed(jobs, &mut handle, circuit, shots).await);
            }
            VendorStatus::Failed(message) => message,
            VendorStatus::Cancelled => "job cancelled".to_string(),
        };

        handle.observe(JobStatus::Failed(message.clone()));
        info!(%provider, job_id = %handle.vendor_job_id, error = %message, "job failed");
        return decorate(
            ExecutionResult::failure(provider, shots, message)
                .with_vendor_job_id(handle.vendor_job_id.as_str()),
        );
    }
}

async fn fetch_completed<J>(
    jobs: &J,
    handle: &mut JobHandle,
    circuit: &VendorCircuit,
    shots: u32,
) -> ExecutionResult
where
    J: VendorJobs + ?Sized,
{
    let provider = jobs.provider();
    match jobs.fetch(&handle.vendor_job_id, circuit, shots).await {
        Ok(output) => {
            handle.observe(JobStatus::Done);
            info!(
                %provider,
                job_id = %handle.vendor_job_id,
                polls = handle.polls(),
                outcomes = output.counts.len(),
                "job completed"
            );
            let mut result = ExecutionResult::success(provider, output.counts, shots)
                .with_vendor_job_id(handle.vendor_job_id.as_str());
            if let Some(backend) = output.backend {
                result = result.with_backend(backend);
            }
            if let Some(raw) = output.raw {
                result = result.with_raw(raw);
            }
            result
        }
        Err(e) => {
            handle.observe(JobStatus::Failed(e.to_string()));
            warn!(%provider, job_id = %handle.vendor_job_id, error = %e, "result fetch failed");
            ExecutionResult::failure(provider, shots, e.to_string())
                .with_vendor_job_id(handle.vendor_job_id.as_str())
        }
    }
}
