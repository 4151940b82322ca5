//! Job lifecycle types.
//!
//! The bridge-side state machine:
//!
//! ```text
//!   submit() ──→ Submitted ──→ Running ──→ Done
//!                    │            │
//!                    │            ├──→ Failed(reason)
//!                    │            │
//!                    └────────────┴──→ TimedOut
//! ```
//!
//! **Invariants:**
//! - Transitions are monotonic; a job never moves backward.
//! - Terminal states (`Done`, `Failed`, `TimedOut`) are permanent.
//! - `elapsed` never exceeds `max_wait`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier assigned to a job by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Bridge-side status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted by the vendor, not yet observed running.
    Submitted,
    /// Observed queued or running at the vendor.
    Running,
    /// Completed and results fetched.
    Done,
    /// Failed with the vendor's message.
    Failed(String),
    /// Exceeded the wait bound.
    TimedOut,
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed(_) | JobStatus::TimedOut
        )
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Submitted => 0,
            JobStatus::Running => 1,
            JobStatus::Done | JobStatus::Failed(_) | JobStatus::TimedOut => 2,
        }
    }
}

/// Status as reported by a vendor poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorStatus {
    /// Waiting in the vendor queue.
    Queued,
    /// Executing.
    Running,
    /// Finished; results can be fetched.
    Completed,
    /// Failed, with the vendor's message.
    Failed(String),
    /// Cancelled at the vendor.
    Cancelled,
}

/// Tracks one in-flight job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    /// Vendor job identifier.
    pub vendor_job_id: JobId,
    status: JobStatus,
    elapsed: Duration,
    max_wait: Duration,
    polls: u32,
}

impl JobHandle {
    /// A freshly submitted job.
    pub fn new(vendor_job_id: JobId, max_wait: Duration) -> Self {
        Self {
            vendor_job_id,
            status: JobStatus::Submitted,
            elapsed: Duration::ZERO,
            max_wait,
            polls: 0,
        }
    }

    /// Current status.
    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Time spent waiting so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Wait bound.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Number of polls issued.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// How long to wait before the next poll, or `None` once the bound
    /// has been used up. The last wait is shortened to end on the bound.
    pub fn next_wait(&self, interval: Duration) -> Option<Duration> {
        let remaining = self.max_wait.saturating_sub(self.elapsed);
        if remaining.is_zero() {
            return None;
        }
        Some(interval.min(remaining))
    }

    /// Record a wait of `waited` followed by a poll.
    pub fn record_poll(&mut self, waited: Duration) {
        self.elapsed = self.elapsed.saturating_add(waited).min(self.max_wait);
        self.polls += 1;
    }

    /// Move to `next`, ignoring backward transitions and anything after a
    /// terminal state. Returns whether the status changed.
    pub fn observe(&mut self, next: JobStatus) -> bool {
        if self.status.is_terminal() || next.rank() < self.status.rank() || next == self.status {
            return false;
        }
        self.status = next;
        true
    }
}
