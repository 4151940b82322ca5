//! Execution result types.
//!
//! Bitstring ordering: the rightmost bit corresponds to qubit 0. The string
//! `"01"` means qubit 0 measured `1` and qubit 1 measured `0`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::provider::Provider;

/// Error string recorded when a job exceeds its wait bound.
pub const TIMEOUT_ERROR: &str = "timeout";

/// Measurement counts from circuit execution.
///
/// Maps bitstrings to occurrence counts. Iteration and serialization order
/// are lexicographic by bitstring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from an iterator of (bitstring, count) pairs.
    /// Duplicate bitstrings are accumulated, consistent with `insert()`.
    pub fn from_pairs(iter: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Apportion `shots` over a probability distribution.
    ///
    /// Negative and non-finite weights count as zero and the rest are
    /// normalized, so the result always sums to exactly `shots`. Rounding
    /// uses largest remainders; equal remainders go to the smaller
    /// bitstring. An all-zero distribution yields empty counts.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_distribution(
        distribution: impl IntoIterator<Item = (impl Into<String>, f64)>,
        shots: u64,
    ) -> Self {
        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        for (bitstring, weight) in distribution {
            let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
            *weights.entry(bitstring.into()).or_default() += weight;
        }

        let total: f64 = weights.values().sum();
        if shots == 0 || total <= 0.0 {
            return Self::new();
        }

        let mut shares: Vec<(String, u64, f64)> = weights
            .into_iter()
            .map(|(bitstring, weight)| {
                let exact = weight / total * shots as f64;
                let floor = exact.floor();
                (bitstring, floor as u64, exact - floor)
            })
            .collect();

        let assigned: u64 = shares.iter().map(|(_, n, _)| n).sum();
        let mut order: Vec<usize> = (0..shares.len()).collect();
        order.sort_by(|&a, &b| shares[b].2.total_cmp(&shares[a].2).then(a.cmp(&b)));
        let leftover = shots.saturating_sub(assigned) as usize;
        for &i in order.iter().cycle().take(leftover) {
            shares[i].1 += 1;
        }

        shares
            .into_iter()
            .filter(|(_, n, _)| *n > 0)
            .map(|(bitstring, n, _)| (bitstring, n))
            .collect()
    }

    /// Add `count` occurrences of a bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_default() += count;
    }

    /// Get the count for a bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Iterate over (bitstring, count) pairs in bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Get the total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Get the most frequent bitstring.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.counts.iter().max_by_key(|&(_, count)| count)
    }

    /// Get sorted counts (by count, descending).
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut items: Vec<_> = self.counts.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1));
        items
    }

    /// Get the number of unique bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if counts are empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Borrow the underlying ordered map.
    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Normalized outcome of one execution, whatever the backend.
///
/// `counts` is present iff `success`; `error` is present iff not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Provider that ran (or attempted) the job.
    pub provider: Provider,
    /// Whether the job reached a successful terminal state.
    pub success: bool,
    /// Measurement counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<Counts>,
    /// Number of shots requested.
    pub shots: u32,
    /// Vendor backend or processor the job ran on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Job identifier assigned by the vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_job_id: Option<String>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the result was produced.
    pub execution_time: DateTime<Utc>,
    /// Vendor-native result payload, kept alongside the normalized counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl ExecutionResult {
    /// A successful result.
    pub fn success(provider: Provider, counts: Counts, shots: u32) -> Self {
        Self {
            provider,
            success: true,
            counts: Some(counts),
            shots,
            backend: None,
            vendor_job_id: None,
            error: None,
            execution_time: Utc::now(),
            raw: None,
        }
    }

    /// A failed result.
    pub fn failure(provider: Provider, shots: u32, error: impl Into<String>) -> Self {
        Self {
            provider,
            success: false,
            counts: None,
            shots,
            backend: None,
            vendor_job_id: None,
            error: Some(error.into()),
            execution_time: Utc::now(),
            raw: None,
        }
    }

    /// A result for a job that exceeded its wait bound.
    pub fn timeout(provider: Provider, shots: u32) -> Self {
        Self::failure(provider, shots, TIMEOUT_ERROR)
    }

    /// Set the backend name.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Set the vendor job id.
    pub fn with_vendor_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.vendor_job_id = Some(job_id.into());
        self
    }

    /// Attach the vendor-native result payload.
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Override the execution time.
    pub fn with_execution_time(mut self, at: DateTime<Utc>) -> Self {
        self.execution_time = at;
        self
    }

    /// Whether the job failed by exceeding its wait bound.
    pub fn is_timeout(&self) -> bool {
        !self.success && self.error.as_deref() == Some(TIMEOUT_ERROR)
    }

    /// Get the most frequent measurement result with its probability.
    #[allow(clippy::cast_precision_loss)]
    pub fn most_frequent(&self) -> Option<(&String, f64)> {
        let counts = self.counts.as_ref()?;
        let total = counts.total_shots() as f64;
        if total == 0.0 {
            return None;
        }
        counts.most_frequent().map(|(s, &c)| (s, c as f64 / total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_basic() {
        let mut counts = Counts::new();
        counts.insert("00", 500);
        counts.insert("11", 400);
        counts.insert("11", 100);

        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("11"), 500);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 1000);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_counts_order_independent() {
        let a = Counts::from_pairs([("11", 3), ("00", 5)]);
        let b = Counts::from_pairs([("00", 5), ("11", 3)]);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"00":5,"11":3}"#
        );
    }

    #[test]
    fn test_distribution_sums_to_shots() {
        let third = 1.0 / 3.0;
        let counts = Counts::from_distribution([("00", third), ("01", third), ("10", third)], 100);
        assert_eq!(counts.total_shots(), 100);
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|(_, &n)| n == 33 || n == 34));
    }

    #[test]
    fn test_distribution_exact_shares() {
        let counts = Counts::from_distribution([("00", 0.5), ("11", 0.5)], 1000);
        assert_eq!(counts, Counts::from_pairs([("00", 500), ("11", 500)]));
    }

    #[test]
    fn test_distribution_ignores_negative_weights() {
        // Quasi-probabilities may dip below zero and need not sum to one.
        let counts =
            Counts::from_distribution([("0", 0.8), ("1", 0.25), ("10", -0.05)], 7);
        assert_eq!(counts.total_shots(), 7);
        assert_eq!(counts.get("10"), 0);
        assert_eq!(counts.get("0") + counts.get("1"), 7);
    }

    #[test]
    fn test_distribution_degenerate() {
        assert!(Counts::from_distribution([("0", 0.0)], 10).is_empty());
        assert!(Counts::from_distribution([("0", 1.0)], 0).is_empty());
        assert!(Counts::from_distribution(Vec::<(String, f64)>::new(), 10).is_empty());
    }

    #[test]
    fn test_counts_most_frequent() {
        let counts = Counts::from_pairs([("00", 100), ("11", 900)]);
        let (most, count) = counts.most_frequent().unwrap();
        assert_eq!(most, "11");
        assert_eq!(*count, 900);
        assert_eq!(counts.sorted()[0].0, "11");
    }

    #[test]
    fn test_success_and_failure_invariants() {
        let ok = ExecutionResult::success(Provider::Simulator, Counts::from_pairs([("0", 10)]), 10);
        assert!(ok.success);
        assert!(ok.counts.is_some());
        assert!(ok.error.is_none());

        let failed = ExecutionResult::failure(Provider::Ibm, 10, "Job status: ERROR");
        assert!(!failed.success);
        assert!(failed.counts.is_none());
        assert_eq!(failed.error.as_deref(), Some("Job status: ERROR"));
        assert!(!failed.is_timeout());

        assert!(ExecutionResult::timeout(Provider::Ionq, 10).is_timeout());
    }

    #[test]
    fn test_result_serialization_skips_absent_fields() {
        let result = ExecutionResult::failure(Provider::Google, 5, "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("counts").is_none());
        assert!(json.get("raw").is_none());
        assert_eq!(json["provider"], "google");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_most_frequent_probability() {
        let result = ExecutionResult::success(
            Provider::Simulator,
            Counts::from_pairs([("00", 250), ("11", 750)]),
            1000,
        );
        let (bits, prob) = result.most_frequent().unwrap();
        assert_eq!(bits, "11");
        assert!((prob - 0.75).abs() < 1e-10);
    }
}
