//! Receipt construction, canonical encoding and digest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use qbridge_hal::{Counts, ExecutionResult, Provider};

use crate::error::{ReceiptError, ReceiptResult};

/// The auditable record of one execution.
///
/// The digest covers every other field. Optional fields take part in the
/// digest only when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Caller-assigned job identifier.
    pub job_id: String,
    /// Provider that ran the job.
    pub provider: Provider,
    /// Whether the job succeeded.
    pub success: bool,
    /// Measurement counts, empty on failure.
    #[serde(default)]
    pub counts: Counts,
    /// Shots requested.
    pub shots: u32,
    /// Unix seconds of the result's execution time.
    pub timestamp: i64,
    /// Vendor backend or processor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Vendor-assigned job id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_job_id: Option<String>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Lowercase hex SHA-256 of [`Receipt::canonical_body`].
    pub digest: String,
}

/// Build the receipt for `result` under `job_id`.
pub fn generate(result: &ExecutionResult, job_id: &str) -> Receipt {
    let mut receipt = Receipt {
        job_id: job_id.to_string(),
        provider: result.provider,
        success: result.success,
        counts: result.counts.clone().unwrap_or_default(),
        shots: result.shots,
        timestamp: result.execution_time.timestamp(),
        backend: result.backend.clone(),
        vendor_job_id: result.vendor_job_id.clone(),
        error: result.error.clone(),
        digest: String::new(),
    };
    receipt.digest = receipt.compute_digest();
    receipt
}

impl Receipt {
    /// The receipt without its digest, as compact JSON with keys in
    /// lexicographic order. All numbers are integers.
    pub fn canonical_body(&self) -> String {
        let mut body = Map::new();
        // Inserted in key order so the encoding is sorted with or without
        // serde_json's `preserve_order`.
        if let Some(backend) = &self.backend {
            body.insert("backend".into(), Value::from(backend.as_str()));
        }
        let counts: Map<String, Value> = self
            .counts
            .iter()
            .map(|(bitstring, &count)| (bitstring.clone(), Value::from(count)))
            .collect();
        body.insert("counts".into(), Value::Object(counts));
        if let Some(error) = &self.error {
            body.insert("error".into(), Value::from(error.as_str()));
        }
        body.insert("job_id".into(), Value::from(self.job_id.as_str()));
        body.insert("provider".into(), Value::from(self.provider.as_str()));
        body.insert("shots".into(), Value::from(self.shots));
        body.insert("success".into(), Value::from(self.success));
        body.insert("timestamp".into(), Value::from(self.timestamp));
        if let Some(vendor_job_id) = &self.vendor_job_id {
            body.insert("vendor_job_id".into(), Value::from(vendor_job_id.as_str()));
        }
        Value::Object(body).to_string()
    }

    /// Digest of the canonical body.
    pub fn compute_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_body().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check the recorded digest against the body.
    pub fn verify(&self) -> ReceiptResult<()> {
        let computed = self.compute_digest();
        if computed == self.digest {
            Ok(())
        } else {
            Err(ReceiptError::DigestMismatch {
                recorded: self.digest.clone(),
                computed,
            })
        }
    }

    /// Whether the recorded digest matches the body.
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> ReceiptResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> ReceiptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON. The digest is not checked; call [`Receipt::verify`].
    pub fn from_json(json: &str) -> ReceiptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bell_result() -> ExecutionResult {
        ExecutionResult::success(
            Provider::Simulator,
            Counts::from_pairs([("00", 498), ("11", 526)]),
            1024,
        )
        .with_execution_time(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn test_generate_success() {
        let receipt = generate(&bell_result(), "job-1");
        assert_eq!(receipt.job_id, "job-1");
        assert_eq!(receipt.provider, Provider::Simulator);
        assert!(receipt.success);
        assert_eq!(receipt.counts.get("11"), 526);
        assert_eq!(receipt.shots, 1024);
        assert_eq!(receipt.timestamp, 1_700_000_000);
        assert_eq!(receipt.digest.len(), 64);
        assert!(receipt.digest.chars().all(|c| c.is_ascii_hexdigit()));
        receipt.verify().unwrap();
    }

    #[test]
    fn test_canonical_body_is_sorted_and_compact() {
        let receipt = generate(&bell_result(), "job-1");
        assert_eq!(
            receipt.canonical_body(),
            r#"{"counts":{"00":498,"11":526},"job_id":"job-1","provider":"simulator","shots":1024,"success":true,"timestamp":1700000000}"#
        );
    }

    #[test]
    fn test_digest_matches_sha256_of_body() {
        let receipt = generate(&bell_result(), "job-1");
        let expected = hex::encode(Sha256::digest(receipt.canonical_body().as_bytes()));
        assert_eq!(receipt.digest, expected);
    }

    #[test]
    fn test_failure_receipt_has_empty_counts() {
        let result = ExecutionResult::timeout(Provider::Ionq, 100)
            .with_vendor_job_id("ionq-9")
            .with_execution_time(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let receipt = generate(&result, "job-2");

        assert!(!receipt.success);
        assert!(receipt.counts.is_empty());
        assert_eq!(receipt.error.as_deref(), Some("timeout"));
        assert_eq!(
            receipt.canonical_body(),
            r#"{"counts":{},"error":"timeout","job_id":"job-2","provider":"ionq","shots":100,"success":false,"timestamp":1700000000,"vendor_job_id":"ionq-9"}"#
        );
    }

    #[test]
    fn test_tampering_detected() {
        let mut receipt = generate(&bell_result(), "job-1");
        receipt.counts.insert("01", 1);
        let err = receipt.verify().unwrap_err();
        assert!(matches!(err, ReceiptError::DigestMismatch { .. }));
        assert!(!receipt.is_valid());
    }

    #[test]
    fn test_json_round_trip_keeps_digest_valid() {
        let receipt = generate(&bell_result().with_backend("simulator"), "job-1");
        let json = receipt.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["provider"], "simulator");
        assert!(value.get("error").is_none());

        let decoded = Receipt::from_json(&json).unwrap();
        assert_eq!(decoded, receipt);
        decoded.verify().unwrap();
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Receipt::from_json("{\"job_id\": 3}"),
            Err(ReceiptError::Parse(_))
        ));
    }
}
