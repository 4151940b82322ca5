//! Error types for receipts.

use thiserror::Error;

/// Errors that can occur when decoding or checking a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Receipt JSON could not be parsed.
    #[error("Failed to parse receipt: {0}")]
    Parse(#[from] serde_json::Error),

    /// Recorded digest does not match the body.
    #[error("Digest mismatch: recorded {recorded}, computed {computed}")]
    DigestMismatch {
        /// Digest carried by the receipt.
        recorded: String,
        /// Digest of the canonical body.
        computed: String,
    },
}

/// Result type for receipt operations.
pub type ReceiptResult<T> = Result<T, ReceiptError>;
