//! Verifiable execution receipts.
//!
//! A [`Receipt`] records who ran a job, whether it succeeded, the counts and
//! shots, and when. Its `digest` is the hex SHA-256 of the canonical body:
//! the receipt minus `digest`, encoded as compact JSON with sorted keys.
//! Anyone holding the receipt can recompute the digest with
//! [`Receipt::verify`].
//!
//! ```
//! use qbridge_hal::{Counts, ExecutionResult, Provider};
//! use qbridge_receipt::generate;
//!
//! let result = ExecutionResult::success(
//!     Provider::Simulator,
//!     Counts::from_pairs([("00", 512), ("11", 512)]),
//!     1024,
//! );
//! let receipt = generate(&result, "job-42");
//! assert!(receipt.verify().is_ok());
//! ```

mod error;
mod receipt;

pub use error::{ReceiptError, ReceiptResult};
pub use receipt::{Receipt, generate};
