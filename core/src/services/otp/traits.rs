//! Capability traits consumed by the OTP service.
//!
//! Concrete backends live in the infrastructure crate; the service only
//! depends on these seams so tests and deployments can swap them freely.

use async_trait::async_trait;

use crate::domain::entities::otp_record::OtpRecord;
use crate::errors::DomainResult;

use super::types::{OperationKind, RateLimitDecision};

/// Persistence seam for OTP records.
///
/// Implementations must guarantee per-identifier atomicity for `put`,
/// `decrement_attempts` and `consume`, across service instances when the
/// backing store is shared. In-process locking is not a substitute.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Upserts the record, atomically replacing any existing record for
    /// the same identifier. No window may exist where two live records
    /// coexist.
    async fn put(&self, record: &OtpRecord) -> DomainResult<()>;

    /// Fetches the live record for an identifier. Records past their
    /// expiry behave as absent regardless of physical persistence.
    async fn get(&self, identifier: &str) -> DomainResult<Option<OtpRecord>>;

    /// Atomically decrements the attempt budget, never below zero.
    /// Returns the updated count, or `None` when no record exists.
    async fn decrement_attempts(&self, identifier: &str) -> DomainResult<Option<u32>>;

    /// Deletes the record, returning whether one was present. Deleting an
    /// absent record is not an error. The return value is the atomicity
    /// point for single-use verification: exactly one concurrent caller
    /// observes `true`.
    async fn consume(&self, identifier: &str) -> DomainResult<bool>;
}

/// Out-of-band delivery channel for plaintext codes
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers the code to the identifier, returning the provider's
    /// message id
    async fn send_code(&self, identifier: &str, code: &str) -> Result<String, String>;
}

/// Fixed-window request limiter, keyed per identifier and operation kind
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Checks and counts one operation against the identifier's window
    async fn check(&self, identifier: &str, kind: OperationKind)
        -> DomainResult<RateLimitDecision>;
}
