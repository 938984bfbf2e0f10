//! Types for OTP service operations

use chrono::{DateTime, Utc};

/// Operation kinds tracked independently by the rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Requesting a new code
    Issuance,
    /// Submitting a code for verification
    Verification,
}

impl OperationKind {
    /// Stable name, used in counter keys and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Issuance => "issuance",
            OperationKind::Verification => "verification",
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted; the counter has been incremented
    Allowed { remaining: u32 },
    /// Request rejected; retry once the window resets
    Exceeded { retry_after_seconds: u64 },
}

/// Result of a successful issuance request.
///
/// Deliberately excludes the code itself; the only copy leaves through
/// the delivery channel.
#[derive(Debug, Clone)]
pub struct IssueOtpResult {
    /// Message id returned by the delivery provider
    pub message_id: String,
    /// When the issued code expires
    pub expires_at: DateTime<Utc>,
}
