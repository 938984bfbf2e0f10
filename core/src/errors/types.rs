//! OTP lifecycle error taxonomy.
//!
//! These errors are expected, caller-recoverable outcomes of the
//! issuance/verification flow. Infrastructure failures (store or
//! connectivity problems) are carried separately by `DomainError::Internal`
//! so that callers and alerting can tell the two apart.

use thiserror::Error;

/// OTP lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    /// The identifier failed normalization (not a valid phone or email)
    #[error("Invalid identifier")]
    InvalidIdentifier,

    /// The OS entropy source was unavailable; fatal to the issuance request
    #[error("Secure random source unavailable")]
    Generation,

    /// Too many requests within the current window; retry after it resets
    #[error("Rate limit exceeded, retry in {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    /// The delivery channel rejected the code; the caller may retry issuance
    #[error("Code delivery failed")]
    DeliveryFailed,

    /// No live code exists for this identifier (never issued, expired, or consumed)
    #[error("No active code for this identifier")]
    NoActiveOtp,

    /// The attempt budget for the issued code is spent; a fresh issuance is required
    #[error("Maximum verification attempts exhausted")]
    AttemptsExhausted,

    /// The submitted code did not match; retryable within the attempt budget
    #[error("Invalid code, {remaining_attempts} attempt(s) remaining")]
    InvalidCode { remaining_attempts: u32 },
}
