//! Domain-specific error types and error handling.

mod types;

// Re-export all error types
pub use types::OtpError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to the OTP lifecycle taxonomy
    #[error(transparent)]
    Otp(#[from] OtpError),
}

impl DomainError {
    /// Whether this is an expected, caller-recoverable outcome rather
    /// than an infrastructure failure.
    pub fn is_domain(&self) -> bool {
        matches!(self, DomainError::Otp(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_distinguishable_from_internal() {
        let domain: DomainError = OtpError::NoActiveOtp.into();
        assert!(domain.is_domain());

        let internal = DomainError::Internal {
            message: "store unreachable".to_string(),
        };
        assert!(!internal.is_domain());
    }

    #[test]
    fn test_error_messages() {
        let err: DomainError = OtpError::InvalidCode {
            remaining_attempts: 2,
        }
        .into();
        assert!(err.to_string().contains("2 attempt(s) remaining"));

        let err: DomainError = OtpError::RateLimited {
            retry_after_seconds: 60,
        }
        .into();
        assert!(err.to_string().contains("60 seconds"));
    }
}
