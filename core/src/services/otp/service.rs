//! Main OTP service implementation

use std::sync::Arc;

use sv_shared::utils::identifier::{mask_identifier, normalize_identifier};

use crate::domain::entities::otp_record::OtpRecord;
use crate::errors::{DomainResult, OtpError};

use super::config::OtpServiceConfig;
use super::generator::CodeGenerator;
use super::traits::{Notifier, OtpStore, RateLimiter};
use super::types::{IssueOtpResult, OperationKind, RateLimitDecision};

/// OTP lifecycle service: issuance, verification and invalidation.
///
/// Per identifier the implicit state machine is
/// `NoActiveOtp -> Issued -> {Verified, Expired, AttemptsExhausted}`;
/// every terminal state collapses back to `NoActiveOtp` once the record
/// is gone, and a new issuance wins over any outstanding state.
pub struct OtpService<S: OtpStore, N: Notifier, R: RateLimiter> {
    /// Record store
    store: Arc<S>,
    /// Delivery channel
    notifier: Arc<N>,
    /// Fixed-window request limiter
    rate_limiter: Arc<R>,
    /// Code generator
    generator: CodeGenerator,
    /// Service configuration
    config: OtpServiceConfig,
}

impl<S: OtpStore, N: Notifier, R: RateLimiter> OtpService<S, N, R> {
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `store` - Record store implementation
    /// * `notifier` - Delivery channel implementation
    /// * `rate_limiter` - Rate limiter implementation
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        rate_limiter: Arc<R>,
        config: OtpServiceConfig,
    ) -> Self {
        let generator = CodeGenerator::new(config.code_length);
        Self {
            store,
            notifier,
            rate_limiter,
            generator,
            config,
        }
    }

    /// Issue a one-time passcode to an identifier.
    ///
    /// This method:
    /// 1. Normalizes and validates the identifier
    /// 2. Applies the issuance rate limit
    /// 3. Generates a code and stores its salted hash with expiry,
    ///    replacing any prior record for the identifier
    /// 4. Hands the plaintext to the delivery channel
    ///
    /// An undeliverable code is removed from the store before the error
    /// is surfaced, so a retried request starts clean.
    ///
    /// # Returns
    ///
    /// * `Ok(IssueOtpResult)` - Delivery message id and expiry; never the code
    /// * `Err(DomainError)` - One of the lifecycle errors or an internal failure
    pub async fn request_otp(&self, identifier: &str) -> DomainResult<IssueOtpResult> {
        let identifier =
            normalize_identifier(identifier).ok_or(OtpError::InvalidIdentifier)?;

        self.enforce_limit(&identifier, OperationKind::Issuance).await?;

        let code = self.generator.generate()?;
        let record = OtpRecord::issue(
            identifier.clone(),
            &code,
            self.config.ttl_seconds,
            self.config.max_attempts,
        )?;

        tracing::info!(
            identifier = %mask_identifier(&identifier),
            session_id = %record.id,
            event = "otp_generated",
            "Generated new one-time passcode"
        );

        // Replaces any prior record; re-issuance always wins
        self.store.put(&record).await?;

        match self.notifier.send_code(&identifier, &code).await {
            Ok(message_id) => {
                tracing::info!(
                    identifier = %mask_identifier(&identifier),
                    session_id = %record.id,
                    message_id = %message_id,
                    expires_at = %record.expires_at,
                    event = "otp_issued",
                    "One-time passcode stored and handed to delivery"
                );
                Ok(IssueOtpResult {
                    message_id,
                    expires_at: record.expires_at,
                })
            }
            Err(e) => {
                tracing::warn!(
                    identifier = %mask_identifier(&identifier),
                    session_id = %record.id,
                    error = %e,
                    event = "otp_delivery_failed",
                    "Delivery channel rejected the code, removing record"
                );
                self.store.consume(&identifier).await?;
                Err(OtpError::DeliveryFailed.into())
            }
        }
    }

    /// Verify a submitted code for an identifier.
    ///
    /// This method:
    /// 1. Normalizes and validates the identifier
    /// 2. Applies the verification rate limit
    /// 3. Fetches the record; absent or expired reports no active code.
    ///    The expiry check always precedes the attempt-budget check.
    /// 4. Compares the salted hash in constant time
    ///
    /// Success consumes the record: a code verifies exactly once. A
    /// mismatch atomically decrements the attempt budget; malformed
    /// submissions take the same path as wrong codes, with no free probes.
    pub async fn verify_otp(&self, identifier: &str, submitted_code: &str) -> DomainResult<()> {
        let identifier =
            normalize_identifier(identifier).ok_or(OtpError::InvalidIdentifier)?;

        self.enforce_limit(&identifier, OperationKind::Verification).await?;

        let record = match self.store.get(&identifier).await? {
            Some(record) if !record.is_expired() => record,
            _ => {
                tracing::warn!(
                    identifier = %mask_identifier(&identifier),
                    event = "otp_verification_failed",
                    reason = "no_active_otp",
                    "No live code for identifier"
                );
                return Err(OtpError::NoActiveOtp.into());
            }
        };

        if record.is_exhausted() {
            self.store.consume(&identifier).await?;
            tracing::warn!(
                identifier = %mask_identifier(&identifier),
                session_id = %record.id,
                event = "max_attempts_exhausted",
                "Attempt budget spent, record consumed"
            );
            return Err(OtpError::AttemptsExhausted.into());
        }

        if record.matches(submitted_code) {
            // Consuming is the atomicity point: a racing duplicate of the
            // same code loses here and reports no active code
            if !self.store.consume(&identifier).await? {
                return Err(OtpError::NoActiveOtp.into());
            }
            tracing::info!(
                identifier = %mask_identifier(&identifier),
                session_id = %record.id,
                event = "otp_verified",
                "Code verified, record consumed"
            );
            Ok(())
        } else {
            let remaining = self
                .store
                .decrement_attempts(&identifier)
                .await?
                .unwrap_or(0);
            tracing::warn!(
                identifier = %mask_identifier(&identifier),
                session_id = %record.id,
                remaining_attempts = remaining,
                event = "otp_verification_failed",
                reason = "invalid_code",
                "Submitted code did not match"
            );
            Err(OtpError::InvalidCode {
                remaining_attempts: remaining,
            }
            .into())
        }
    }

    /// Invalidate any live code for an identifier.
    ///
    /// Idempotent; invalidating an identifier with no live code succeeds.
    pub async fn invalidate(&self, identifier: &str) -> DomainResult<()> {
        let identifier =
            normalize_identifier(identifier).ok_or(OtpError::InvalidIdentifier)?;

        tracing::info!(
            identifier = %mask_identifier(&identifier),
            event = "otp_consumed",
            "Invalidating live code"
        );
        self.store.consume(&identifier).await.map(|_| ())
    }

    /// Check whether a live (stored, unexpired) code exists for an identifier
    pub async fn code_exists(&self, identifier: &str) -> DomainResult<bool> {
        let identifier =
            normalize_identifier(identifier).ok_or(OtpError::InvalidIdentifier)?;

        Ok(self.store.get(&identifier).await?.is_some())
    }

    async fn enforce_limit(&self, identifier: &str, kind: OperationKind) -> DomainResult<()> {
        match self.rate_limiter.check(identifier, kind).await? {
            RateLimitDecision::Allowed { .. } => Ok(()),
            RateLimitDecision::Exceeded {
                retry_after_seconds,
            } => {
                tracing::warn!(
                    identifier = %mask_identifier(identifier),
                    kind = kind.as_str(),
                    retry_after_seconds = retry_after_seconds,
                    event = "rate_limit_exceeded",
                    "Request rejected by rate limiter"
                );
                Err(OtpError::RateLimited {
                    retry_after_seconds,
                }
                .into())
            }
        }
    }
}
