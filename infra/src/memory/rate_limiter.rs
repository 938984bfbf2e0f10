//! In-memory fixed-window rate limiter

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use sv_core::errors::DomainResult;
use sv_core::services::otp::{OperationKind, RateLimitDecision, RateLimiter};
use sv_shared::config::rate_limit::{LimitWindow, RateLimitConfig};
use sv_shared::utils::identifier::mask_identifier;

struct Window {
    started_at: Instant,
    count: u32,
}

/// In-memory implementation of the core rate limiter trait.
///
/// Fixed-window counting on a monotonic clock. Single-instance only; a
/// shared deployment needs the Redis limiter so counts survive across
/// processes.
pub struct MemoryRateLimiter {
    /// Rate limit configuration
    config: RateLimitConfig,
    /// One window per (operation kind, identifier)
    windows: Mutex<HashMap<(OperationKind, String), Window>>,
}

impl MemoryRateLimiter {
    /// Create a new in-memory rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn limit_for(&self, kind: OperationKind) -> LimitWindow {
        match kind {
            OperationKind::Issuance => self.config.issuance,
            OperationKind::Verification => self.config.verification,
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check(
        &self,
        identifier: &str,
        kind: OperationKind,
    ) -> DomainResult<RateLimitDecision> {
        let limit_window = self.limit_for(kind);
        if !self.config.enabled {
            return Ok(RateLimitDecision::Allowed {
                remaining: limit_window.limit,
            });
        }

        let window_duration = Duration::from_secs(limit_window.window_seconds);
        let now = Instant::now();

        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((kind, identifier.to_string()))
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        // Non-overlapping buckets: the count resets at the boundary
        if now.duration_since(window.started_at) >= window_duration {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= limit_window.limit {
            let retry_after = window_duration
                .saturating_sub(now.duration_since(window.started_at))
                .as_secs()
                .max(1);
            warn!(
                identifier = %mask_identifier(identifier),
                kind = kind.as_str(),
                limit = limit_window.limit,
                event = "rate_limit_exceeded",
                "Fixed-window rate limit exceeded"
            );
            Ok(RateLimitDecision::Exceeded {
                retry_after_seconds: retry_after,
            })
        } else {
            window.count += 1;
            Ok(RateLimitDecision::Allowed {
                remaining: limit_window.limit - window.count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHONE: &str = "+15551234567";

    fn config(issuance_limit: u32, window_seconds: u64) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            issuance: LimitWindow {
                limit: issuance_limit,
                window_seconds,
            },
            verification: LimitWindow {
                limit: 10,
                window_seconds,
            },
        }
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_rejects() {
        let limiter = MemoryRateLimiter::new(config(3, 3600));

        for remaining in [2u32, 1, 0] {
            let decision = limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
            assert_eq!(decision, RateLimitDecision::Allowed { remaining });
        }

        let decision = limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        assert!(matches!(decision, RateLimitDecision::Exceeded { .. }));
    }

    #[tokio::test]
    async fn test_operation_kinds_are_counted_independently() {
        let limiter = MemoryRateLimiter::new(config(1, 3600));

        limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        let decision = limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        assert!(matches!(decision, RateLimitDecision::Exceeded { .. }));

        // Verification has its own counter
        let decision = limiter
            .check(PHONE, OperationKind::Verification)
            .await
            .unwrap();
        assert!(matches!(decision, RateLimitDecision::Allowed { .. }));
    }

    #[tokio::test]
    async fn test_identifiers_are_counted_independently() {
        let limiter = MemoryRateLimiter::new(config(1, 3600));

        limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        let decision = limiter
            .check("+442071838750", OperationKind::Issuance)
            .await
            .unwrap();
        assert!(matches!(decision, RateLimitDecision::Allowed { .. }));
    }

    #[tokio::test]
    async fn test_window_resets_after_elapsing() {
        let limiter = MemoryRateLimiter::new(config(1, 1));

        limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        let decision = limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        assert!(matches!(decision, RateLimitDecision::Exceeded { .. }));

        tokio::time::sleep(Duration::from_millis(1_100)).await;

        let decision = limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
        assert!(matches!(decision, RateLimitDecision::Allowed { .. }));
    }

    #[tokio::test]
    async fn test_disabled_limiter_always_allows() {
        let mut config = config(1, 3600);
        config.enabled = false;
        let limiter = MemoryRateLimiter::new(config);

        for _ in 0..10 {
            let decision = limiter.check(PHONE, OperationKind::Issuance).await.unwrap();
            assert!(matches!(decision, RateLimitDecision::Allowed { .. }));
        }
    }
}
