//! Redis-based fixed-window rate limiter
//!
//! One counter per (operation kind, identifier) per window. Fixed-window
//! counting keeps O(1) state per identifier, which is the right trade for
//! short-lived, bursty OTP traffic. The INCR and the first-write EXPIRE
//! run in one script, so the count and the window reset stay atomic across
//! service instances. Identifiers are hashed in counter keys.

use async_trait::async_trait;
use redis::Script;
use sha2::{Digest, Sha256};
use tracing::warn;

use sv_core::errors::{DomainError, DomainResult};
use sv_core::services::otp::{OperationKind, RateLimitDecision, RateLimiter};
use sv_shared::config::rate_limit::{LimitWindow, RateLimitConfig};
use sv_shared::utils::identifier::mask_identifier;

use crate::cache::redis_client::RedisClient;

/// Redis key prefix for rate limit counters
const COUNTER_KEY_PREFIX: &str = "rate_limit";

// INCR opens the window on first use; TTL doubles as the retry hint.
const WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 then
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Redis-based implementation of the core rate limiter trait
pub struct RedisRateLimiter {
    /// Redis client for counter operations
    redis_client: RedisClient,
    /// Rate limit configuration
    config: RateLimitConfig,
    /// Atomic count-and-expire within the current window
    window_script: Script,
}

impl RedisRateLimiter {
    /// Create a new Redis-based rate limiter
    pub fn new(redis_client: RedisClient, config: RateLimitConfig) -> Self {
        Self {
            redis_client,
            config,
            window_script: Script::new(WINDOW_SCRIPT),
        }
    }

    fn limit_for(&self, kind: OperationKind) -> LimitWindow {
        match kind {
            OperationKind::Issuance => self.config.issuance,
            OperationKind::Verification => self.config.verification,
        }
    }

    fn counter_key(&self, identifier: &str, kind: OperationKind) -> String {
        self.redis_client.make_key(&format!(
            "{}:{}:{}",
            COUNTER_KEY_PREFIX,
            kind.as_str(),
            hash_identifier(identifier)
        ))
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(
        &self,
        identifier: &str,
        kind: OperationKind,
    ) -> DomainResult<RateLimitDecision> {
        let window = self.limit_for(kind);
        if !self.config.enabled {
            return Ok(RateLimitDecision::Allowed {
                remaining: window.limit,
            });
        }

        let mut conn = self.redis_client.connection();
        let (count, ttl): (i64, i64) = self
            .window_script
            .key(self.counter_key(identifier, kind))
            .arg(window.window_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to update rate limit counter: {}", e),
            })?;

        if count as u64 > window.limit as u64 {
            warn!(
                identifier = %mask_identifier(identifier),
                kind = kind.as_str(),
                count = count,
                limit = window.limit,
                event = "rate_limit_exceeded",
                "Fixed-window rate limit exceeded"
            );
            Ok(RateLimitDecision::Exceeded {
                retry_after_seconds: ttl.max(1) as u64,
            })
        } else {
            Ok(RateLimitDecision::Allowed {
                remaining: window.limit - count as u32,
            })
        }
    }
}

/// Hash an identifier for counter keys (privacy protection)
fn hash_identifier(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_identifier_is_stable_and_opaque() {
        let hash = hash_identifier("+15551234567");
        assert_eq!(hash, hash_identifier("+15551234567"));
        assert_ne!(hash, hash_identifier("+15551234568"));
        assert_eq!(hash.len(), 64);
        assert!(!hash.contains("555"));
    }
}
