//! Redis-backed OTP record store
//!
//! Stores the record JSON and the attempt counter under separate keys
//! sharing a TTL aligned to the record expiry. Mutations ride Redis
//! atomicity: MULTI pipelines for `put`/`consume` and a Lua script for the
//! conditional decrement, so the one-live-record and no-lost-update
//! guarantees hold across service instances, not just within one process.

use async_trait::async_trait;
use chrono::Utc;
use redis::Script;
use tracing::{debug, info};

use sv_core::domain::entities::otp_record::OtpRecord;
use sv_core::errors::{DomainError, DomainResult};
use sv_core::services::otp::OtpStore;
use sv_shared::utils::identifier::mask_identifier;

use crate::cache::redis_client::RedisClient;

/// Redis key prefix for OTP record JSON
const RECORD_KEY_PREFIX: &str = "otp:record";

/// Redis key prefix for the attempt counter
const ATTEMPTS_KEY_PREFIX: &str = "otp:attempts";

// Decrements only when the counter exists and is positive; the count
// never goes below zero, concurrent callers see distinct values.
const DECREMENT_SCRIPT: &str = r#"
local attempts = redis.call('GET', KEYS[1])
if not attempts then
    return -1
end
if tonumber(attempts) <= 0 then
    return 0
end
return redis.call('DECR', KEYS[1])
"#;

/// Redis implementation of the core record store
pub struct RedisOtpStore {
    /// Redis client for cache operations
    redis_client: RedisClient,
    /// Conditional atomic decrement of the attempt counter
    decrement_script: Script,
}

impl RedisOtpStore {
    /// Create a new Redis-backed OTP store
    pub fn new(redis_client: RedisClient) -> Self {
        Self {
            redis_client,
            decrement_script: Script::new(DECREMENT_SCRIPT),
        }
    }

    fn record_key(&self, identifier: &str) -> String {
        self.redis_client
            .make_key(&format!("{}:{}", RECORD_KEY_PREFIX, identifier))
    }

    fn attempts_key(&self, identifier: &str) -> String {
        self.redis_client
            .make_key(&format!("{}:{}", ATTEMPTS_KEY_PREFIX, identifier))
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, record: &OtpRecord) -> DomainResult<()> {
        let record_json = serde_json::to_string(record).map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize OTP record: {}", e),
        })?;

        // Key TTL tracks the logical expiry, so Redis sweeps expired rows
        let ttl_seconds = (record.expires_at - Utc::now()).num_seconds().max(1) as u64;

        let mut conn = self.redis_client.connection();
        redis::pipe()
            .atomic()
            .set_ex(self.record_key(&record.identifier), record_json, ttl_seconds)
            .set_ex(
                self.attempts_key(&record.identifier),
                record.remaining_attempts,
                ttl_seconds,
            )
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to store OTP record: {}", e),
            })?;

        info!(
            identifier = %mask_identifier(&record.identifier),
            session_id = %record.id,
            expires_at = %record.expires_at,
            event = "otp_stored",
            "OTP record stored in Redis"
        );

        Ok(())
    }

    async fn get(&self, identifier: &str) -> DomainResult<Option<OtpRecord>> {
        let mut conn = self.redis_client.connection();
        let (record_json, attempts): (Option<String>, Option<u32>) = redis::pipe()
            .get(self.record_key(identifier))
            .get(self.attempts_key(identifier))
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to get OTP record: {}", e),
            })?;

        let record_json = match record_json {
            Some(json) => json,
            None => return Ok(None),
        };

        let mut record: OtpRecord =
            serde_json::from_str(&record_json).map_err(|e| DomainError::Internal {
                message: format!("Failed to deserialize OTP record: {}", e),
            })?;

        // Lazy expiry covers drift between the logical expiry and key TTL
        if record.is_expired() {
            debug!(
                identifier = %mask_identifier(identifier),
                "Removing lazily expired OTP record"
            );
            self.consume(identifier).await?;
            return Ok(None);
        }

        // The counter is authoritative; the JSON keeps the issuance value
        record.remaining_attempts = attempts.unwrap_or(0);

        Ok(Some(record))
    }

    async fn decrement_attempts(&self, identifier: &str) -> DomainResult<Option<u32>> {
        let mut conn = self.redis_client.connection();
        let updated: i64 = self
            .decrement_script
            .key(self.attempts_key(identifier))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to decrement attempt counter: {}", e),
            })?;

        if updated < 0 {
            Ok(None)
        } else {
            debug!(
                identifier = %mask_identifier(identifier),
                remaining_attempts = updated,
                "Decremented OTP attempt counter"
            );
            Ok(Some(updated as u32))
        }
    }

    async fn consume(&self, identifier: &str) -> DomainResult<bool> {
        let mut conn = self.redis_client.connection();
        // DEL reports how many keys it removed; the record key settles
        // which concurrent caller actually consumed
        let (deleted_records, _deleted_counters): (i64, i64) = redis::pipe()
            .atomic()
            .del(self.record_key(identifier))
            .del(self.attempts_key(identifier))
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete OTP record: {}", e),
            })?;

        if deleted_records > 0 {
            info!(
                identifier = %mask_identifier(identifier),
                event = "otp_consumed",
                "OTP record removed from Redis"
            );
        }

        Ok(deleted_records > 0)
    }
}
