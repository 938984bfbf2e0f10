//! One-time passcode record entity.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{DomainResult, OtpError};

/// Length of the per-record salt in bytes
pub const SALT_LENGTH: usize = 16;

/// Default number of digits in a generated code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default validity window for an issued code (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Default number of verification attempts allowed per issued code
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A live one-time passcode bound to a normalized identifier.
///
/// Only the salted hash of the code is ever stored; the plaintext exists
/// solely in the issuance path on its way to the delivery channel. At most
/// one live record exists per identifier: issuing a new code replaces any
/// prior record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Unique identifier for this issuance (log correlation)
    pub id: Uuid,

    /// Normalized identifier (E.164 phone or lowercased email)
    pub identifier: String,

    /// Hex-encoded SHA-256 of `salt || code`
    pub code_hash: String,

    /// Hex-encoded per-record random salt
    pub salt: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,

    /// Verification attempts left; the record is dead at zero
    pub remaining_attempts: u32,
}

impl OtpRecord {
    /// Builds a record for a freshly generated code.
    ///
    /// Fails with a generation error when the OS entropy source cannot
    /// produce the salt; issuance must not proceed with a predictable one.
    pub fn issue(
        identifier: String,
        code: &str,
        ttl_seconds: u64,
        max_attempts: u32,
    ) -> DomainResult<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|_| OtpError::Generation)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            identifier,
            code_hash: hash_code(&salt, code),
            salt: hex::encode(salt),
            issued_at: now,
            expires_at: now + Duration::seconds(ttl_seconds as i64),
            remaining_attempts: max_attempts,
        })
    }

    /// Checks if the record has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks if the attempt budget is spent
    pub fn is_exhausted(&self) -> bool {
        self.remaining_attempts == 0
    }

    /// Compares a submitted code against the stored hash in constant time.
    ///
    /// The comparison runs over the full digests regardless of where they
    /// first differ, so response timing reveals nothing about the code.
    pub fn matches(&self, submitted_code: &str) -> bool {
        let salt = match hex::decode(&self.salt) {
            Ok(salt) => salt,
            Err(_) => return false,
        };
        let stored = match hex::decode(&self.code_hash) {
            Ok(stored) => stored,
            Err(_) => return false,
        };

        let mut hasher = Sha256::new();
        hasher.update(&salt);
        hasher.update(submitted_code.as_bytes());
        let submitted = hasher.finalize();

        constant_time_eq(submitted.as_slice(), stored.as_slice())
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Salted hash of a plaintext code, hex-encoded.
fn hash_code(salt: &[u8], code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
