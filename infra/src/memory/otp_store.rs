//! In-memory OTP record store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use sv_core::domain::entities::otp_record::OtpRecord;
use sv_core::errors::DomainResult;
use sv_core::services::otp::OtpStore;
use sv_shared::utils::identifier::mask_identifier;

/// In-memory implementation of the core record store.
///
/// Every mutation takes the single mutex, which gives the per-identifier
/// atomicity the trait requires within one process. Not suitable for
/// multi-instance deployments; use the Redis store there.
#[derive(Default)]
pub struct MemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl MemoryOtpStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically present records, expired ones included
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Remove every expired record (on-access sweep for long-lived processes)
    pub async fn sweep_expired(&self) -> usize {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired());
        before - records.len()
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn put(&self, record: &OtpRecord) -> DomainResult<()> {
        let mut records = self.records.lock().await;
        if records
            .insert(record.identifier.clone(), record.clone())
            .is_some()
        {
            debug!(
                identifier = %mask_identifier(&record.identifier),
                "Replaced existing OTP record"
            );
        }
        Ok(())
    }

    async fn get(&self, identifier: &str) -> DomainResult<Option<OtpRecord>> {
        let mut records = self.records.lock().await;
        match records.get(identifier) {
            Some(record) if record.is_expired() => {
                // Lazy expiry: the row is dead, drop it on access
                records.remove(identifier);
                Ok(None)
            }
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn decrement_attempts(&self, identifier: &str) -> DomainResult<Option<u32>> {
        let mut records = self.records.lock().await;
        Ok(records.get_mut(identifier).map(|record| {
            if record.remaining_attempts > 0 {
                record.remaining_attempts -= 1;
            }
            record.remaining_attempts
        }))
    }

    async fn consume(&self, identifier: &str) -> DomainResult<bool> {
        Ok(self.records.lock().await.remove(identifier).is_some())
    }
}
