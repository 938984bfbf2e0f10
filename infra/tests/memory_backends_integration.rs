//! Integration tests for the OTP service over the in-memory backends,
//! including the concurrency properties of the attempt budget.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sv_core::errors::{DomainError, OtpError};
use sv_core::services::otp::{Notifier, OtpService, OtpServiceConfig, OtpStore};
use sv_infra::memory::{MemoryOtpStore, MemoryRateLimiter};
use sv_shared::config::rate_limit::{LimitWindow, RateLimitConfig};

const PHONE: &str = "+15551234567";

// Notifier that records delivered codes for the tests to replay
#[derive(Default)]
struct CapturingNotifier {
    delivered: Mutex<HashMap<String, String>>,
}

impl CapturingNotifier {
    fn last_code(&self, identifier: &str) -> Option<String> {
        self.delivered.lock().unwrap().get(identifier).cloned()
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn send_code(&self, identifier: &str, code: &str) -> Result<String, String> {
        self.delivered
            .lock()
            .unwrap()
            .insert(identifier.to_string(), code.to_string());
        Ok(format!("mem-msg-{}", uuid::Uuid::new_v4()))
    }
}

fn lenient_limits() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        issuance: LimitWindow {
            limit: 100,
            window_seconds: 3600,
        },
        verification: LimitWindow {
            limit: 1000,
            window_seconds: 3600,
        },
    }
}

fn build_service(
    rate_limit: RateLimitConfig,
    config: OtpServiceConfig,
) -> (
    Arc<MemoryOtpStore>,
    Arc<CapturingNotifier>,
    Arc<OtpService<MemoryOtpStore, CapturingNotifier, MemoryRateLimiter>>,
) {
    let store = Arc::new(MemoryOtpStore::new());
    let notifier = Arc::new(CapturingNotifier::default());
    let service = Arc::new(OtpService::new(
        store.clone(),
        notifier.clone(),
        Arc::new(MemoryRateLimiter::new(rate_limit)),
        config,
    ));
    (store, notifier, service)
}

fn flip_digits(code: &str) -> String {
    code.chars()
        .map(|c| if c == '0' { '1' } else { '0' })
        .collect()
}

#[tokio::test]
async fn test_full_flow_over_memory_backends() {
    let (store, notifier, service) =
        build_service(lenient_limits(), OtpServiceConfig::default());

    service.request_otp(PHONE).await.unwrap();
    let record = store.get(PHONE).await.unwrap().unwrap();
    assert_eq!(record.remaining_attempts, 5);

    let code = notifier.last_code(PHONE).unwrap();

    let result = service.verify_otp(PHONE, &flip_digits(&code)).await;
    assert!(matches!(
        result,
        Err(DomainError::Otp(OtpError::InvalidCode {
            remaining_attempts: 4
        }))
    ));

    service.verify_otp(PHONE, &code).await.unwrap();
    assert!(store.get(PHONE).await.unwrap().is_none());

    let result = service.verify_otp(PHONE, &code).await;
    assert!(matches!(
        result,
        Err(DomainError::Otp(OtpError::NoActiveOtp))
    ));
}

#[tokio::test]
async fn test_issuance_limit_over_memory_backends() {
    let rate_limit = RateLimitConfig {
        enabled: true,
        issuance: LimitWindow {
            limit: 2,
            window_seconds: 3600,
        },
        verification: LimitWindow {
            limit: 10,
            window_seconds: 3600,
        },
    };
    let (_, _, service) = build_service(rate_limit, OtpServiceConfig::default());

    service.request_otp(PHONE).await.unwrap();
    service.request_otp(PHONE).await.unwrap();
    let result = service.request_otp(PHONE).await;
    assert!(matches!(
        result,
        Err(DomainError::Otp(OtpError::RateLimited { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_wrong_submissions_respect_attempt_budget() {
    let max_attempts = 5;
    let config = OtpServiceConfig {
        max_attempts,
        ..Default::default()
    };
    let (store, notifier, service) = build_service(lenient_limits(), config);

    service.request_otp(PHONE).await.unwrap();
    let wrong = flip_digits(&notifier.last_code(PHONE).unwrap());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        let wrong = wrong.clone();
        handles.push(tokio::spawn(async move {
            service.verify_otp(PHONE, &wrong).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        match result {
            Err(DomainError::Otp(OtpError::InvalidCode { remaining_attempts })) => {
                // The counter floors at zero, never wraps
                assert!(remaining_attempts <= max_attempts)
            }
            Err(DomainError::Otp(OtpError::AttemptsExhausted))
            | Err(DomainError::Otp(OtpError::NoActiveOtp)) => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    // Whatever the interleaving, the budget is spent and the correct code
    // is no longer accepted
    if let Some(record) = store.get(PHONE).await.unwrap() {
        assert_eq!(record.remaining_attempts, 0);
    }
    let correct = notifier.last_code(PHONE).unwrap();
    let result = service.verify_otp(PHONE, &correct).await;
    assert!(matches!(
        result,
        Err(DomainError::Otp(
            OtpError::AttemptsExhausted | OtpError::NoActiveOtp
        ))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_submissions_allow_at_most_one_success() {
    let (_, notifier, service) =
        build_service(lenient_limits(), OtpServiceConfig::default());

    service.request_otp(PHONE).await.unwrap();
    let correct = notifier.last_code(PHONE).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let correct = correct.clone();
        handles.push(tokio::spawn(async move {
            service.verify_otp(PHONE, &correct).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // Success is single-use even when the same code races itself
    assert_eq!(successes, 1);
}
