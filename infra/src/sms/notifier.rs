//! Adapter bridging SMS providers to the core `Notifier` seam

use async_trait::async_trait;
use std::sync::Arc;

use sv_core::services::otp::Notifier;

use super::sms_service::SmsService;

/// Delivers one-time passcodes through any [`SmsService`] provider.
///
/// The only place the plaintext code leaves the issuance path is here, on
/// its way to the provider.
pub struct SmsNotifier<S: SmsService> {
    service: Arc<S>,
}

impl<S: SmsService> SmsNotifier<S> {
    /// Create a notifier over an SMS provider
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// The underlying provider name
    pub fn provider_name(&self) -> &str {
        self.service.provider_name()
    }
}

#[async_trait]
impl<S: SmsService> Notifier for SmsNotifier<S> {
    async fn send_code(&self, identifier: &str, code: &str) -> Result<String, String> {
        self.service
            .send_verification_code(identifier, code)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sms::mock_sms::MockSmsService;

    #[tokio::test]
    async fn test_notifier_delegates_to_provider() {
        let provider = Arc::new(MockSmsService::with_options(false, false));
        let notifier = SmsNotifier::new(provider.clone());

        let message_id = notifier.send_code("+15551234567", "123456").await.unwrap();
        assert!(message_id.starts_with("mock_"));
        assert_eq!(provider.get_message_count(), 1);
        assert_eq!(notifier.provider_name(), "Mock");
    }

    #[tokio::test]
    async fn test_notifier_surfaces_provider_failure() {
        let provider = Arc::new(MockSmsService::with_options(false, true));
        let notifier = SmsNotifier::new(provider);

        let result = notifier.send_code("+15551234567", "123456").await;
        assert!(result.is_err());
    }
}
