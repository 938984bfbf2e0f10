//! SMS Service Module
//!
//! This module provides SMS service implementations for delivering
//! one-time passcodes. It includes support for multiple providers and a
//! mock implementation for development.
//!
//! ## Features
//!
//! - **SMS Service Trait**: Common interface for all SMS providers
//! - **Mock Implementation**: Console output for development
//! - **Twilio Support**: Production SMS via Twilio API
//! - **Notifier Adapter**: Bridges any provider to the core delivery seam
//! - **Phone Number Validation**: E.164 format validation
//! - **Security**: Phone number masking in logs

pub mod mock_sms;
pub mod notifier;
pub mod sms_service;

// Twilio SMS service (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

// Re-export commonly used types
pub use mock_sms::MockSmsService;
pub use notifier::SmsNotifier;
pub use sms_service::{is_valid_phone_number, mask_phone_number, SmsService};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsService};

/// Create an SMS service based on configuration
///
/// Returns the appropriate SMS service implementation based on the
/// provider specified in the configuration, falling back to the mock
/// provider when a real one cannot be initialized.
pub fn create_sms_service(config: &crate::config::SmsConfig) -> Box<dyn SmsService> {
    match config.provider.as_str() {
        #[cfg(feature = "twilio-sms")]
        "twilio" => {
            let twilio_config = TwilioConfig {
                account_sid: config.api_key.clone(),
                auth_token: config.api_secret.clone(),
                from_number: config.from_number.clone(),
                max_retries: 3,
                retry_delay_ms: 1000,
            };

            match TwilioSmsService::new(twilio_config) {
                Ok(service) => Box::new(service),
                Err(e) => {
                    tracing::error!("Failed to initialize Twilio SMS service: {}", e);
                    tracing::warn!("Falling back to mock SMS service");
                    Box::new(MockSmsService::new())
                }
            }
        }
        "mock" => Box::new(MockSmsService::new()),
        other => {
            tracing::warn!(
                provider = other,
                "Unknown SMS provider, falling back to mock SMS service"
            );
            Box::new(MockSmsService::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmsConfig;

    #[test]
    fn test_create_mock_service() {
        let config = SmsConfig {
            provider: "mock".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            from_number: "+1234567890".to_string(),
        };
        let service = create_sms_service(&config);
        assert_eq!(service.provider_name(), "Mock");
    }

    #[test]
    fn test_unknown_provider_falls_back_to_mock() {
        let config = SmsConfig {
            provider: "carrier-pigeon".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            from_number: "+1234567890".to_string(),
        };
        let service = create_sms_service(&config);
        assert_eq!(service.provider_name(), "Mock");
    }

    #[cfg(feature = "twilio-sms")]
    #[test]
    fn test_create_twilio_service() {
        let config = SmsConfig {
            provider: "twilio".to_string(),
            api_key: "ACtest".to_string(),
            api_secret: "token".to_string(),
            from_number: "+1234567890".to_string(),
        };
        let service = create_sms_service(&config);
        assert_eq!(service.provider_name(), "Twilio");
    }
}
