//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the SwiftVerify
//! backend. It provides concrete backends for the capability traits the
//! core OTP engine consumes:
//!
//! - **Cache**: Redis-backed OTP record store and fixed-window rate limiter
//! - **Memory**: in-process store and limiter for development and tests
//! - **SMS**: delivery providers (mock console output, Twilio)
//!
//! ## Features
//!
//! - `redis-cache`: Enable Redis backends (default)
//! - `twilio-sms`: Enable the Twilio SMS provider (default)
//! - `mock-services`: Enable mock implementations for testing

// Re-export core types for convenience
pub use sv_core::errors::*;

/// Cache module - Redis client and Redis-backed store/limiter
pub mod cache;

/// Memory module - single-instance in-process backends
pub mod memory;

/// SMS service module - delivery providers
pub mod sms;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services

    use serde::{Deserialize, Serialize};
    use sv_shared::config::{cache::CacheConfig, otp::OtpConfig, rate_limit::RateLimitConfig};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Redis cache configuration
        pub cache: CacheConfig,
        /// OTP lifecycle configuration
        pub otp: OtpConfig,
        /// Rate limiting configuration
        pub rate_limit: RateLimitConfig,
        /// SMS delivery configuration
        pub sms: SmsConfig,
    }

    /// SMS service configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SmsConfig {
        /// SMS service provider ("twilio", "mock")
        pub provider: String,
        /// API credentials
        pub api_key: String,
        /// API secret/token
        pub api_secret: String,
        /// From phone number
        pub from_number: String,
    }

    impl Default for InfrastructureConfig {
        fn default() -> Self {
            Self {
                cache: CacheConfig::default(),
                otp: OtpConfig::default(),
                rate_limit: RateLimitConfig::default(),
                sms: SmsConfig {
                    provider: "mock".to_string(),
                    api_key: String::new(),
                    api_secret: String::new(),
                    from_number: "+1234567890".to_string(),
                },
            }
        }
    }
}

/// Load infrastructure configuration from the environment.
///
/// Reads a `.env` file when present, then environment variables, and
/// validates the OTP and rate limit settings before returning.
pub fn load_config() -> Result<config::InfrastructureConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let cache = sv_shared::config::cache::CacheConfig::from_env();
    let otp = sv_shared::config::otp::OtpConfig::from_env();
    let rate_limit = sv_shared::config::rate_limit::RateLimitConfig::from_env();

    otp.validate().map_err(InfrastructureError::Config)?;
    rate_limit.validate().map_err(InfrastructureError::Config)?;

    let sms = config::SmsConfig {
        provider: std::env::var("SMS_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
        api_key: std::env::var("SMS_API_KEY").unwrap_or_default(),
        api_secret: std::env::var("SMS_API_SECRET").unwrap_or_default(),
        from_number: std::env::var("SMS_FROM_NUMBER")
            .unwrap_or_else(|_| "+1234567890".to_string()),
    };

    Ok(config::InfrastructureConfig {
        cache,
        otp,
        rate_limit,
        sms,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),
}
