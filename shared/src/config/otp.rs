//! OTP lifecycle configuration module

use serde::{Deserialize, Serialize};

/// OTP lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Validity window of an issued code in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Maximum number of verification attempts per issued code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            ttl_seconds: default_ttl_seconds(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let code_length = std::env::var("OTP_CODE_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_code_length);
        let ttl_seconds = std::env::var("OTP_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_ttl_seconds);
        let max_attempts = std::env::var("OTP_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_attempts);

        Self {
            code_length,
            ttl_seconds,
            max_attempts,
        }
    }

    /// Validate the configuration at startup
    ///
    /// Code length is constrained to 4-8 digits: shorter codes are
    /// guessable within the attempt budget, longer ones defeat manual entry.
    pub fn validate(&self) -> Result<(), String> {
        if !(4..=8).contains(&self.code_length) {
            return Err(format!(
                "code_length must be between 4 and 8, got {}",
                self.code_length
            ));
        }
        if self.ttl_seconds == 0 {
            return Err("ttl_seconds must be greater than zero".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn default_code_length() -> usize {
    6
}

fn default_ttl_seconds() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OtpConfig::default();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.ttl_seconds, 300);
        assert_eq!(config.max_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_code_length_bounds() {
        let mut config = OtpConfig::default();

        config.code_length = 3;
        assert!(config.validate().is_err());

        config.code_length = 9;
        assert!(config.validate().is_err());

        config.code_length = 4;
        assert!(config.validate().is_ok());

        config.code_length = 8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ttl_and_attempts() {
        let mut config = OtpConfig::default();
        config.ttl_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = OtpConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
