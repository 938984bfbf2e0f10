//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

/// A single fixed-window limit: at most `limit` operations per
/// `window_seconds` bucket.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LimitWindow {
    /// Maximum operations within the window
    pub limit: u32,

    /// Window duration in seconds
    pub window_seconds: u64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Limit on code issuance requests per identifier
    pub issuance: LimitWindow,

    /// Limit on verification attempts per identifier
    pub verification: LimitWindow,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            issuance: LimitWindow {
                limit: 3,
                window_seconds: 3600, // 1 hour
            },
            verification: LimitWindow {
                limit: 10,
                window_seconds: 900, // 15 minutes
            },
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            issuance: LimitWindow {
                limit: env_u32("RATE_LIMIT_ISSUANCE_LIMIT", defaults.issuance.limit),
                window_seconds: env_u64(
                    "RATE_LIMIT_ISSUANCE_WINDOW_SECONDS",
                    defaults.issuance.window_seconds,
                ),
            },
            verification: LimitWindow {
                limit: env_u32("RATE_LIMIT_VERIFICATION_LIMIT", defaults.verification.limit),
                window_seconds: env_u64(
                    "RATE_LIMIT_VERIFICATION_WINDOW_SECONDS",
                    defaults.verification.window_seconds,
                ),
            },
        }
    }

    /// Validate the configuration at startup
    pub fn validate(&self) -> Result<(), String> {
        for (name, window) in [("issuance", &self.issuance), ("verification", &self.verification)] {
            if window.limit == 0 {
                return Err(format!("{} limit must be greater than zero", name));
            }
            if window.window_seconds == 0 {
                return Err(format!("{} window must be greater than zero", name));
            }
        }
        Ok(())
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            enabled: true,
            issuance: LimitWindow {
                limit: 30,
                window_seconds: 3600,
            },
            verification: LimitWindow {
                limit: 100,
                window_seconds: 900,
            },
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_enabled() -> bool {
    true
}
