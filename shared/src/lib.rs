//! # SwiftVerify Shared
//!
//! Cross-cutting types shared by the SwiftVerify backend crates:
//! configuration structures validated at startup and identifier
//! (phone/email) normalization utilities.

pub mod config;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{
    cache::CacheConfig,
    otp::OtpConfig,
    rate_limit::{LimitWindow, RateLimitConfig},
};
pub use utils::identifier::{mask_identifier, normalize_identifier};
