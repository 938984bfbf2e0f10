//! Configuration modules for the SwiftVerify backend.
//!
//! Each configuration struct carries sensible defaults, can be populated
//! from environment variables, and validates itself at startup.

pub mod cache;
pub mod otp;
pub mod rate_limit;

pub use cache::CacheConfig;
pub use otp::OtpConfig;
pub use rate_limit::{LimitWindow, RateLimitConfig};
