//! Cache module for Redis-based backends
//!
//! Provides the Redis client plus the Redis-backed implementations of the
//! core `OtpStore` and `RateLimiter` capability traits.

pub mod otp_store;
pub mod rate_limiter;
pub mod redis_client;

pub use otp_store::RedisOtpStore;
pub use rate_limiter::RedisRateLimiter;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use sv_shared::config::cache::CacheConfig;
