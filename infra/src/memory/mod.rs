//! In-process backends for development and single-instance testing
//!
//! These satisfy the same capability traits as the Redis backends but keep
//! all state behind one async mutex, so their atomicity guarantees only
//! hold within a single process.

pub mod otp_store;
pub mod rate_limiter;

pub use otp_store::MemoryOtpStore;
pub use rate_limiter::MemoryRateLimiter;
