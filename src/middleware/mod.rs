//! Middleware for the checkout service.
//!
//! - `rate_limit` - Per-IP rate limiting using Governor

pub mod rate_limit;

pub use rate_limit::{
    create_rate_limiter, create_rate_limiter_config, RateLimiter, RateLimiterConfig,
};
