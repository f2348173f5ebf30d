//! Rate limiting middleware using actix-governor.
//!
//! Each client IP gets its own token bucket, so one visitor hammering the
//! promo or submit endpoints cannot starve the others.

use actix_governor::governor::middleware::NoOpMiddleware;
use actix_governor::{Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};

use crate::config::ConfigError;

/// Type alias for the rate limiter configuration.
pub type RateLimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Type alias for the rate limiter.
pub type RateLimiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Builds the per-IP rate limit configuration.
///
/// The bucket refills one token every `seconds_per_request` seconds and holds
/// at most `burst_size` tokens.
pub fn create_rate_limiter_config(
    seconds_per_request: u64,
    burst_size: u32,
) -> Result<RateLimiterConfig, ConfigError> {
    GovernorConfigBuilder::default()
        .seconds_per_request(seconds_per_request)
        .burst_size(burst_size)
        .finish()
        .ok_or_else(|| ConfigError::InvalidValue {
            var: "RATE_LIMIT_SECONDS_PER_REQUEST / RATE_LIMIT_BURST".to_string(),
            message: "rate limit period and burst must be greater than zero".to_string(),
        })
}

/// Creates the rate limiter middleware for one worker.
///
/// ```ignore
/// let limits = create_rate_limiter_config(1, 30)?;
/// HttpServer::new(move || App::new().wrap(create_rate_limiter(&limits)))
/// ```
pub fn create_rate_limiter(config: &RateLimiterConfig) -> RateLimiter {
    Governor::new(config)
}
