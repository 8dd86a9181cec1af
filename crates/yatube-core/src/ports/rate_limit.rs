//! Rate limiting port, used to throttle credential submissions.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter keyed by client (usually the remote address).
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one attempt for `key` and report whether it may proceed.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub reset_after: Duration,
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}
