//! Port interface for the textbook content cache.
use std::time::Duration;

use async_trait::async_trait;

use super::{ContentCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the content cache adapter.
    pub enum ContentCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "content cache backend failure: {message}",
    }
}

/// Best-effort key-value cache with TTL expiry.
///
/// The cache is never authoritative. Callers treat any error as a miss on
/// read and as a no-op on write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Read cached content; `Ok(None)` on a miss.
    async fn get(&self, key: &ContentCacheKey) -> Result<Option<String>, ContentCacheError>;

    /// Store `content` under `key`, expiring after `ttl`.
    async fn set(
        &self,
        key: &ContentCacheKey,
        content: &str,
        ttl: Duration,
    ) -> Result<(), ContentCacheError>;
}
