//! Pooled multiplexed Redis connections via `bb8-redis`.

use std::time::Duration;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};

/// Errors raised while building or using the Redis pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedisPoolError {
    /// No connection became available in time.
    #[error("failed to get redis connection: {message}")]
    Checkout { message: String },

    /// URL was rejected or the first connection failed.
    #[error("failed to build redis pool: {message}")]
    Build { message: String },
}

impl RedisPoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for [`RedisPool`].
///
/// Defaults: 16 connections, 5 second checkout timeout.
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisPoolConfig {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 16,
            connection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }
}

/// Cloneable handle to the shared Redis pool.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
}

impl RedisPool {
    /// Build the pool and open its first connection.
    ///
    /// # Errors
    ///
    /// Returns [`RedisPoolError::Build`] when the URL is invalid or the
    /// server cannot be reached.
    pub async fn new(config: RedisPoolConfig) -> Result<Self, RedisPoolError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str())
            .map_err(|err| RedisPoolError::build(err.to_string()))?;
        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| RedisPoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    pub async fn get(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, RedisPoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| RedisPoolError::checkout(err.to_string()))
    }
}
