//! Port implementations over [`RedisPool`].

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::PhoneNumber;
use crate::domain::ports::{
    CaptchaVerifier, CaptchaVerifierError, ContentCache, ContentCacheError, ContentCacheKey,
    VerificationCodeStore, VerificationCodeStoreError,
};

use super::RedisPool;

/// Prefix of the keys holding captcha answers.
pub const CAPTCHA_KEY_PREFIX: &str = "captcha_";

/// Redis key for captcha challenge `id`.
///
/// # Examples
/// ```
/// use textbook_api::outbound::cache::captcha_key;
///
/// assert_eq!(captcha_key("a1b2"), "captcha_a1b2");
/// ```
pub fn captcha_key(id: &str) -> String {
    format!("{CAPTCHA_KEY_PREFIX}{id}")
}

/// Redis rejects a zero `EX`; round sub-second TTLs up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

async fn get_string(pool: &RedisPool, key: &str) -> Result<Option<String>, String> {
    let mut conn = pool.get().await.map_err(|err| err.to_string())?;
    let value: Option<String> = redis::cmd("GET")
        .arg(key)
        .query_async(&mut *conn)
        .await
        .map_err(|err: RedisError| err.to_string())?;
    Ok(value)
}

async fn set_with_expiry(
    pool: &RedisPool,
    key: &str,
    value: &str,
    ttl: Duration,
) -> Result<(), String> {
    let mut conn = pool.get().await.map_err(|err| err.to_string())?;
    let _: () = redis::cmd("SET")
        .arg(key)
        .arg(value)
        .arg("EX")
        .arg(ttl_seconds(ttl))
        .query_async(&mut *conn)
        .await
        .map_err(|err: RedisError| err.to_string())?;
    Ok(())
}

/// [`ContentCache`] storing plain content strings with `SET .. EX`.
#[derive(Clone)]
pub struct RedisContentCache {
    pool: RedisPool,
}

impl RedisContentCache {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentCache for RedisContentCache {
    async fn get(&self, key: &ContentCacheKey) -> Result<Option<String>, ContentCacheError> {
        get_string(&self.pool, key.as_str())
            .await
            .map_err(ContentCacheError::backend)
    }

    async fn set(
        &self,
        key: &ContentCacheKey,
        content: &str,
        ttl: Duration,
    ) -> Result<(), ContentCacheError> {
        set_with_expiry(&self.pool, key.as_str(), content, ttl)
            .await
            .map_err(ContentCacheError::backend)
    }
}

/// [`VerificationCodeStore`] keyed by the bare phone number.
#[derive(Clone)]
pub struct RedisVerificationCodeStore {
    pool: RedisPool,
}

impl RedisVerificationCodeStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationCodeStore for RedisVerificationCodeStore {
    async fn put(
        &self,
        phone: &PhoneNumber,
        code: &str,
        ttl: Duration,
    ) -> Result<(), VerificationCodeStoreError> {
        set_with_expiry(&self.pool, phone.as_ref(), code, ttl)
            .await
            .map_err(VerificationCodeStoreError::backend)
    }

    async fn get(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<String>, VerificationCodeStoreError> {
        get_string(&self.pool, phone.as_ref())
            .await
            .map_err(VerificationCodeStoreError::backend)
    }
}

/// [`CaptchaVerifier`] consuming answers with `GETDEL` so each challenge
/// can be tried once.
#[derive(Clone)]
pub struct RedisCaptchaVerifier {
    pool: RedisPool,
}

impl RedisCaptchaVerifier {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn take_answer(&self, id: &str) -> Result<Option<String>, String> {
        let mut conn = self.pool.get().await.map_err(|err| err.to_string())?;
        redis::cmd("GETDEL")
            .arg(captcha_key(id))
            .query_async(&mut *conn)
            .await
            .map_err(|err: RedisError| err.to_string())
    }
}

#[async_trait]
impl CaptchaVerifier for RedisCaptchaVerifier {
    async fn verify(&self, id: &str, code: &str) -> Result<bool, CaptchaVerifierError> {
        let answer = self
            .take_answer(id)
            .await
            .map_err(CaptchaVerifierError::backend)?;
        match answer {
            Some(answer) => Ok(answer.eq_ignore_ascii_case(code)),
            None => {
                debug!(captcha_id = id, "captcha challenge unknown or expired");
                Ok(false)
            }
        }
    }
}
