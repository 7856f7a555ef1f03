//! Redis-backed adapters for short-lived state.
//!
//! Three ports share one connection pool:
//! - [`RedisContentCache`]: cache-aside copy of the newest textbook content.
//! - [`RedisVerificationCodeStore`]: SMS codes keyed by phone number.
//! - [`RedisCaptchaVerifier`]: one-shot captcha answers written by the
//!   captcha renderer under `captcha_<id>`.
//!
//! All Redis failures are reported as the port's `Backend` error; the
//! domain decides whether that is fatal.

mod pool;
mod stores;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError};
pub use stores::{
    CAPTCHA_KEY_PREFIX, RedisCaptchaVerifier, RedisContentCache, RedisVerificationCodeStore,
    captcha_key,
};
