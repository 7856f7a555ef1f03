//! Wiring of outbound adapters into the services behind [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use textbook_api::domain::ports::{CaptchaVerifier, FixtureCaptchaVerifier};
use textbook_api::domain::{AccountCollaborators, AccountService, SmsCodeService, TextbookService};
use textbook_api::inbound::http::state::HttpState;
use textbook_api::outbound::cache::{
    RedisCaptchaVerifier, RedisContentCache, RedisPool, RedisVerificationCodeStore,
};
use textbook_api::outbound::password::Argon2PasswordHasher;
use textbook_api::outbound::persistence::{DieselTextbookRepository, DieselUserRepository};
use textbook_api::outbound::sms::LoggingSmsSender;

use super::ServerConfig;

fn build_captcha_verifier(
    redis: &RedisPool,
    fixture_answer: Option<&str>,
) -> Arc<dyn CaptchaVerifier> {
    match fixture_answer {
        Some(answer) => {
            warn!("captcha checks use a fixed answer (dev only)");
            Arc::new(FixtureCaptchaVerifier::new(answer))
        }
        None => Arc::new(RedisCaptchaVerifier::new(redis.clone())),
    }
}

/// Build the handler state from live PostgreSQL and Redis pools.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let textbooks = Arc::new(TextbookService::new(
        Arc::new(DieselTextbookRepository::new(config.db_pool.clone())),
        Arc::new(RedisContentCache::new(config.redis_pool.clone())),
        config.content_cache_ttl,
        clock,
    ));

    let codes = Arc::new(RedisVerificationCodeStore::new(config.redis_pool.clone()));
    let accounts = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(config.db_pool.clone())),
        Arc::clone(&codes),
        AccountCollaborators {
            captcha: build_captcha_verifier(
                &config.redis_pool,
                config.captcha_fixture_answer.as_deref(),
            ),
            hasher: Arc::new(Argon2PasswordHasher),
            tokens: Arc::clone(&config.tokens),
        },
    ));
    let sms_codes = Arc::new(SmsCodeService::new(
        codes,
        Arc::new(LoggingSmsSender),
        config.sms_code_ttl,
    ));

    web::Data::new(HttpState {
        login: accounts.clone(),
        profile: accounts,
        sms_codes,
        textbooks: textbooks.clone(),
        textbook_commands: textbooks,
    })
}
