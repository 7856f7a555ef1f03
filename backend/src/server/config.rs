//! Startup settings and the server configuration object built from them.

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use textbook_api::domain::ports::TokenService;
use textbook_api::inbound::http::token_config::BuildMode;
use textbook_api::outbound::cache::RedisPool;
use textbook_api::outbound::persistence::DbPool;
use textbook_api::outbound::token::{DEFAULT_ISSUER, DEFAULT_TOKEN_LIFETIME};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/";
const DEFAULT_CONTENT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_SMS_CODE_TTL: Duration = Duration::from_secs(5 * 60);

/// Errors raised while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("{name} is not accepted in release builds")]
    DevOnlyInRelease { name: &'static str },
}

/// Application settings loaded via OrthoConfig from `TEXTBOOK_*` variables,
/// configuration files, and CLI flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TEXTBOOK")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Redis connection URL.
    pub redis_url: Option<String>,
    /// Seconds a resolved latest version stays cached.
    pub content_cache_ttl_secs: Option<u64>,
    /// Seconds an SMS verification code stays valid.
    pub sms_code_ttl_secs: Option<u64>,
    /// Seconds an issued access token stays valid.
    pub token_lifetime_secs: Option<u64>,
    /// `iss` claim written into issued tokens.
    pub token_issuer: Option<String>,
    /// Fixed captcha answer accepted for every challenge. Debug builds
    /// only; when unset, answers are checked against Redis.
    pub captcha_fixture_answer: Option<String>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                name: "TEXTBOOK_DATABASE_URL",
            })
    }

    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    pub fn content_cache_ttl(&self) -> Duration {
        self.content_cache_ttl_secs
            .map_or(DEFAULT_CONTENT_CACHE_TTL, Duration::from_secs)
    }

    pub fn sms_code_ttl(&self) -> Duration {
        self.sms_code_ttl_secs
            .map_or(DEFAULT_SMS_CODE_TTL, Duration::from_secs)
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime_secs
            .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs)
    }

    pub fn token_issuer(&self) -> &str {
        self.token_issuer.as_deref().unwrap_or(DEFAULT_ISSUER)
    }

    /// Fixed captcha answer, refused outright in release builds.
    pub fn captcha_fixture_answer(&self, mode: BuildMode) -> Result<Option<&str>, SettingsError> {
        let answer = self
            .captcha_fixture_answer
            .as_deref()
            .filter(|answer| !answer.trim().is_empty());
        match (answer, mode) {
            (Some(_), BuildMode::Release) => Err(SettingsError::DevOnlyInRelease {
                name: "TEXTBOOK_CAPTCHA_FIXTURE_ANSWER",
            }),
            (answer, _) => Ok(answer),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) redis_pool: RedisPool,
    pub(crate) tokens: Arc<dyn TokenService>,
    pub(crate) content_cache_ttl: Duration,
    pub(crate) sms_code_ttl: Duration,
    pub(crate) captcha_fixture_answer: Option<String>,
}

impl ServerConfig {
    /// Construct a server configuration with default TTLs.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        db_pool: DbPool,
        redis_pool: RedisPool,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            bind_addr,
            db_pool,
            redis_pool,
            tokens,
            content_cache_ttl: DEFAULT_CONTENT_CACHE_TTL,
            sms_code_ttl: DEFAULT_SMS_CODE_TTL,
            captcha_fixture_answer: None,
        }
    }

    #[must_use]
    pub fn with_content_cache_ttl(mut self, ttl: Duration) -> Self {
        self.content_cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_sms_code_ttl(mut self, ttl: Duration) -> Self {
        self.sms_code_ttl = ttl;
        self
    }

    /// Accept `answer` for every captcha instead of consulting Redis.
    #[must_use]
    pub fn with_captcha_fixture(mut self, answer: Option<String>) -> Self {
        self.captcha_fixture_answer = answer;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "TEXTBOOK_BIND_ADDR",
        "TEXTBOOK_DATABASE_URL",
        "TEXTBOOK_REDIS_URL",
        "TEXTBOOK_CONTENT_CACHE_TTL_SECS",
        "TEXTBOOK_SMS_CODE_TTL_SECS",
        "TEXTBOOK_TOKEN_LIFETIME_SECS",
        "TEXTBOOK_TOKEN_ISSUER",
        "TEXTBOOK_CAPTCHA_FIXTURE_ANSWER",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("textbook-api")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            SocketAddr::from(([0, 0, 0, 0], 8080))
        );
        assert_eq!(settings.redis_url(), DEFAULT_REDIS_URL);
        assert_eq!(settings.content_cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.sms_code_ttl(), Duration::from_secs(300));
        assert_eq!(settings.token_lifetime(), Duration::from_secs(7200));
        assert_eq!(settings.token_issuer(), DEFAULT_ISSUER);
        assert_eq!(
            settings
                .captcha_fixture_answer(BuildMode::Release)
                .expect("no fixture configured"),
            None
        );
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::Missing { .. })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("TEXTBOOK_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "TEXTBOOK_DATABASE_URL",
                Some("postgres://localhost/textbooks".to_owned()),
            ),
            ("TEXTBOOK_REDIS_URL", Some("redis://cache:6379/1".to_owned())),
            ("TEXTBOOK_CONTENT_CACHE_TTL_SECS", Some("60".to_owned())),
            ("TEXTBOOK_SMS_CODE_TTL_SECS", Some("120".to_owned())),
            ("TEXTBOOK_TOKEN_LIFETIME_SECS", Some("900".to_owned())),
            ("TEXTBOOK_TOKEN_ISSUER", Some("edu".to_owned())),
            ("TEXTBOOK_CAPTCHA_FIXTURE_ANSWER", Some("abcd".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            SocketAddr::from(([127, 0, 0, 1], 9000))
        );
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://localhost/textbooks"
        );
        assert_eq!(settings.redis_url(), "redis://cache:6379/1");
        assert_eq!(settings.content_cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.sms_code_ttl(), Duration::from_secs(120));
        assert_eq!(settings.token_lifetime(), Duration::from_secs(900));
        assert_eq!(settings.token_issuer(), "edu");
        assert_eq!(
            settings
                .captcha_fixture_answer(BuildMode::Debug)
                .expect("debug accepts fixture"),
            Some("abcd")
        );
    }

    #[rstest]
    fn release_builds_refuse_captcha_fixture() {
        let _guard = lock_env(VARS.map(|name| {
            let value = (name == "TEXTBOOK_CAPTCHA_FIXTURE_ANSWER").then(|| "abcd".to_owned());
            (name, value)
        }));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.captcha_fixture_answer(BuildMode::Release),
            Err(SettingsError::DevOnlyInRelease {
                name: "TEXTBOOK_CAPTCHA_FIXTURE_ANSWER"
            })
        ));
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let _guard = lock_env(VARS.map(|name| {
            let value = (name == "TEXTBOOK_BIND_ADDR").then(|| "localhost".to_owned());
            (name, value)
        }));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { .. })
        ));
    }
}
