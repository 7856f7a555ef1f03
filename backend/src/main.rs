//! Backend entry-point: loads settings, applies migrations, wires adapters,
//! and serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::{Clock, DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, create_server};
use textbook_api::domain::ports::TokenService;
use textbook_api::inbound::http::health::HealthState;
use textbook_api::inbound::http::token_config::{BuildMode, token_secret_from_env};
use textbook_api::outbound::cache::{RedisPool, RedisPoolConfig};
use textbook_api::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use textbook_api::outbound::token::JwtTokenService;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("load settings")?;
    let database_url = settings.database_url()?;
    let bind_addr = settings.bind_addr()?;
    let build_mode = BuildMode::from_debug_assertions();
    let captcha_fixture = settings
        .captcha_fixture_answer(build_mode)?
        .map(str::to_owned);

    let secret = token_secret_from_env(&DefaultEnv::new(), build_mode)
        .wrap_err("load token secret")?;
    if secret.is_ephemeral() {
        warn!("tokens will not survive a restart");
    }
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
        secret.expose(),
        settings.token_issuer(),
        settings.token_lifetime(),
        clock,
    ));
    drop(secret);

    run_pending_migrations(database_url)
        .await
        .wrap_err("apply database migrations")?;
    let db_pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("build database pool")?;
    let redis_pool = RedisPool::new(RedisPoolConfig::new(settings.redis_url()))
        .await
        .wrap_err("build redis pool")?;

    let config = ServerConfig::new(bind_addr, db_pool, redis_pool, tokens)
        .with_content_cache_ttl(settings.content_cache_ttl())
        .with_sms_code_ttl(settings.sms_code_ttl())
        .with_captcha_fixture(captcha_fixture);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("start http server")?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("http server failed")
}
