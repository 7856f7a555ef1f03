//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig, SettingsError};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use textbook_api::Trace;
#[cfg(debug_assertions)]
use textbook_api::doc::ApiDoc;
use textbook_api::domain::ports::TokenService;
use textbook_api::inbound::http::error::extractor_rejection;
use textbook_api::inbound::http::health::{HealthState, live, ready};
use textbook_api::inbound::http::state::HttpState;
use textbook_api::inbound::http::textbooks::{
    get_content, list_authored, list_subscriptions, publish_version,
};
use textbook_api::inbound::http::users::{get_profile, login, register, send_sms_code};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    tokens: web::Data<dyn TokenService>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        tokens,
    } = deps;

    // `/textbooks/subscription` is registered ahead of `/textbooks/{id}`.
    let api = web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(|err, _| extractor_rejection(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| extractor_rejection(err)))
        .service(register)
        .service(login)
        .service(send_sms_code)
        .service(get_profile)
        .service(list_authored)
        .service(list_subscriptions)
        .service(get_content)
        .service(publish_version);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(tokens)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] carrying pools, token service, and TTLs.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let tokens = web::Data::from(config.tokens.clone());
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            tokens: tokens.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
