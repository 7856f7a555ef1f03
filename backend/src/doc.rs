//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: account, textbook, and health endpoints from the inbound layer
//! - **Schemas**: request and response bodies plus the [`ErrorSchema`] and
//!   [`ErrorCodeSchema`] wrappers describing the error payload
//! - **Security**: HTTP bearer authentication with HMAC-signed JWTs
//!
//! The generated specification is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{
    LatestVersion, Textbook, TextbookContent, User, UserOperation, UserProfile, VersionSummary,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::textbooks::PublishVersionBody;
use crate::inbound::http::users::{LoginRequest, RegistrationRequest, SessionResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/v1/user/login or POST /api/v1/user.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Textbook API",
        description = "Accounts, textbook catalogue, and versioned content behind bearer authentication.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::send_sms_code,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::textbooks::list_authored,
        crate::inbound::http::textbooks::list_subscriptions,
        crate::inbound::http::textbooks::get_content,
        crate::inbound::http::textbooks::publish_version,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        User,
        UserProfile,
        Textbook,
        TextbookContent,
        LatestVersion,
        VersionSummary,
        UserOperation,
        RegistrationRequest,
        LoginRequest,
        SessionResponse,
        PublishVersionBody,
    )),
    tags(
        (name = "users", description = "Registration, login, and profiles"),
        (name = "textbooks", description = "Authored textbooks and their versions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
