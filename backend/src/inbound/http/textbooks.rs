//! Textbook API handlers. Every route requires a bearer token.
//!
//! ```text
//! GET /api/v1/textbooks
//! GET /api/v1/textbooks/subscription
//! GET /api/v1/textbooks/42
//! POST /api/v1/textbooks/42/versions {"versionNo":"1.1.0","content":"..."}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::PublishVersionRequest;
use crate::domain::{
    Error, Textbook, TextbookContent, TextbookId, UserOperation, VersionSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/textbooks/{id}/versions`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishVersionBody {
    #[schema(example = "1.1.0")]
    pub version_no: String,
    pub content: String,
}

/// Parse the path segment, failing closed on anything but a positive integer.
fn parse_textbook_id(raw: &str) -> Result<TextbookId, Error> {
    TextbookId::parse(raw).map_err(|err| {
        warn!(raw, "rejecting malformed textbook id");
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_id" }))
    })
}

/// Textbooks authored by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/textbooks",
    responses(
        (status = 200, description = "Authored textbooks", body = Envelope<Vec<Textbook>>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 404, description = "Caller has no textbooks", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema)
    ),
    tags = ["textbooks"],
    operation_id = "listAuthoredTextbooks"
)]
#[get("/textbooks", wrap = "crate::middleware::AuthGate")]
pub async fn list_authored(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<Vec<Textbook>>>> {
    let textbooks = state.textbooks.authored(caller.id()).await?;
    Ok(web::Json(Envelope::ok(textbooks)))
}

/// Subscription relations of the caller.
#[utoipa::path(
    get,
    path = "/api/v1/textbooks/subscription",
    responses(
        (status = 200, description = "Subscriptions", body = Envelope<Vec<UserOperation>>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 404, description = "Caller has no subscriptions", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema)
    ),
    tags = ["textbooks"],
    operation_id = "listSubscriptions"
)]
#[get("/textbooks/subscription", wrap = "crate::middleware::AuthGate")]
pub async fn list_subscriptions(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<Vec<UserOperation>>>> {
    let operations = state.textbooks.subscriptions(caller.id()).await?;
    Ok(web::Json(Envelope::ok(operations)))
}

/// Latest content and version catalogue of a textbook the caller owns.
///
/// Unknown textbooks and textbooks owned by someone else both yield 403.
#[utoipa::path(
    get,
    path = "/api/v1/textbooks/{id}",
    params(("id" = i64, Path, description = "Textbook identifier")),
    responses(
        (status = 200, description = "Latest content", body = Envelope<TextbookContent>),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Not owned by caller", body = ErrorSchema),
        (status = 404, description = "No published version", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema)
    ),
    tags = ["textbooks"],
    operation_id = "getTextbookContent"
)]
#[get("/textbooks/{id}", wrap = "crate::middleware::AuthGate")]
pub async fn get_content(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<TextbookContent>>> {
    let id = parse_textbook_id(&path)?;
    let content = state.textbooks.content(caller.id(), id).await?;
    Ok(web::Json(Envelope::ok(content)))
}

/// Publish a new version of a textbook the caller owns.
#[utoipa::path(
    post,
    path = "/api/v1/textbooks/{id}/versions",
    params(("id" = i64, Path, description = "Textbook identifier")),
    request_body = PublishVersionBody,
    responses(
        (status = 200, description = "Version stored", body = Envelope<VersionSummary>),
        (status = 400, description = "Invalid version number or content", body = ErrorSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Not owned by caller", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema)
    ),
    tags = ["textbooks"],
    operation_id = "publishTextbookVersion"
)]
#[post("/textbooks/{id}/versions", wrap = "crate::middleware::AuthGate")]
pub async fn publish_version(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<PublishVersionBody>,
) -> ApiResult<web::Json<Envelope<VersionSummary>>> {
    let textbook_id = parse_textbook_id(&path)?;
    let PublishVersionBody {
        version_no,
        content,
    } = payload.into_inner();
    let summary = state
        .textbook_commands
        .publish_version(PublishVersionRequest {
            subject: caller.id(),
            textbook_id,
            version_no,
            content,
        })
        .await?;
    Ok(web::Json(Envelope::ok(summary)))
}
