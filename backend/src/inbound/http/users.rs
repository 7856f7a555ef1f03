//! Account API handlers.
//!
//! ```text
//! POST /api/v1/user {"username":"ada","phone":"13800138000","password":"...","captchaId":"c1","captcha":"4821","smsCode":"123456"}
//! POST /api/v1/user/login {"phone":"13800138000","password":"...","captchaId":"c1","captcha":"4821"}
//! GET /api/v1/user/sms?phone=13800138000
//! GET /api/v1/user/7
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::AuthenticatedSession;
use crate::domain::{
    CaptchaAnswer, CredentialValidationError, Error, LoginCredentials, PhoneNumber, Registration,
    User, UserId, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::{Envelope, OK_MESSAGE};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/user`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "13800138000")]
    pub phone: String,
    pub password: String,
    pub captcha_id: String,
    pub captcha: String,
    #[schema(example = "123456")]
    pub sms_code: String,
}

impl TryFrom<RegistrationRequest> for Registration {
    type Error = CredentialValidationError;

    fn try_from(value: RegistrationRequest) -> Result<Self, Self::Error> {
        let captcha = CaptchaAnswer::try_from_parts(&value.captcha_id, &value.captcha)?;
        Self::try_from_parts(
            &value.username,
            &value.phone,
            &value.password,
            captcha,
            &value.sms_code,
        )
    }
}

/// Login body for `POST /api/v1/user/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "13800138000")]
    pub phone: String,
    pub password: String,
    pub captcha_id: String,
    pub captcha: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let captcha = CaptchaAnswer::try_from_parts(&value.captcha_id, &value.captcha)?;
        Self::try_from_parts(&value.phone, &value.password, captcha)
    }
}

/// Token and account returned after login or registration.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(example = "OK")]
    pub message: &'static str,
    pub access_token: String,
    /// Token lifetime in seconds.
    #[schema(example = 7200)]
    pub expire_in: i64,
    pub data: User,
}

impl From<AuthenticatedSession> for SessionResponse {
    fn from(value: AuthenticatedSession) -> Self {
        Self {
            message: OK_MESSAGE,
            access_token: value.token.token,
            expire_in: value.token.expires_in,
            data: value.user,
        }
    }
}

/// Query for `GET /api/v1/user/sms`.
#[derive(Deserialize, IntoParams)]
pub struct SmsCodeQuery {
    /// Eleven-digit mobile number.
    #[serde(default)]
    pub phone: String,
}

fn map_credential_error(err: CredentialValidationError) -> Error {
    let (field, code) = match &err {
        CredentialValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialValidationError::EmptyCaptcha => ("captcha", "empty_captcha"),
        CredentialValidationError::EmptySmsCode => ("smsCode", "empty_sms_code"),
        CredentialValidationError::User(user) => user_field(user),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn user_field(err: &UserValidationError) -> (&'static str, &'static str) {
    match err {
        UserValidationError::InvalidId => ("id", "invalid_id"),
        UserValidationError::EmptyUsername => ("username", "empty_username"),
        UserValidationError::UsernameTooLong { .. } => ("username", "username_too_long"),
        UserValidationError::InvalidPhone { .. } => ("phone", "invalid_phone"),
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<i64>()
        .map_err(|_| UserValidationError::InvalidId)
        .and_then(UserId::new)
        .map_err(|err| {
            warn!(raw, "rejecting malformed user id");
            map_credential_error(err.into())
        })
}

/// Create an account and issue its first token.
#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/user")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let session = state.login.register(&registration).await?;
    Ok(web::Json(session.into()))
}

/// Authenticate with phone and password.
#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Invalid request or wrong password", body = ErrorSchema),
        (status = 404, description = "Phone not registered", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let session = state.login.login(&credentials).await?;
    Ok(web::Json(session.into()))
}

/// Send a registration verification code by SMS.
#[utoipa::path(
    get,
    path = "/api/v1/user/sms",
    params(SmsCodeQuery),
    responses(
        (status = 200, description = "Code sent", body = Envelope<String>),
        (status = 400, description = "Invalid phone number", body = ErrorSchema),
        (status = 503, description = "SMS gateway or code store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "sendSmsCode",
    security([])
)]
#[get("/user/sms")]
pub async fn send_sms_code(
    state: web::Data<HttpState>,
    query: web::Query<SmsCodeQuery>,
) -> ApiResult<web::Json<Envelope<String>>> {
    let phone = PhoneNumber::new(&query.phone)
        .map_err(|err| map_credential_error(CredentialValidationError::User(err)))?;
    state.sms_codes.send_code(&phone).await?;
    Ok(web::Json(Envelope::ok(phone.as_ref().to_owned())))
}

/// Fetch the caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/user/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile", body = Envelope<User>),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorSchema),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserProfile"
)]
#[get("/user/{id}", wrap = "crate::middleware::AuthGate")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<User>>> {
    let id = parse_user_id(&path)?;
    let user = state.profile.fetch_profile(caller.id(), id).await?;
    Ok(web::Json(Envelope::ok(user)))
}

#[cfg(test)]
mod tests;
