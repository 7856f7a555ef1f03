//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services implementing the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, UserId, PhoneNumber: account identity.
//! - AuthClaims, AuthError: bearer token claim set and gate failures.
//! - Textbook, VersionNo, TextbookContent: textbook catalogue and content.
//! - TextbookService, AccountService, SmsCodeService: port implementations.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod sms_code_service;
pub mod textbook;
pub mod textbook_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountCollaborators, AccountService};
pub use self::auth::{
    AccessToken, AuthClaims, AuthError, CaptchaAnswer, CredentialValidationError,
    LoginCredentials, NewUser, PasswordHash, Registration, UserAccount,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::sms_code_service::{SMS_CODE_LEN, SmsCodeService, generate_sms_code};
pub use self::textbook::{
    LatestVersion, NewTextbookVersion, OperationKind, SUBSCRIPTION_CODES, Textbook,
    TextbookContent, TextbookId, TextbookValidationError, TextbookVersion, UserOperation,
    VERSION_NO_MAX, VersionId, VersionNo, VersionSummary,
};
pub use self::textbook_service::{NO_PERMISSION_MESSAGE, TextbookService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    PHONE_LEN, PhoneNumber, USERNAME_MAX, User, UserId, UserProfile, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use textbook_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
