//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, TextbookCommand, TextbookQuery, UserProfileQuery, VerificationCodeCommand,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// # use std::sync::Arc;
/// # use textbook_api::domain::ports::{
/// #     LoginService, TextbookCommand, TextbookQuery, UserProfileQuery, VerificationCodeCommand,
/// # };
/// use textbook_api::inbound::http::state::HttpState;
///
/// # fn build(
/// #     login: Arc<dyn LoginService>,
/// #     profile: Arc<dyn UserProfileQuery>,
/// #     sms_codes: Arc<dyn VerificationCodeCommand>,
/// #     textbooks: Arc<dyn TextbookQuery>,
/// #     textbook_commands: Arc<dyn TextbookCommand>,
/// # ) -> HttpState {
/// HttpState {
///     login,
///     profile,
///     sms_codes,
///     textbooks,
///     textbook_commands,
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub sms_codes: Arc<dyn VerificationCodeCommand>,
    pub textbooks: Arc<dyn TextbookQuery>,
    pub textbook_commands: Arc<dyn TextbookCommand>,
}
