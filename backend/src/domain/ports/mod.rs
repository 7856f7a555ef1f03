//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod captcha_verifier;
mod content_cache;
mod login_service;
mod password_hasher;
mod sms_sender;
mod textbook_command;
mod textbook_query;
mod textbook_repository;
mod token_service;
mod user_repository;
mod verification_code_store;

pub use cache_key::ContentCacheKey;
#[cfg(test)]
pub use captcha_verifier::MockCaptchaVerifier;
pub use captcha_verifier::{CaptchaVerifier, CaptchaVerifierError, FixtureCaptchaVerifier};
#[cfg(test)]
pub use content_cache::MockContentCache;
pub use content_cache::{ContentCache, ContentCacheError};
pub use login_service::{
    AuthenticatedSession, LoginService, UserProfileQuery, VerificationCodeCommand,
};
#[cfg(test)]
pub use login_service::{MockLoginService, MockUserProfileQuery, MockVerificationCodeCommand};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use sms_sender::MockSmsSender;
pub use sms_sender::{SmsSender, SmsSenderError};
#[cfg(test)]
pub use textbook_command::MockTextbookCommand;
pub use textbook_command::{PublishVersionRequest, TextbookCommand};
#[cfg(test)]
pub use textbook_query::MockTextbookQuery;
pub use textbook_query::TextbookQuery;
#[cfg(test)]
pub use textbook_repository::MockTextbookRepository;
pub use textbook_repository::{TextbookRepository, TextbookRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenIssueError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use verification_code_store::MockVerificationCodeStore;
pub use verification_code_store::{VerificationCodeStore, VerificationCodeStoreError};
