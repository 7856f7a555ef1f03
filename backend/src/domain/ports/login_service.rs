//! Driving ports for account use-cases.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters call them to
//! register, authenticate, and read profiles without knowing the backing
//! infrastructure. HTTP handler tests substitute mocks instead of wiring
//! persistence.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, Error, LoginCredentials, PhoneNumber, Registration, User, UserId,
};

/// Outcome of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub user: User,
    pub token: AccessToken,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error>;

    /// Create an account and issue a token for it.
    async fn register(&self, registration: &Registration) -> Result<AuthenticatedSession, Error>;
}

/// Domain use-case port for reading user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Profile `id` as seen by `caller`; callers may only read their own.
    async fn fetch_profile(&self, caller: UserId, id: UserId) -> Result<User, Error>;
}

/// Domain use-case port for issuing SMS verification codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationCodeCommand: Send + Sync {
    /// Generate, store, and deliver a fresh code for `phone`.
    async fn send_code(&self, phone: &PhoneNumber) -> Result<(), Error>;
}
