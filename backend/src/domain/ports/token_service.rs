//! Port for minting and verifying signed access tokens.
use crate::domain::{AccessToken, AuthClaims, AuthError, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while issuing tokens.
    pub enum TokenIssueError {
        /// Signing the claim set failed.
        Signing { message: String } => "token signing failed: {message}"
            as internal("failed to create token"),
    }
}

/// Stateless token codec keyed by a single shared secret.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `uid` valid from now for the configured lifetime.
    fn issue(&self, uid: UserId) -> Result<AccessToken, TokenIssueError>;

    /// Decode and validate a bare token (no scheme prefix).
    fn verify(&self, token: &str) -> Result<AuthClaims, AuthError>;
}
