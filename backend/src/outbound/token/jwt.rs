//! HMAC-signed JWT implementation of [`TokenService`].
//!
//! Tokens carry `iss`, `iat`, `exp`, `nbf` and `uid` claims. Issuing always
//! signs with HS256; verification accepts any member of the HMAC family so
//! tokens minted with a longer digest by another deployment still validate.
//! Time windows are checked against the injected clock with no leeway.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenIssueError, TokenService};
use crate::domain::{AccessToken, AuthClaims, AuthError, UserId};

/// Issuer stamped into every token.
pub const DEFAULT_ISSUER: &str = "textbook-api";

/// Validity window of issued tokens.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Shared-secret token codec.
pub struct JwtTokenService {
    secret: Zeroizing<Vec<u8>>,
    issuer: String,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        lifetime: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            issuer: issuer.into(),
            lifetime,
            clock,
        }
    }

    fn lifetime_secs(&self) -> i64 {
        i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Read the `alg` member of the JOSE header without trusting the rest.
///
/// `jsonwebtoken` refuses to parse algorithms it does not know (including
/// `none`), so the header is decoded by hand to tell an unsupported
/// algorithm apart from a corrupt token.
fn signing_algorithm(token: &str) -> Result<Algorithm, AuthError> {
    let segment = token.split('.').next().ok_or(AuthError::InvalidToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::InvalidToken)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)?;
    match header.alg.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(AuthError::UnsupportedAlgorithm),
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, uid: UserId) -> Result<AccessToken, TokenIssueError> {
        let now = self.clock.utc().timestamp();
        let lifetime = self.lifetime_secs();
        let claims = AuthClaims::issue(self.issuer.clone(), uid, now, lifetime);
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| TokenIssueError::signing(err.to_string()))?;
        Ok(AccessToken {
            token,
            expires_in: lifetime,
        })
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let algorithm = signing_algorithm(token)?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        let data = jsonwebtoken::decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|err| {
            debug!(error = %err, "token rejected");
            AuthError::InvalidToken
        })?;

        let claims = data.claims;
        if !claims.is_valid_at(self.clock.utc().timestamp()) {
            return Err(AuthError::TokenExpiredOrNotYetValid);
        }
        claims.subject()?;
        Ok(claims)
    }
}
