//! Signing secret loading for bearer tokens.
//!
//! The secret is read from `HMAC_SECRET`, or from the file named by
//! `HMAC_SECRET_FILE` (default `/var/run/secrets/hmac_secret`). Debug builds
//! fall back to a random per-process secret when neither is available;
//! release builds refuse to start without a secret of at least
//! [`HMAC_SECRET_MIN_LEN`] bytes.

use std::path::PathBuf;

use mockable::Env;
use rand::RngCore;
use tracing::warn;
use zeroize::Zeroizing;

pub const HMAC_SECRET_ENV: &str = "HMAC_SECRET";
pub const HMAC_SECRET_FILE_ENV: &str = "HMAC_SECRET_FILE";
const HMAC_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/hmac_secret";
/// Shortest secret accepted in release builds (256 bits).
pub const HMAC_SECRET_MIN_LEN: usize = 32;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing or short secrets with a warning.
    Debug,
    /// Release builds require an explicit secret of sufficient length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textbook_api::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// HMAC key material, wiped on drop.
pub struct TokenSecret {
    bytes: Zeroizing<Vec<u8>>,
    ephemeral: bool,
}

impl TokenSecret {
    fn configured(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
            ephemeral: false,
        }
    }

    fn generate() -> Self {
        let mut bytes = vec![0_u8; HMAC_SECRET_MIN_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            bytes: Zeroizing::new(bytes),
            ephemeral: true,
        }
    }

    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the secret was generated at startup; tokens will not survive
    /// a restart.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSecret")
            .field("len", &self.bytes.len())
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Errors raised while loading the signing secret.
#[derive(thiserror::Error, Debug)]
pub enum TokenSecretError {
    /// Neither variable was set and the secret file could not be read.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configured secret is too short for release builds.
    #[error("token secret from {origin} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        origin: String,
        length: usize,
        min_len: usize,
    },
}

/// Load the signing secret from the environment.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use textbook_api::inbound::http::token_config::{BuildMode, token_secret_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "HMAC_SECRET" => Some("0123456789abcdef0123456789abcdef".to_owned()),
///     _ => None,
/// });
///
/// let secret = token_secret_from_env(&env, BuildMode::Release).unwrap();
/// assert_eq!(secret.expose().len(), 32);
/// assert!(!secret.is_ephemeral());
/// ```
pub fn token_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSecret, TokenSecretError> {
    if let Some(value) = env.string(HMAC_SECRET_ENV).filter(|value| !value.is_empty()) {
        let bytes = Zeroizing::new(value.into_bytes());
        return checked(bytes.to_vec(), HMAC_SECRET_ENV.to_owned(), mode);
    }

    let path = PathBuf::from(
        env.string(HMAC_SECRET_FILE_ENV)
            .unwrap_or_else(|| HMAC_SECRET_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(raw) => {
            let raw = Zeroizing::new(raw);
            let trimmed = trim_trailing_newlines(&raw).to_vec();
            checked(trimmed, path.display().to_string(), mode)
        }
        Err(error) if mode.is_debug() => {
            warn!(
                path = %path.display(),
                error = %error,
                "using ephemeral token secret (dev only)"
            );
            Ok(TokenSecret::generate())
        }
        Err(error) => Err(TokenSecretError::SecretRead {
            path,
            source: error,
        }),
    }
}

fn checked(bytes: Vec<u8>, origin: String, mode: BuildMode) -> Result<TokenSecret, TokenSecretError> {
    let secret = TokenSecret::configured(bytes);
    let length = secret.expose().len();
    if length >= HMAC_SECRET_MIN_LEN {
        return Ok(secret);
    }
    if mode.is_debug() {
        warn!(origin = %origin, length, "token secret shorter than recommended");
        return Ok(secret);
    }
    Err(TokenSecretError::SecretTooShort {
        origin,
        length,
        min_len: HMAC_SECRET_MIN_LEN,
    })
}

fn trim_trailing_newlines(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| !matches!(byte, b'\n' | b'\r'))
        .map_or(0, |index| index + 1);
    &bytes[..end]
}
