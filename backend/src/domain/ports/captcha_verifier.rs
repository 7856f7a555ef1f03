//! Port for checking captcha answers.
//!
//! Captcha images are produced elsewhere; this service only needs to ask
//! whether an answer matches the challenge it was issued for.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by captcha verifiers.
    pub enum CaptchaVerifierError {
        /// Verifier backend is unavailable.
        Backend { message: String } => "captcha verifier failure: {message}"
            as service_unavailable("captcha verification unavailable"),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Whether `code` answers challenge `id`. A challenge is consumed by the
    /// first verification attempt.
    async fn verify(&self, id: &str, code: &str) -> Result<bool, CaptchaVerifierError>;
}

/// Verifier that accepts a single fixed answer, for local development.
#[derive(Debug, Clone)]
pub struct FixtureCaptchaVerifier {
    answer: String,
}

impl FixtureCaptchaVerifier {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for FixtureCaptchaVerifier {
    async fn verify(&self, _id: &str, code: &str) -> Result<bool, CaptchaVerifierError> {
        Ok(code.eq_ignore_ascii_case(&self.answer))
    }
}
