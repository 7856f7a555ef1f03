//! Port for short-lived SMS verification codes keyed by phone number.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::PhoneNumber;

use super::define_port_error;

define_port_error! {
    /// Errors raised by verification code stores.
    pub enum VerificationCodeStoreError {
        /// Store backend is unavailable or timing out.
        Backend { message: String } => "verification code store failure: {message}"
            as service_unavailable("verification code store unavailable"),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    /// Store `code` for `phone`, replacing any previous code.
    async fn put(
        &self,
        phone: &PhoneNumber,
        code: &str,
        ttl: Duration,
    ) -> Result<(), VerificationCodeStoreError>;

    /// Current unexpired code for `phone`.
    async fn get(&self, phone: &PhoneNumber)
    -> Result<Option<String>, VerificationCodeStoreError>;
}
