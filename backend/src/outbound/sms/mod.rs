//! SMS delivery adapters.
//!
//! No carrier gateway is wired in; [`LoggingSmsSender`] records the code in
//! the structured log so development and staging environments can complete
//! registration.

use async_trait::async_trait;
use tracing::info;

use crate::domain::PhoneNumber;
use crate::domain::ports::{SmsSender, SmsSenderError};

/// Sender that writes codes to the log instead of a carrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSmsSender;

#[async_trait]
impl SmsSender for LoggingSmsSender {
    async fn send_code(&self, phone: &PhoneNumber, code: &str) -> Result<(), SmsSenderError> {
        info!(phone = %phone, code, "sms verification code issued");
        Ok(())
    }
}
