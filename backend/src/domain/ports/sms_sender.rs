//! Port for delivering verification codes by SMS.
use async_trait::async_trait;

use crate::domain::PhoneNumber;

use super::define_port_error;

define_port_error! {
    /// Errors raised by SMS delivery adapters.
    pub enum SmsSenderError {
        /// Gateway rejected the message or could not be reached.
        Delivery { message: String } => "sms delivery failed: {message}"
            as service_unavailable("failed to send sms"),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `code` to `phone`.
    async fn send_code(&self, phone: &PhoneNumber, code: &str) -> Result<(), SmsSenderError>;
}
