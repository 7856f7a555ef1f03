//! SMS verification code issuance.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{error, info};

use crate::domain::ports::{SmsSender, VerificationCodeCommand, VerificationCodeStore};
use crate::domain::{Error, PhoneNumber};

/// Number of digits in a verification code.
pub const SMS_CODE_LEN: usize = 6;

/// Random numeric code of [`SMS_CODE_LEN`] digits, leading zeros allowed.
pub fn generate_sms_code() -> String {
    let mut rng = rand::thread_rng();
    (0..SMS_CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Service implementing [`VerificationCodeCommand`].
#[derive(Clone)]
pub struct SmsCodeService<S> {
    store: Arc<S>,
    sender: Arc<dyn SmsSender>,
    ttl: Duration,
}

impl<S> SmsCodeService<S> {
    pub fn new(store: Arc<S>, sender: Arc<dyn SmsSender>, ttl: Duration) -> Self {
        Self { store, sender, ttl }
    }
}

#[async_trait]
impl<S> VerificationCodeCommand for SmsCodeService<S>
where
    S: VerificationCodeStore,
{
    async fn send_code(&self, phone: &PhoneNumber) -> Result<(), Error> {
        let code = generate_sms_code();

        self.sender.send_code(phone, &code).await.map_err(|err| {
            error!(error = %err, "sms delivery failed");
            Error::from(err)
        })?;

        // Stored only after delivery succeeds so a failed send leaves any
        // earlier code usable.
        self.store.put(phone, &code, self.ttl).await.map_err(|err| {
            error!(error = %err, "verification code store failed");
            Error::from(err)
        })?;

        info!(ttl_secs = self.ttl.as_secs(), "verification code sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockSmsSender, MockVerificationCodeStore, SmsSenderError, VerificationCodeStoreError,
    };
    use rstest::rstest;
    use std::sync::Mutex;

    const TTL: Duration = Duration::from_secs(300);

    fn phone() -> PhoneNumber {
        PhoneNumber::new("13800138000").expect("valid phone")
    }

    #[rstest]
    fn generated_codes_are_six_ascii_digits() {
        for _ in 0..64 {
            let code = generate_sms_code();
            assert_eq!(code.len(), SMS_CODE_LEN);
            assert!(code.bytes().all(|b| b.is_ascii_digit()), "code {code}");
        }
    }

    #[rstest]
    #[tokio::test]
    async fn delivered_code_is_the_stored_code() {
        let sent = Arc::new(Mutex::new(None::<String>));
        let sent_clone = Arc::clone(&sent);
        let mut sender = MockSmsSender::new();
        sender.expect_send_code().times(1).returning(move |_, code| {
            *sent_clone.lock().expect("lock") = Some(code.to_owned());
            Ok(())
        });

        let stored = Arc::new(Mutex::new(None::<String>));
        let stored_clone = Arc::clone(&stored);
        let mut store = MockVerificationCodeStore::new();
        store
            .expect_put()
            .withf(|phone, _, ttl| phone.as_ref() == "13800138000" && *ttl == TTL)
            .times(1)
            .returning(move |_, code, _| {
                *stored_clone.lock().expect("lock") = Some(code.to_owned());
                Ok(())
            });

        let service = SmsCodeService::new(Arc::new(store), Arc::new(sender), TTL);
        service.send_code(&phone()).await.expect("code sent");

        let sent = sent.lock().expect("lock").clone();
        let stored = stored.lock().expect("lock").clone();
        assert!(sent.is_some());
        assert_eq!(sent, stored);
    }

    #[rstest]
    #[tokio::test]
    async fn delivery_failure_skips_storage() {
        let mut sender = MockSmsSender::new();
        sender
            .expect_send_code()
            .returning(|_, _| Err(SmsSenderError::delivery("gateway 500")));
        let mut store = MockVerificationCodeStore::new();
        store.expect_put().times(0);

        let service = SmsCodeService::new(Arc::new(store), Arc::new(sender), TTL);
        let error = service.send_code(&phone()).await.expect_err("send fails");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(error.message(), "failed to send sms");
    }

    #[rstest]
    #[tokio::test]
    async fn storage_failure_is_unavailable() {
        let mut sender = MockSmsSender::new();
        sender.expect_send_code().returning(|_, _| Ok(()));
        let mut store = MockVerificationCodeStore::new();
        store
            .expect_put()
            .returning(|_, _, _| Err(VerificationCodeStoreError::backend("oom")));

        let service = SmsCodeService::new(Arc::new(store), Arc::new(sender), TTL);
        let error = service.send_code(&phone()).await.expect_err("store fails");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
