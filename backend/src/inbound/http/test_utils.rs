//! Test helpers for inbound HTTP components.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use uuid::Uuid;

use crate::domain::ports::{
    MockLoginService, MockTextbookCommand, MockTextbookQuery, MockTokenService,
    MockUserProfileQuery, MockVerificationCodeCommand, TokenService,
};
use crate::domain::{AuthClaims, AuthError};
use crate::inbound::http::state::HttpState;

/// Secret file in the system temp directory, removed on drop.
#[derive(Debug)]
pub struct TempSecretFile {
    path: PathBuf,
}

impl TempSecretFile {
    pub fn new(contents: &[u8]) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("hmac-secret-{}", Uuid::new_v4()));
        std::fs::write(&path, contents)?;
        Ok(Self { path })
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl Drop for TempSecretFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Bearer token accepted by [`token_data_for`].
pub const TEST_TOKEN: &str = "test-token";

/// Token service accepting only [`TEST_TOKEN`], resolving it to `uid`.
pub fn token_data_for(uid: i64) -> web::Data<dyn TokenService> {
    let mut tokens = MockTokenService::new();
    tokens.expect_verify().returning(move |token| {
        if token == TEST_TOKEN {
            Ok(AuthClaims {
                iss: "textbook-api".to_owned(),
                iat: 0,
                exp: i64::MAX,
                nbf: 0,
                uid,
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    });
    let tokens: Arc<dyn TokenService> = Arc::new(tokens);
    web::Data::from(tokens)
}

/// Port doubles for handler tests; unexpected calls panic.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub profile: MockUserProfileQuery,
    pub sms_codes: MockVerificationCodeCommand,
    pub textbooks: MockTextbookQuery,
    pub textbook_commands: MockTextbookCommand,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            login: Arc::new(self.login),
            profile: Arc::new(self.profile),
            sms_codes: Arc::new(self.sms_codes),
            textbooks: Arc::new(self.textbooks),
            textbook_commands: Arc::new(self.textbook_commands),
        })
    }
}
