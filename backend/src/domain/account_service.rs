//! Account domain services: registration, login, and profile reads.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AuthenticatedSession, CaptchaVerifier, LoginService, PasswordHasher, PasswordHasherError,
    TokenService, UserPersistenceError, UserProfileQuery, UserRepository, VerificationCodeStore,
};
use crate::domain::{
    CaptchaAnswer, Error, LoginCredentials, NewUser, PasswordHash, Registration, User, UserId,
};

/// Account service implementing [`LoginService`] and [`UserProfileQuery`].
#[derive(Clone)]
pub struct AccountService<U, S> {
    users: Arc<U>,
    codes: Arc<S>,
    captcha: Arc<dyn CaptchaVerifier>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

/// Collaborators that do not touch persistence.
#[derive(Clone)]
pub struct AccountCollaborators {
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
}

impl<U, S> AccountService<U, S> {
    pub fn new(users: Arc<U>, codes: Arc<S>, collaborators: AccountCollaborators) -> Self {
        let AccountCollaborators {
            captcha,
            hasher,
            tokens,
        } = collaborators;
        Self {
            users,
            codes,
            captcha,
            hasher,
            tokens,
        }
    }
}

fn map_user_error(operation: &'static str, err: UserPersistenceError) -> Error {
    if let UserPersistenceError::Duplicate { field } = &err {
        warn!(operation, %field, "duplicate user rejected");
    } else {
        error!(operation, error = %err, "user store failed");
    }
    err.into()
}

impl<U, S> AccountService<U, S>
where
    U: UserRepository,
    S: VerificationCodeStore,
{
    async fn check_captcha(&self, answer: &CaptchaAnswer) -> Result<(), Error> {
        let ok = self
            .captcha
            .verify(answer.id(), answer.code())
            .await
            .map_err(|err| {
                error!(error = %err, "captcha verifier failed");
                Error::from(err)
            })?;
        if !ok {
            warn!(captcha_id = answer.id(), "wrong captcha");
            return Err(Error::invalid_request("wrong captcha"));
        }
        Ok(())
    }

    async fn check_sms_code(&self, registration: &Registration) -> Result<(), Error> {
        let stored = self.codes.get(registration.phone()).await.map_err(|err| {
            error!(error = %err, "verification code store failed");
            Error::from(err)
        })?;
        match stored {
            Some(code) if code == registration.sms_code() => Ok(()),
            _ => Err(Error::invalid_request("wrong sms code")),
        }
    }

    fn issue_session(&self, user: User) -> Result<AuthenticatedSession, Error> {
        let token = self.tokens.issue(user.id()).map_err(|err| {
            error!(user_id = %user.id(), error = %err, "token issue failed");
            Error::from(err)
        })?;
        Ok(AuthenticatedSession { user, token })
    }

    /// Argon2 is CPU-bound; keep it on the blocking pool.
    async fn run_hasher<T, F>(job: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
    {
        match tokio::task::spawn_blocking(job).await {
            Ok(result) => result.map_err(|err| {
                error!(error = %err, "password hashing failed");
                Error::from(err)
            }),
            Err(err) => {
                error!(error = %err, "password hashing task aborted");
                Err(Error::internal("password hashing failed"))
            }
        }
    }

    async fn hash_password(&self, password: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        Self::run_hasher(move || hasher.hash(&password)).await
    }

    async fn verify_password(&self, password: &str, hash: &PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.clone();
        Self::run_hasher(move || hasher.verify(&password, &hash)).await
    }
}

#[async_trait]
impl<U, S> LoginService for AccountService<U, S>
where
    U: UserRepository,
    S: VerificationCodeStore,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        self.check_captcha(credentials.captcha()).await?;

        let account = self
            .users
            .find_account_by_phone(credentials.phone())
            .await
            .map_err(|err| map_user_error("find_account_by_phone", err))?
            .ok_or_else(|| Error::not_found("not yet registered"))?;

        let matches = self
            .verify_password(credentials.password(), &account.password_hash)
            .await?;
        if !matches {
            warn!(user_id = %account.user.id(), "password mismatch");
            return Err(Error::invalid_request("please check your entry"));
        }

        info!(user_id = %account.user.id(), "user logged in");
        self.issue_session(account.user)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthenticatedSession, Error> {
        self.check_captcha(registration.captcha()).await?;
        self.check_sms_code(registration).await?;

        let password_hash = self.hash_password(registration.password()).await?;
        let user = self
            .users
            .insert(&NewUser {
                username: registration.username().clone(),
                phone: registration.phone().clone(),
                password_hash,
            })
            .await
            .map_err(|err| map_user_error("insert", err))?;

        info!(user_id = %user.id(), "user registered");
        self.issue_session(user)
    }
}

#[async_trait]
impl<U, S> UserProfileQuery for AccountService<U, S>
where
    U: UserRepository,
    S: VerificationCodeStore,
{
    async fn fetch_profile(&self, caller: UserId, id: UserId) -> Result<User, Error> {
        if caller != id {
            return Err(Error::forbidden("request no permission"));
        }
        self.users
            .find_by_id(id)
            .await
            .map_err(|err| map_user_error("find_by_id", err))?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
