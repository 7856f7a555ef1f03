//! Authentication primitives: credentials, registration input, token claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Error, PhoneNumber, User, UserId, UserValidationError, Username};

/// Domain error returned when login or registration payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Password was blank.
    EmptyPassword,
    /// Captcha identifier or answer was blank.
    EmptyCaptcha,
    /// SMS verification code was blank.
    EmptySmsCode,
    /// Username or phone failed validation.
    User(UserValidationError),
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyCaptcha => write!(f, "captcha id and answer must not be empty"),
            Self::EmptySmsCode => write!(f, "sms code must not be empty"),
            Self::User(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl From<UserValidationError> for CredentialValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Captcha challenge identifier paired with the caller's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaAnswer {
    id: String,
    code: String,
}

impl CaptchaAnswer {
    /// Construct an answer; both parts must be non-blank.
    pub fn try_from_parts(id: &str, code: &str) -> Result<Self, CredentialValidationError> {
        let (id, code) = (id.trim(), code.trim());
        if id.is_empty() || code.is_empty() {
            return Err(CredentialValidationError::EmptyCaptcha);
        }
        Ok(Self {
            id: id.to_owned(),
            code: code.to_owned(),
        })
    }

    /// Challenge identifier issued with the captcha image.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Answer typed by the caller.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }
}

fn require_password(password: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials used by the accounts service.
///
/// ## Invariants
/// - `phone` is an 11-digit number.
/// - `password` is non-empty but retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use textbook_api::domain::{CaptchaAnswer, LoginCredentials};
///
/// let captcha = CaptchaAnswer::try_from_parts("c1", "x7k2").unwrap();
/// let creds = LoginCredentials::try_from_parts("13800138000", "hunter2", captcha).unwrap();
/// assert_eq!(creds.phone().as_ref(), "13800138000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    phone: PhoneNumber,
    password: Zeroizing<String>,
    captcha: CaptchaAnswer,
}

impl LoginCredentials {
    /// Construct credentials from raw phone/password inputs.
    pub fn try_from_parts(
        phone: &str,
        password: &str,
        captcha: CaptchaAnswer,
    ) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            phone: PhoneNumber::new(phone)?,
            password: require_password(password)?,
            captcha,
        })
    }

    /// Phone number used to look up the account.
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Plain password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Captcha answer accompanying the login attempt.
    pub fn captcha(&self) -> &CaptchaAnswer {
        &self.captcha
    }
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    phone: PhoneNumber,
    password: Zeroizing<String>,
    captcha: CaptchaAnswer,
    sms_code: String,
}

impl Registration {
    /// Construct a registration from raw inputs.
    pub fn try_from_parts(
        username: &str,
        phone: &str,
        password: &str,
        captcha: CaptchaAnswer,
        sms_code: &str,
    ) -> Result<Self, CredentialValidationError> {
        let sms_code = sms_code.trim();
        if sms_code.is_empty() {
            return Err(CredentialValidationError::EmptySmsCode);
        }
        Ok(Self {
            username: Username::new(username)?,
            phone: PhoneNumber::new(phone)?,
            password: require_password(password)?,
            captcha,
            sms_code: sms_code.to_owned(),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn captcha(&self) -> &CaptchaAnswer {
        &self.captcha
    }

    pub fn sms_code(&self) -> &str {
        self.sms_code.as_str()
    }
}

/// Opaque password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Fields required to insert a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub phone: PhoneNumber,
    pub password_hash: PasswordHash,
}

/// A user together with the stored credential, as read for login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Typed claim set carried by access tokens.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub uid: i64,
}

impl AuthClaims {
    /// Claims for `uid` valid from `now` for `lifetime_secs`.
    pub fn issue(issuer: impl Into<String>, uid: UserId, now: i64, lifetime_secs: i64) -> Self {
        Self {
            iss: issuer.into(),
            iat: now,
            exp: now.saturating_add(lifetime_secs),
            nbf: now,
            uid: uid.get(),
        }
    }

    /// Whether `now` lies inside `[nbf, exp)`.
    ///
    /// # Examples
    /// ```
    /// use textbook_api::domain::{AuthClaims, UserId};
    ///
    /// let claims = AuthClaims::issue("iss", UserId::new(7).unwrap(), 1_000, 60);
    /// assert!(claims.is_valid_at(1_000));
    /// assert!(!claims.is_valid_at(1_060));
    /// assert!(!claims.is_valid_at(999));
    /// ```
    pub fn is_valid_at(&self, now: i64) -> bool {
        now >= self.nbf && now < self.exp
    }

    /// Authenticated subject.
    pub fn subject(&self) -> Result<UserId, AuthError> {
        UserId::new(self.uid).map_err(|_| AuthError::InvalidToken)
    }
}

/// Signed access token handed to clients after login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: i64,
}

/// Failures raised while authenticating a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Header missing or not of the form `Bearer <token>`.
    #[error("missing or malformed credential")]
    MissingOrMalformedCredential,
    /// Token header names an algorithm outside the HMAC family.
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,
    /// Token could not be decoded or its signature did not verify.
    #[error("invalid token")]
    InvalidToken,
    /// `exp` has passed or `nbf` has not yet been reached.
    #[error("token expired or not yet valid")]
    TokenExpiredOrNotYetValid,
}

impl From<AuthError> for Error {
    fn from(value: AuthError) -> Self {
        Error::unauthorized(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn captcha() -> CaptchaAnswer {
        CaptchaAnswer::try_from_parts("c1", "x7k2").expect("fixture captcha")
    }

    #[rstest]
    #[case("", "x")]
    #[case("id", "  ")]
    fn captcha_rejects_blank_parts(#[case] id: &str, #[case] code: &str) {
        assert_eq!(
            CaptchaAnswer::try_from_parts(id, code),
            Err(CredentialValidationError::EmptyCaptcha)
        );
    }

    #[rstest]
    fn login_rejects_empty_password(captcha: CaptchaAnswer) {
        let err = LoginCredentials::try_from_parts("13800138000", "", captcha)
            .expect_err("empty password fails");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[rstest]
    fn login_rejects_bad_phone(captcha: CaptchaAnswer) {
        let err = LoginCredentials::try_from_parts("12345", "pw", captcha)
            .expect_err("short phone fails");
        assert!(matches!(err, CredentialValidationError::User(_)));
    }

    #[rstest]
    fn login_keeps_password_whitespace(captcha: CaptchaAnswer) {
        let creds = LoginCredentials::try_from_parts("13800138000", " pw ", captcha)
            .expect("valid credentials");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    fn registration_requires_sms_code(captcha: CaptchaAnswer) {
        let err = Registration::try_from_parts("ada", "13800138000", "pw", captcha, " ")
            .expect_err("blank sms code fails");
        assert_eq!(err, CredentialValidationError::EmptySmsCode);
    }

    #[rstest]
    fn registration_trims_inputs(captcha: CaptchaAnswer) {
        let reg = Registration::try_from_parts(" ada ", "13800138000", "pw", captcha, " 123456 ")
            .expect("valid registration");
        assert_eq!(reg.username().as_ref(), "ada");
        assert_eq!(reg.sms_code(), "123456");
    }

    #[rstest]
    fn claims_window_is_half_open() {
        let uid = UserId::new(7).expect("valid id");
        let claims = AuthClaims::issue("issuer", uid, 100, 7200);
        assert_eq!(claims.exp, 7300);
        assert!(claims.is_valid_at(100));
        assert!(claims.is_valid_at(7299));
        assert!(!claims.is_valid_at(7300));
        assert!(!claims.is_valid_at(99));
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn claims_with_non_positive_uid_are_invalid(#[case] uid: i64) {
        let claims = AuthClaims {
            iss: "issuer".to_owned(),
            iat: 0,
            exp: 10,
            nbf: 0,
            uid,
        };
        assert_eq!(claims.subject(), Err(AuthError::InvalidToken));
    }

    #[rstest]
    fn auth_errors_map_to_unauthorized() {
        let err: Error = AuthError::UnsupportedAlgorithm.into();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "unsupported signing algorithm");
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert!(!format!("{hash:?}").contains("secret"));
    }
}
