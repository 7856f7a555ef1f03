//! User data model.
//!
//! Users register with a phone number and authenticate with phone plus
//! password. The password hash never lives on [`User`]; see
//! [`crate::domain::UserAccount`] for the credential-bearing aggregate.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a positive integer")]
    InvalidId,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("phone number must be {len} digits")]
    InvalidPhone { len: usize },
}

/// Stable numeric user identifier assigned by the store.
///
/// # Examples
/// ```
/// use textbook_api::domain::UserId;
///
/// let id = UserId::new(7).expect("positive ids are valid");
/// assert_eq!(id.get(), 7);
/// assert!(UserId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Raw identifier value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 255;

/// Unique username chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`]; surrounding whitespace is trimmed.
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Number of digits in a mobile phone number.
pub const PHONE_LEN: usize = 11;

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{11}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Mobile phone number used as the login identity and SMS destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a [`PhoneNumber`].
    ///
    /// # Examples
    /// ```
    /// use textbook_api::domain::PhoneNumber;
    ///
    /// assert!(PhoneNumber::new("13800138000").is_ok());
    /// assert!(PhoneNumber::new("1380013800").is_err());
    /// ```
    pub fn new(phone: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = phone.as_ref().trim();
        if !phone_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidPhone { len: PHONE_LEN });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional profile fields a user may fill in after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "1815-12-10")]
    pub birth_day: Option<NaiveDate>,
    pub profile: Option<String>,
    pub avatar: Option<String>,
}

/// Registered platform user.
///
/// ## Invariants
/// - `phone` is unique across users.
/// - `username` is unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i64, example = 7)]
    id: UserId,
    #[schema(value_type = String, example = "ada")]
    username: Username,
    #[schema(value_type = String, example = "13800138000")]
    phone: PhoneNumber,
    #[serde(flatten)]
    profile: UserProfile,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, username: Username, phone: PhoneNumber, profile: UserProfile) -> Self {
        Self {
            id,
            username,
            phone,
            profile,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Login phone number.
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Optional profile fields.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }
}
