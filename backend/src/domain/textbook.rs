//! Textbook aggregate, its versions, and user relations.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Validation errors for textbook values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextbookValidationError {
    #[error("textbook id must be a positive integer")]
    InvalidId,
    #[error("version number must look like MAJOR.MINOR.PATCH")]
    InvalidVersionNo,
    #[error("version number must be at most {max} characters")]
    VersionNoTooLong { max: usize },
    #[error("version content must not be empty")]
    EmptyContent,
}

/// Stable numeric textbook identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TextbookId(i64);

impl TextbookId {
    pub fn new(id: i64) -> Result<Self, TextbookValidationError> {
        if id <= 0 {
            return Err(TextbookValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Parse a path segment, failing closed on anything but a positive integer.
    ///
    /// # Examples
    /// ```
    /// use textbook_api::domain::TextbookId;
    ///
    /// assert_eq!(TextbookId::parse("42").unwrap().get(), 42);
    /// assert!(TextbookId::parse("42abc").is_err());
    /// assert!(TextbookId::parse("-1").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TextbookValidationError> {
        let value = raw
            .parse::<i64>()
            .map_err(|_| TextbookValidationError::InvalidId)?;
        Self::new(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TextbookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TextbookId> for i64 {
    fn from(value: TextbookId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for TextbookId {
    type Error = TextbookValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_RE.get_or_init(|| {
        Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$")
            .unwrap_or_else(|error| panic!("version regex failed to compile: {error}"))
    })
}

/// Maximum stored length of a [`VersionNo`]; matches `textbook_versions.version_no`.
pub const VERSION_NO_MAX: usize = 32;

/// Semantic version label `MAJOR.MINOR.PATCH`.
///
/// Only ASCII digits are accepted in each component; no surrounding
/// whitespace, prefix, or pre-release suffix is tolerated. At most
/// [`VERSION_NO_MAX`] characters.
///
/// # Examples
/// ```
/// use textbook_api::domain::VersionNo;
///
/// assert!(VersionNo::new("1.0.0").is_ok());
/// assert!(VersionNo::new("1.0").is_err());
/// assert!(VersionNo::new("v1.0.0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionNo(String);

impl VersionNo {
    pub fn new(raw: impl Into<String>) -> Result<Self, TextbookValidationError> {
        let raw = raw.into();
        if !version_regex().is_match(&raw) {
            return Err(TextbookValidationError::InvalidVersionNo);
        }
        if raw.len() > VERSION_NO_MAX {
            return Err(TextbookValidationError::VersionNoTooLong {
                max: VERSION_NO_MAX,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VersionNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VersionNo> for String {
    fn from(value: VersionNo) -> Self {
        value.0
    }
}

impl TryFrom<String> for VersionNo {
    type Error = TextbookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Textbook metadata owned by a single author.
///
/// ## Invariants
/// - `(author_id, title)` is unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Textbook {
    #[schema(value_type = i64, example = 42)]
    pub id: TextbookId,
    pub title: String,
    pub tag: String,
    pub description: Option<String>,
    #[schema(value_type = i64, example = 7)]
    pub author_id: UserId,
    #[schema(value_type = Option<i64>)]
    pub collaborator_id: Option<UserId>,
    pub is_hot: bool,
    pub mark: Option<i16>,
}

/// Row id of a stored version.
pub type VersionId = i64;

/// A published textbook version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextbookVersion {
    pub id: VersionId,
    pub textbook_id: TextbookId,
    pub version_no: VersionNo,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Version metadata without content, as listed in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VersionSummary {
    #[schema(value_type = String, example = "1.1.0")]
    pub version: VersionNo,
    #[schema(example = 3)]
    pub id: VersionId,
}

/// Latest version content with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LatestVersion {
    pub content: String,
    #[schema(value_type = String, example = "1.1.0")]
    pub version: VersionNo,
}

/// Payload returned for a textbook content lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextbookContent {
    pub latest: LatestVersion,
    pub all_versions: Vec<VersionSummary>,
}

/// Validated request to publish a new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTextbookVersion {
    pub textbook_id: TextbookId,
    pub version_no: VersionNo,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Bit flags describing how a user relates to a textbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum OperationKind {
    Subscribe = 1,
    WatchLater = 2,
    Rated = 4,
}

impl OperationKind {
    pub fn bit(self) -> i16 {
        self as i16
    }
}

/// Operation codes counted as subscriptions: every combination carrying
/// [`OperationKind::Subscribe`].
pub const SUBSCRIPTION_CODES: [i16; 4] = [1, 3, 5, 7];

/// A user's relation to a textbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub id: i64,
    #[schema(value_type = i64)]
    pub user_id: UserId,
    #[schema(value_type = i64)]
    pub textbook_id: TextbookId,
    #[schema(example = 3)]
    pub operation: i16,
}

impl UserOperation {
    /// Whether the code includes `kind`.
    pub fn has(&self, kind: OperationKind) -> bool {
        self.operation & kind.bit() != 0
    }
}
