//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types re-validate every field so a corrupt row surfaces as a query error
//! instead of an invalid domain value.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::{
    PasswordHash, PhoneNumber, Textbook, TextbookId, TextbookVersion, User, UserAccount, UserId,
    UserOperation, UserProfile, Username, VersionNo,
};

use super::schema::{textbook_versions, textbooks, user_operations, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub phone: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub birth_day: Option<NaiveDate>,
    pub profile: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
}

impl UserRow {
    fn to_user(&self) -> Result<User, String> {
        let id = UserId::new(self.id).map_err(|err| err.to_string())?;
        let username = Username::new(&self.username).map_err(|err| err.to_string())?;
        let phone = PhoneNumber::new(&self.phone).map_err(|err| err.to_string())?;
        let profile = UserProfile {
            email: self.email.clone(),
            birth_day: self.birth_day,
            profile: self.profile.clone(),
            avatar: self.avatar.clone(),
        };
        Ok(User::new(id, username, phone, profile))
    }

    pub fn into_user(self) -> Result<User, String> {
        self.to_user()
    }

    pub fn into_account(self) -> Result<UserAccount, String> {
        let user = self.to_user()?;
        Ok(UserAccount {
            user,
            password_hash: PasswordHash::new(self.password_hash),
        })
    }
}

// ---------------------------------------------------------------------------
// Textbooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = textbooks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TextbookRow {
    pub id: i64,
    pub title: String,
    pub tag: String,
    pub description: Option<String>,
    pub author_id: i64,
    pub collaborator_id: Option<i64>,
    pub is_hot: bool,
    pub mark: Option<i16>,
}

impl TryFrom<TextbookRow> for Textbook {
    type Error = String;

    fn try_from(row: TextbookRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TextbookId::new(row.id).map_err(|err| err.to_string())?,
            title: row.title,
            tag: row.tag,
            description: row.description,
            author_id: UserId::new(row.author_id).map_err(|err| err.to_string())?,
            collaborator_id: row
                .collaborator_id
                .map(UserId::new)
                .transpose()
                .map_err(|err| err.to_string())?,
            is_hot: row.is_hot,
            mark: row.mark,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = textbook_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TextbookVersionRow {
    pub id: i64,
    pub textbook_id: i64,
    pub version_no: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = textbook_versions)]
pub(crate) struct NewTextbookVersionRow<'a> {
    pub textbook_id: i64,
    pub version_no: &'a str,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TextbookVersionRow> for TextbookVersion {
    type Error = String;

    fn try_from(row: TextbookVersionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            textbook_id: TextbookId::new(row.textbook_id).map_err(|err| err.to_string())?,
            version_no: VersionNo::new(row.version_no).map_err(|err| err.to_string())?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// User operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_operations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserOperationRow {
    pub id: i64,
    pub user_id: i64,
    pub textbook_id: i64,
    pub operation: i16,
}

impl TryFrom<UserOperationRow> for UserOperation {
    type Error = String;

    fn try_from(row: UserOperationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: UserId::new(row.user_id).map_err(|err| err.to_string())?,
            textbook_id: TextbookId::new(row.textbook_id).map_err(|err| err.to_string())?,
            operation: row.operation,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Row-to-domain conversion coverage.
    use super::*;
    use rstest::rstest;

    fn user_row() -> UserRow {
        UserRow {
            id: 7,
            username: "ada".to_owned(),
            phone: "13800138000".to_owned(),
            password_hash: "$argon2id$stored".to_owned(),
            email: Some("ada@example.com".to_owned()),
            birth_day: NaiveDate::from_ymd_opt(1815, 12, 10),
            profile: None,
            avatar: None,
        }
    }

    #[rstest]
    fn user_row_converts_with_hash_kept_apart() {
        let account = user_row().into_account().expect("valid row");
        assert_eq!(account.user.id().get(), 7);
        assert_eq!(account.user.profile().email.as_deref(), Some("ada@example.com"));
        assert_eq!(account.password_hash.as_str(), "$argon2id$stored");
    }

    #[rstest]
    fn corrupt_phone_is_rejected() {
        let row = UserRow {
            phone: "12345".to_owned(),
            ..user_row()
        };
        assert!(row.into_user().is_err());
    }

    #[rstest]
    fn textbook_row_converts_optional_collaborator() {
        let row = TextbookRow {
            id: 42,
            title: "Rust".to_owned(),
            tag: "cs".to_owned(),
            description: None,
            author_id: 7,
            collaborator_id: Some(8),
            is_hot: true,
            mark: Some(5),
        };
        let textbook = Textbook::try_from(row).expect("valid row");
        assert_eq!(textbook.id.get(), 42);
        assert_eq!(textbook.collaborator_id.map(UserId::get), Some(8));
    }

    #[rstest]
    fn malformed_version_label_is_rejected() {
        let row = TextbookVersionRow {
            id: 1,
            textbook_id: 42,
            version_no: "v1".to_owned(),
            content: "body".to_owned(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert!(TextbookVersion::try_from(row).is_err());
    }
}
