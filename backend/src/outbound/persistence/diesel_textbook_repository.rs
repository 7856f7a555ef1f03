//! PostgreSQL-backed `TextbookRepository` implementation using Diesel ORM.
//!
//! "Latest" means greatest `created_at`, ties broken by row id, matching the
//! order in which versions were published.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TextbookRepository, TextbookRepositoryError};
use crate::domain::{
    NewTextbookVersion, Textbook, TextbookId, TextbookVersion, UserId, UserOperation, VersionNo,
    VersionSummary,
};

use super::diesel_basic_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewTextbookVersionRow, TextbookRow, TextbookVersionRow, UserOperationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{textbook_versions, textbooks, user_operations};

/// Diesel-backed implementation of the `TextbookRepository` port.
#[derive(Clone)]
pub struct DieselTextbookRepository {
    pool: DbPool,
}

impl DieselTextbookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TextbookRepositoryError {
    TextbookRepositoryError::connection(pool_error_message(error))
}

fn map_failure(failure: DieselFailure) -> TextbookRepositoryError {
    match failure {
        DieselFailure::Connection(message) => TextbookRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => TextbookRepositoryError::query("duplicate row"),
        DieselFailure::Query(message) => TextbookRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> TextbookRepositoryError {
    map_failure(classify_diesel_error(error, operation))
}

fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, TextbookRepositoryError>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(TextbookRepositoryError::query)
}

#[async_trait]
impl TextbookRepository for DieselTextbookRepository {
    async fn find_owned(
        &self,
        id: TextbookId,
        author: UserId,
    ) -> Result<Option<Textbook>, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TextbookRow> = textbooks::table
            .filter(textbooks::id.eq(id.get()))
            .filter(textbooks::author_id.eq(author.get()))
            .select(TextbookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find owned textbook"))?;
        row.map(Textbook::try_from)
            .transpose()
            .map_err(TextbookRepositoryError::query)
    }

    async fn latest_version_no(
        &self,
        id: TextbookId,
    ) -> Result<Option<VersionNo>, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let label: Option<String> = textbook_versions::table
            .filter(textbook_versions::textbook_id.eq(id.get()))
            .order((
                textbook_versions::created_at.desc(),
                textbook_versions::id.desc(),
            ))
            .select(textbook_versions::version_no)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "latest version label"))?;
        label
            .map(VersionNo::new)
            .transpose()
            .map_err(|err| TextbookRepositoryError::query(err.to_string()))
    }

    async fn latest_version(
        &self,
        id: TextbookId,
    ) -> Result<Option<TextbookVersion>, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TextbookVersionRow> = textbook_versions::table
            .filter(textbook_versions::textbook_id.eq(id.get()))
            .order((
                textbook_versions::created_at.desc(),
                textbook_versions::id.desc(),
            ))
            .select(TextbookVersionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "latest version"))?;
        row.map(TextbookVersion::try_from)
            .transpose()
            .map_err(TextbookRepositoryError::query)
    }

    async fn list_versions(
        &self,
        id: TextbookId,
    ) -> Result<Vec<VersionSummary>, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(i64, String)> = textbook_versions::table
            .filter(textbook_versions::textbook_id.eq(id.get()))
            .order(textbook_versions::id.asc())
            .select((textbook_versions::id, textbook_versions::version_no))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list versions"))?;
        rows.into_iter()
            .map(|(id, label)| {
                VersionNo::new(label).map(|version| VersionSummary { version, id })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| TextbookRepositoryError::query(err.to_string()))
    }

    async fn list_by_author(
        &self,
        author: UserId,
    ) -> Result<Vec<Textbook>, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TextbookRow> = textbooks::table
            .filter(textbooks::author_id.eq(author.get()))
            .order(textbooks::id.asc())
            .select(TextbookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list textbooks by author"))?;
        convert_rows(rows)
    }

    async fn list_operations(
        &self,
        user: UserId,
        codes: &[i16],
    ) -> Result<Vec<UserOperation>, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserOperationRow> = user_operations::table
            .filter(user_operations::user_id.eq(user.get()))
            .filter(user_operations::operation.eq_any(codes.to_vec()))
            .order(user_operations::id.asc())
            .select(UserOperationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list user operations"))?;
        convert_rows(rows)
    }

    async fn insert_version(
        &self,
        version: &NewTextbookVersion,
    ) -> Result<TextbookVersion, TextbookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTextbookVersionRow {
            textbook_id: version.textbook_id.get(),
            version_no: version.version_no.as_str(),
            content: &version.content,
            created_at: version.created_at,
        };
        let stored: TextbookVersionRow = diesel::insert_into(textbook_versions::table)
            .values(&row)
            .returning(TextbookVersionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify_diesel_error(err, "insert version") {
                DieselFailure::UniqueViolation { .. } => {
                    TextbookRepositoryError::duplicate_version(version.version_no.as_str())
                }
                other => map_failure(other),
            })?;
        TextbookVersion::try_from(stored).map_err(TextbookRepositoryError::query)
    }
}
