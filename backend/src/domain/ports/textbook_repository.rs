//! Port abstraction for textbook persistence.
//!
//! The store is the source of truth for textbooks, their versions, and user
//! operations. Adapters translate each method into a single query.

use async_trait::async_trait;

use crate::domain::{
    NewTextbookVersion, Textbook, TextbookId, TextbookVersion, UserId, UserOperation, VersionNo,
    VersionSummary,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by textbook repository adapters.
    pub enum TextbookRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "textbook repository connection failed: {message}"
            as service_unavailable("textbook store unavailable"),
        /// Query or mutation failed during execution.
        Query { message: String } => "textbook repository query failed: {message}"
            as internal,
        /// A version with the same number already exists for the textbook.
        DuplicateVersion { version: String } => "version {version} already exists"
            as invalid_request,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextbookRepository: Send + Sync {
    /// Textbook matching `id AND author_id`, if any.
    async fn find_owned(
        &self,
        id: TextbookId,
        author: UserId,
    ) -> Result<Option<Textbook>, TextbookRepositoryError>;

    /// Label of the most recently created version, without reading content.
    async fn latest_version_no(
        &self,
        id: TextbookId,
    ) -> Result<Option<VersionNo>, TextbookRepositoryError>;

    /// Most recently created version including content.
    async fn latest_version(
        &self,
        id: TextbookId,
    ) -> Result<Option<TextbookVersion>, TextbookRepositoryError>;

    /// Every version label with its row id, ordered by row id ascending.
    async fn list_versions(
        &self,
        id: TextbookId,
    ) -> Result<Vec<VersionSummary>, TextbookRepositoryError>;

    /// Textbooks authored by `author`.
    async fn list_by_author(&self, author: UserId)
    -> Result<Vec<Textbook>, TextbookRepositoryError>;

    /// Operations of `user` whose code is one of `codes`.
    async fn list_operations(
        &self,
        user: UserId,
        codes: &[i16],
    ) -> Result<Vec<UserOperation>, TextbookRepositoryError>;

    /// Persist a new version and return the stored row.
    async fn insert_version(
        &self,
        version: &NewTextbookVersion,
    ) -> Result<TextbookVersion, TextbookRepositoryError>;
}
