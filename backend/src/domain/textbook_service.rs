//! Textbook domain services.
//!
//! [`TextbookService`] implements the read and publish ports. Content lookups
//! go through the cache first; the store stays the source of truth and is
//! consulted for version labels even on a cache hit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    ContentCache, ContentCacheKey, PublishVersionRequest, TextbookCommand, TextbookQuery,
    TextbookRepository, TextbookRepositoryError,
};
use crate::domain::{
    Error, LatestVersion, NewTextbookVersion, SUBSCRIPTION_CODES, Textbook, TextbookContent,
    TextbookId, TextbookValidationError, UserId, UserOperation, VersionNo, VersionSummary,
};

/// Message returned when the caller does not own the textbook, or it does not
/// exist. The two cases are deliberately indistinguishable.
pub const NO_PERMISSION_MESSAGE: &str = "request no permission";

/// Textbook service implementing [`TextbookQuery`] and [`TextbookCommand`].
#[derive(Clone)]
pub struct TextbookService<R, C> {
    repo: Arc<R>,
    cache: Arc<C>,
    content_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<R, C> TextbookService<R, C> {
    /// Create a service caching latest content for `content_ttl`.
    pub fn new(repo: Arc<R>, cache: Arc<C>, content_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            cache,
            content_ttl,
            clock,
        }
    }
}

impl<R, C> TextbookService<R, C>
where
    R: TextbookRepository,
    C: ContentCache,
{
    fn map_repository_error(operation: &'static str, err: TextbookRepositoryError) -> Error {
        if let TextbookRepositoryError::DuplicateVersion { version } = &err {
            warn!(operation, %version, "duplicate version rejected");
            return Error::from(err).with_details(json!({ "field": "versionNo" }));
        }
        error!(operation, error = %err, "textbook store failed");
        err.into()
    }

    fn textbook_not_found(id: TextbookId) -> Error {
        Error::not_found(format!("textbook {id} not found"))
    }

    async fn ensure_owned(
        &self,
        subject: UserId,
        id: TextbookId,
        operation: &'static str,
    ) -> Result<Textbook, Error> {
        let owned = self
            .repo
            .find_owned(id, subject)
            .await
            .map_err(|err| Self::map_repository_error(operation, err))?;
        owned.ok_or_else(|| {
            warn!(operation, textbook_id = %id, user_id = %subject, "ownership check failed");
            Error::forbidden(NO_PERMISSION_MESSAGE)
        })
    }

    /// Cached content, treating cache failures as misses.
    async fn cached_content(&self, key: &ContentCacheKey, id: TextbookId) -> Option<String> {
        match self.cache.get(key).await {
            Ok(content) => content,
            Err(err) => {
                warn!(textbook_id = %id, error = %err, "content cache read failed; treating as miss");
                None
            }
        }
    }

    async fn populate_cache(&self, key: &ContentCacheKey, id: TextbookId, content: &str) {
        if let Err(err) = self.cache.set(key, content, self.content_ttl).await {
            warn!(textbook_id = %id, error = %err, "content cache write failed");
        }
    }

    async fn resolve_latest(&self, id: TextbookId) -> Result<LatestVersion, Error> {
        let key = ContentCacheKey::latest_content(id);

        if let Some(content) = self.cached_content(&key, id).await {
            let version = self
                .repo
                .latest_version_no(id)
                .await
                .map_err(|err| Self::map_repository_error("latest_version_no", err))?
                .ok_or_else(|| Self::textbook_not_found(id))?;
            return Ok(LatestVersion { content, version });
        }

        let row = self
            .repo
            .latest_version(id)
            .await
            .map_err(|err| Self::map_repository_error("latest_version", err))?
            .ok_or_else(|| {
                warn!(textbook_id = %id, "textbook has no versions");
                Self::textbook_not_found(id)
            })?;
        self.populate_cache(&key, id, &row.content).await;
        Ok(LatestVersion {
            content: row.content,
            version: row.version_no,
        })
    }
}

#[async_trait]
impl<R, C> TextbookQuery for TextbookService<R, C>
where
    R: TextbookRepository,
    C: ContentCache,
{
    async fn content(&self, subject: UserId, id: TextbookId) -> Result<TextbookContent, Error> {
        self.ensure_owned(subject, id, "content").await?;
        let latest = self.resolve_latest(id).await?;
        let all_versions = self
            .repo
            .list_versions(id)
            .await
            .map_err(|err| Self::map_repository_error("list_versions", err))?;
        Ok(TextbookContent {
            latest,
            all_versions,
        })
    }

    async fn authored(&self, subject: UserId) -> Result<Vec<Textbook>, Error> {
        let textbooks = self
            .repo
            .list_by_author(subject)
            .await
            .map_err(|err| Self::map_repository_error("list_by_author", err))?;
        if textbooks.is_empty() {
            return Err(Error::not_found("user's work is not found"));
        }
        Ok(textbooks)
    }

    async fn subscriptions(&self, subject: UserId) -> Result<Vec<UserOperation>, Error> {
        let operations = self
            .repo
            .list_operations(subject, &SUBSCRIPTION_CODES)
            .await
            .map_err(|err| Self::map_repository_error("list_operations", err))?;
        if operations.is_empty() {
            return Err(Error::not_found("user's subscription is not found"));
        }
        Ok(operations)
    }
}

fn validation_error(err: TextbookValidationError, field: &str) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

#[async_trait]
impl<R, C> TextbookCommand for TextbookService<R, C>
where
    R: TextbookRepository,
    C: ContentCache,
{
    async fn publish_version(
        &self,
        request: PublishVersionRequest,
    ) -> Result<VersionSummary, Error> {
        let PublishVersionRequest {
            subject,
            textbook_id,
            version_no,
            content,
        } = request;

        let version_no =
            VersionNo::new(version_no).map_err(|err| validation_error(err, "versionNo"))?;
        if content.trim().is_empty() {
            return Err(validation_error(
                TextbookValidationError::EmptyContent,
                "content",
            ));
        }
        self.ensure_owned(subject, textbook_id, "publish_version")
            .await?;

        let stored = self
            .repo
            .insert_version(&NewTextbookVersion {
                textbook_id,
                version_no,
                content,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(|err| Self::map_repository_error("insert_version", err))?;

        // The cached latest content is left to expire on its own TTL.
        info!(
            textbook_id = %textbook_id,
            version = %stored.version_no,
            version_id = stored.id,
            "published textbook version"
        );
        Ok(VersionSummary {
            version: stored.version_no,
            id: stored.id,
        })
    }
}

#[cfg(test)]
#[path = "textbook_service_tests.rs"]
mod tests;
