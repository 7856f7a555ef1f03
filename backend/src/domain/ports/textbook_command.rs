//! Driving port for textbook mutations.
use async_trait::async_trait;

use crate::domain::{Error, TextbookId, UserId, VersionSummary};

/// Raw publish request; the version number is validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishVersionRequest {
    pub subject: UserId,
    pub textbook_id: TextbookId,
    pub version_no: String,
    pub content: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextbookCommand: Send + Sync {
    /// Publish a new version of a textbook owned by the subject.
    async fn publish_version(&self, request: PublishVersionRequest)
    -> Result<VersionSummary, Error>;
}
