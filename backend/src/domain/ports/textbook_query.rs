//! Driving port for textbook reads.
//!
//! Inbound adapters call this port with the authenticated subject; every
//! method scopes its result to that subject.

use async_trait::async_trait;

use crate::domain::{Error, Textbook, TextbookContent, TextbookId, UserId, UserOperation};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextbookQuery: Send + Sync {
    /// Latest content and version catalogue of a textbook owned by `subject`.
    async fn content(&self, subject: UserId, id: TextbookId) -> Result<TextbookContent, Error>;

    /// Textbooks authored by `subject`.
    async fn authored(&self, subject: UserId) -> Result<Vec<Textbook>, Error>;

    /// Subscription relations of `subject`.
    async fn subscriptions(&self, subject: UserId) -> Result<Vec<UserOperation>, Error>;
}
