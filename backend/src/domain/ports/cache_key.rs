//! Cache key for the latest-content entry of a textbook.
use crate::domain::TextbookId;

/// Key under which the latest version content of a textbook is cached.
///
/// Keys always have the form `id_<textbookID>_latest_content`, so they can be
/// built infallibly from a validated [`TextbookId`].
///
/// # Examples
/// ```
/// use textbook_api::domain::TextbookId;
/// use textbook_api::domain::ports::ContentCacheKey;
///
/// let key = ContentCacheKey::latest_content(TextbookId::new(42).unwrap());
/// assert_eq!(key.as_str(), "id_42_latest_content");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentCacheKey(String);

impl ContentCacheKey {
    /// Key for the latest content of `textbook_id`.
    pub fn latest_content(textbook_id: TextbookId) -> Self {
        Self(format!("id_{textbook_id}_latest_content"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ContentCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ContentCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
