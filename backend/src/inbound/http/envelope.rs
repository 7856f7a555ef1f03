//! Success envelope shared by every JSON endpoint.

use serde::Serialize;
use utoipa::ToSchema;

/// Message carried by every successful response.
pub const OK_MESSAGE: &str = "OK";

/// `{"message": "OK", "data": ...}`.
///
/// # Examples
/// ```
/// use textbook_api::inbound::http::envelope::Envelope;
///
/// let body = serde_json::to_value(Envelope::ok(vec![1, 2])).unwrap();
/// assert_eq!(body["message"], "OK");
/// assert_eq!(body["data"][1], 2);
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    #[schema(example = "OK")]
    pub message: &'static str,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            message: OK_MESSAGE,
            data,
        }
    }
}
