//! JSON error responses for the textbook API.
//!
//! Every failure leaves a handler as a domain [`Error`] and is rendered here:
//! status from the error code, `trace-id` header when known, and a bearer
//! challenge on 401 so clients know to re-authenticate. Internal errors keep
//! only their trace id; message and details stay in the server log.

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::{HttpResponse, ResponseError};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Challenge sent with every 401 response.
pub const BEARER_CHALLENGE: &str = r#"Bearer realm="textbook-api""#;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_body(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::Unauthorized {
            builder.insert_header((WWW_AUTHENTICATE, HeaderValue::from_static(BEARER_CHALLENGE)));
        }
        builder.json(public_body(self))
    }
}

/// Turn a JSON body or query-string extraction failure into a 400 carrying
/// the shared error schema.
///
/// # Examples
/// ```
/// use actix_web::web;
/// use textbook_api::inbound::http::error::extractor_rejection;
///
/// let _json = web::JsonConfig::default().error_handler(|err, _| extractor_rejection(err));
/// let _query = web::QueryConfig::default().error_handler(|err, _| extractor_rejection(err));
/// ```
pub fn extractor_rejection(err: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}

#[cfg(test)]
mod tests;
