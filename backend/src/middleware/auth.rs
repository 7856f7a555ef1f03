//! Bearer authentication gate for protected routes.
//!
//! [`AuthGate`] reads the `Authorization` header, verifies the token through
//! the registered [`TokenService`], and stores the decoded [`AuthClaims`] in
//! the request extensions. Any failure short-circuits with a 401 response;
//! the wrapped service is never called.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{Error, HttpMessage, ResponseError, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, warn};

use crate::domain::ports::TokenService;
use crate::domain::{AuthClaims, AuthError, Error as DomainError};

/// Case-sensitive scheme prefix, including the single separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from a raw `Authorization` header value.
///
/// # Examples
/// ```
/// use actix_web::http::header::HeaderValue;
/// use textbook_api::middleware::auth::bearer_token;
///
/// let header = HeaderValue::from_static("Bearer abc.def.ghi");
/// assert_eq!(bearer_token(Some(&header)).unwrap(), "abc.def.ghi");
/// assert!(bearer_token(None).is_err());
/// ```
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let raw = header
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingOrMalformedCredential)?;
    match raw.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MissingOrMalformedCredential),
    }
}

/// Verify the header against `tokens`. Pure apart from the clock inside the
/// token service.
pub fn authenticate(
    header: Option<&HeaderValue>,
    tokens: &dyn TokenService,
) -> Result<AuthClaims, AuthError> {
    let token = bearer_token(header)?;
    tokens.verify(token)
}

/// Middleware rejecting requests without a valid bearer token.
///
/// Requires `web::Data<dyn TokenService>` in application data.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use textbook_api::middleware::AuthGate;
///
/// let _scope = web::scope("/textbooks").wrap(AuthGate);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthGate;

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware { service }))
    }
}

/// Service wrapper produced by [`AuthGate`].
pub struct AuthGateMiddleware<S> {
    service: S,
}

enum Rejection {
    Auth(AuthError),
    Misconfigured,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match req.app_data::<web::Data<dyn TokenService>>() {
            Some(tokens) => authenticate(req.headers().get(AUTHORIZATION), tokens.get_ref())
                .map_err(Rejection::Auth),
            None => Err(Rejection::Misconfigured),
        };

        match outcome {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(rejection) => Box::pin(async move {
                // Built inside the future so the error captures the trace id.
                let error = match rejection {
                    Rejection::Auth(reason) => {
                        warn!(%reason, path = req.path(), "bearer authentication rejected");
                        DomainError::from(reason)
                    }
                    Rejection::Misconfigured => {
                        error!("token service missing from application data");
                        DomainError::internal("token service not configured")
                    }
                };
                let response = error.error_response();
                Ok(req.into_response(response).map_into_right_body())
            }),
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
