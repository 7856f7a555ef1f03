//! Access to the authenticated subject from handlers.
//!
//! [`crate::middleware::AuthGate`] stores verified [`AuthClaims`] in the
//! request extensions; [`AuthenticatedUser`] lifts them back out so handlers
//! take the subject as a typed argument.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use tracing::error;

use crate::domain::{AuthClaims, Error, UserId};

/// Subject of the bearer token that authorised the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(self) -> UserId {
        self.0
    }
}

fn subject_of(req: &HttpRequest) -> Result<UserId, Error> {
    let extensions = req.extensions();
    let claims = extensions.get::<AuthClaims>().ok_or_else(|| {
        // Only reachable when a protected handler is mounted without the gate.
        error!(path = req.path(), "handler requires AuthGate but no claims were attached");
        Error::unauthorized("missing or malformed credential")
    })?;
    claims.subject().map_err(Error::from)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(subject_of(req).map(Self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use rstest_bdd_macros::{given, then, when};

    #[given("a request carrying claims for user 7")]
    fn request_with_claims() -> HttpRequest {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthClaims {
            iss: "textbook-api".to_owned(),
            iat: 0,
            exp: 60,
            nbf: 0,
            uid: 7,
        });
        req
    }

    #[given("a request that bypassed the gate")]
    fn request_without_claims() -> HttpRequest {
        TestRequest::default().to_http_request()
    }

    #[when("the subject is extracted")]
    fn extract(req: HttpRequest) -> Result<UserId, Error> {
        subject_of(&req)
    }

    #[then("the subject is user 7")]
    fn subject_is_seven(result: Result<UserId, Error>) {
        assert_eq!(result.expect("subject").get(), 7);
    }

    #[then("the request is unauthorised")]
    fn request_is_unauthorised(result: Result<UserId, Error>) {
        assert_eq!(
            result.expect_err("no subject").code(),
            ErrorCode::Unauthorized
        );
    }

    #[rstest]
    fn claims_yield_subject() {
        subject_is_seven(extract(request_with_claims()));
    }

    #[rstest]
    fn missing_claims_are_unauthorised() {
        request_is_unauthorised(extract(request_without_claims()));
    }
}
