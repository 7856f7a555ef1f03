//! Tests for HTTP error mapping.

use super::*;
use crate::domain::{AuthError, Error};
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("request no permission"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("textbook 42 not found"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

#[rstest]
#[case(AuthError::MissingOrMalformedCredential)]
#[case(AuthError::UnsupportedAlgorithm)]
#[case(AuthError::InvalidToken)]
#[case(AuthError::TokenExpiredOrNotYetValid)]
fn every_auth_failure_is_401(#[case] failure: AuthError) {
    let err: Error = failure.into();
    assert_eq!(ResponseError::status_code(&err), StatusCode::UNAUTHORIZED);
}

async fn response_payload(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> serde_json::Value {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON parses")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("textbook store query failed: relation missing")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"sql": "SELECT"}));

    let payload = response_payload(
        error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload["message"], "Internal server error");
    assert_eq!(payload["code"], "internal_error");
    assert!(payload.get("details").is_none());
    assert_eq!(payload["traceId"], expected_trace_id);
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::invalid_request("version number must look like MAJOR.MINOR.PATCH")
        .with_details(json!({"field": "versionNo"}));

    let payload = response_payload(error, StatusCode::BAD_REQUEST, None).await;
    assert_eq!(
        payload["message"],
        "version number must look like MAJOR.MINOR.PATCH"
    );
    assert_eq!(payload["details"]["field"], "versionNo");
    assert!(payload.get("traceId").is_none());
}

#[given("a forbidden error code")]
fn a_forbidden_error_code() -> ErrorCode {
    ErrorCode::Forbidden
}

#[when("the adapter maps the code to an HTTP status")]
fn the_adapter_maps_the_code_to_http_status(code: ErrorCode) -> StatusCode {
    super::status_for(code)
}

#[then("the status is 403 Forbidden")]
fn the_status_is_403_forbidden(status: StatusCode) {
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
fn forbidden_maps_to_403() {
    let code = a_forbidden_error_code();
    let status = the_adapter_maps_the_code_to_http_status(code);
    the_status_is_403_forbidden(status);
}

#[rstest]
#[case(AuthError::MissingOrMalformedCredential.into(), true)]
#[case(Error::forbidden("request no permission"), false)]
#[case(Error::service_unavailable("textbook store unavailable"), false)]
fn only_unauthorized_responses_carry_bearer_challenge(
    #[case] error: Error,
    #[case] challenged: bool,
) {
    let response = ResponseError::error_response(&error);
    let header = response
        .headers()
        .get(actix_web::http::header::WWW_AUTHENTICATE)
        .map(|value| value.to_str().expect("ascii challenge"));
    assert_eq!(header, challenged.then_some(BEARER_CHALLENGE));
}

#[rstest]
#[actix_web::test]
async fn extractor_rejection_is_bad_request_with_cause() {
    let rejection = extractor_rejection("Json deserialize error: missing field `versionNo`");
    let response = rejection.error_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("error JSON parses");
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(
        payload["message"],
        "Json deserialize error: missing field `versionNo`"
    );
}
