//! Tests for account API handlers.

use super::*;
use crate::domain::{AccessToken, PhoneNumber, UserProfile, Username};
use crate::inbound::http::test_utils::{MockPorts, TEST_TOKEN, token_data_for};
use crate::middleware::Trace;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use serde_json::Value;

const PHONE: &str = "13800138000";

fn ada() -> User {
    User::new(
        UserId::new(7).expect("valid id"),
        Username::new("ada").expect("valid username"),
        PhoneNumber::new(PHONE).expect("valid phone"),
        UserProfile::default(),
    )
}

fn session() -> AuthenticatedSession {
    AuthenticatedSession {
        user: ada(),
        token: AccessToken {
            token: "signed.jwt.value".to_owned(),
            expires_in: 7200,
        },
    }
}

fn registration_body() -> Value {
    json!({
        "username": "ada",
        "phone": PHONE,
        "password": "hunter2",
        "captchaId": "c1",
        "captcha": "4821",
        "smsCode": "123456",
    })
}

fn login_body() -> Value {
    json!({
        "phone": PHONE,
        "password": "hunter2",
        "captchaId": "c1",
        "captcha": "4821",
    })
}

#[fixture]
fn ports() -> MockPorts {
    MockPorts::default()
}

async fn call(ports: MockPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(ports.into_state())
            .app_data(token_data_for(7))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .service(register)
                    .service(login)
                    .service(send_sms_code)
                    .service(get_profile),
            ),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}

fn assert_validation(body: &Value, field: &str, code: &str) {
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn register_returns_token_and_user(mut ports: MockPorts) {
    ports
        .login
        .expect_register()
        .withf(|registration| {
            registration.username().as_ref() == "ada"
                && registration.captcha().id() == "c1"
                && registration.sms_code() == "123456"
        })
        .times(1)
        .returning(|_| Ok(session()));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/user")
            .set_json(registration_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
    assert_eq!(body["accessToken"], "signed.jwt.value");
    assert_eq!(body["expireIn"], 7200);
    assert_eq!(body["data"]["id"], 7);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
}

#[rstest]
#[case("smsCode", "  ", "smsCode", "empty_sms_code")]
#[case("captcha", "", "captcha", "empty_captcha")]
#[case("password", "", "password", "empty_password")]
#[case("username", " ", "username", "empty_username")]
#[case("phone", "1380013800", "phone", "invalid_phone")]
#[actix_web::test]
async fn register_rejects_invalid_fields(
    mut ports: MockPorts,
    #[case] key: &str,
    #[case] value: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    ports.login.expect_register().times(0);
    let mut body = registration_body();
    body[key] = Value::from(value);

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/user")
            .set_json(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, field, code);
}

#[rstest]
#[actix_web::test]
async fn login_returns_session(mut ports: MockPorts) {
    ports
        .login
        .expect_login()
        .withf(|credentials| credentials.phone().as_ref() == PHONE && credentials.password() == "hunter2")
        .times(1)
        .returning(|_| Ok(session()));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/user/login")
            .set_json(login_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accessToken"], "signed.jwt.value");
    assert_eq!(body["data"]["username"], "ada");
}

#[rstest]
#[actix_web::test]
async fn login_surfaces_service_errors(mut ports: MockPorts) {
    ports
        .login
        .expect_login()
        .returning(|_| Err(Error::not_found("not yet registered")));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/user/login")
            .set_json(login_body()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "not yet registered");
    assert!(body["traceId"].is_string());
}

#[rstest]
#[actix_web::test]
async fn sms_code_is_sent_for_valid_phone(mut ports: MockPorts) {
    ports
        .sms_codes
        .expect_send_code()
        .withf(|phone| phone.as_ref() == PHONE)
        .times(1)
        .returning(|_| Ok(()));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/user/sms?phone={PHONE}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], PHONE);
}

#[rstest]
#[case("/api/v1/user/sms?phone=12ab")]
#[case("/api/v1/user/sms")]
#[actix_web::test]
async fn sms_code_rejects_bad_phone(mut ports: MockPorts, #[case] uri: &str) {
    ports.sms_codes.expect_send_code().times(0);

    let (status, body) = call(ports, actix_test::TestRequest::get().uri(uri)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, "phone", "invalid_phone");
}

#[rstest]
#[actix_web::test]
async fn profile_requires_bearer_token(mut ports: MockPorts) {
    ports.profile.expect_fetch_profile().times(0);

    let (status, body) = call(ports, actix_test::TestRequest::get().uri("/api/v1/user/7")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn profile_passes_caller_and_target(mut ports: MockPorts) {
    ports
        .profile
        .expect_fetch_profile()
        .withf(|caller, id| caller.get() == 7 && id.get() == 7)
        .times(1)
        .returning(|_, _| Ok(ada()));

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get()
            .uri("/api/v1/user/7")
            .insert_header((AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
    assert_eq!(body["data"]["phone"], PHONE);
}

#[rstest]
#[actix_web::test]
async fn foreign_profile_is_forbidden(mut ports: MockPorts) {
    ports
        .profile
        .expect_fetch_profile()
        .returning(|_, _| Err(Error::forbidden("request no permission")));

    let (status, _) = call(
        ports,
        actix_test::TestRequest::get()
            .uri("/api/v1/user/9")
            .insert_header((AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[case("abc")]
#[case("0")]
#[case("-3")]
#[actix_web::test]
async fn malformed_profile_id_is_rejected(mut ports: MockPorts, #[case] raw: &str) {
    ports.profile.expect_fetch_profile().times(0);

    let (status, body) = call(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/user/{raw}"))
            .insert_header((AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_validation(&body, "id", "invalid_id");
}
