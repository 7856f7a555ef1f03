//! Behaviour tests for the bearer gate in front of protected routes.
//!
//! Requests pass through the real trace and auth middleware with an HMAC
//! token service, so every step exercises the public wiring.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use actix_web::{App, HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use tokio::runtime::Builder;
use tokio::task::LocalSet;

use textbook_api::Trace;
use textbook_api::domain::UserId;
use textbook_api::domain::ports::TokenService;
use textbook_api::inbound::http::auth::AuthenticatedUser;
use textbook_api::middleware::AuthGate;
use textbook_api::outbound::token::JwtTokenService;

const SECRET: &[u8] = b"integration-secret-integration-secret";

#[derive(Debug, Default)]
struct GateWorld {
    header: Option<String>,
    status: Option<StatusCode>,
    body: Option<Value>,
}

#[fixture]
fn world() -> Mutex<GateWorld> {
    Mutex::new(GateWorld::default())
}

fn token_service(secret: &[u8], lifetime: Duration) -> JwtTokenService {
    JwtTokenService::new(secret, "textbook-api", lifetime, Arc::new(DefaultClock))
}

fn issue_for(service: &JwtTokenService, uid: i64) -> String {
    let subject = UserId::new(uid).expect("valid user id");
    service.issue(subject).expect("token issued").token
}

#[given("a token issued for user {uid}")]
fn token_for_user(world: &Mutex<GateWorld>, uid: i64) {
    let token = issue_for(&token_service(SECRET, Duration::from_secs(60)), uid);
    world.lock().expect("world lock").header = Some(format!("Bearer {token}"));
}

#[given("a token signed with another secret")]
fn token_with_foreign_secret(world: &Mutex<GateWorld>) {
    let foreign = token_service(b"another-secret-another-secret-xx", Duration::from_secs(60));
    let token = issue_for(&foreign, 7);
    world.lock().expect("world lock").header = Some(format!("Bearer {token}"));
}

#[given("an unsigned token claiming user 7")]
fn unsigned_token(world: &Mutex<GateWorld>) {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(
        br#"{"iss":"textbook-api","iat":0,"nbf":0,"exp":4102444800,"uid":7}"#,
    );
    world.lock().expect("world lock").header = Some(format!("Bearer {header}.{claims}."));
}

#[given("a header using the scheme {scheme}")]
fn header_with_scheme(world: &Mutex<GateWorld>, scheme: String) {
    let token = issue_for(&token_service(SECRET, Duration::from_secs(60)), 7);
    world.lock().expect("world lock").header = Some(format!("{scheme} {token}"));
}

async fn send_request(header: Option<String>) -> (StatusCode, Value) {
    let tokens: Arc<dyn TokenService> =
        Arc::new(token_service(SECRET, Duration::from_secs(60)));
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::from(tokens))
            .wrap(Trace)
            .service(
                web::scope("/private").wrap(AuthGate).route(
                    "/whoami",
                    web::get().to(|user: AuthenticatedUser| async move {
                        HttpResponse::Ok().json(serde_json::json!({ "uid": user.id().get() }))
                    }),
                ),
            ),
    )
    .await;

    let mut request = actix_test::TestRequest::get().uri("/private/whoami");
    if let Some(value) = header {
        request = request.insert_header((AUTHORIZATION, value));
    }
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}

#[when("the client calls the protected route")]
fn call_protected_route(world: &Mutex<GateWorld>) {
    let header = world.lock().expect("world lock").header.clone();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime should initialize");
    let (status, body) = LocalSet::new().block_on(&runtime, send_request(header));

    let mut world = world.lock().expect("world lock");
    world.status = Some(status);
    world.body = Some(body);
}

#[then("the handler sees user {uid}")]
fn handler_sees_user(world: &Mutex<GateWorld>, uid: i64) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.status, Some(StatusCode::OK));
    assert_eq!(world.body.as_ref().expect("body")["uid"], uid);
}

fn assert_rejected_with(world: &Mutex<GateWorld>, message: &str) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.status, Some(StatusCode::UNAUTHORIZED));
    let body = world.body.as_ref().expect("body");
    assert_eq!(body["message"], message);
    assert_eq!(body["code"], "unauthorized");
    assert!(body["traceId"].is_string());
}

#[then("the request is rejected as carrying no usable credential")]
fn rejected_without_credential(world: &Mutex<GateWorld>) {
    assert_rejected_with(world, "missing or malformed credential");
}

#[then("the request is rejected as an invalid token")]
fn rejected_as_invalid(world: &Mutex<GateWorld>) {
    assert_rejected_with(world, "invalid token");
}

#[then("the request is rejected as using an unsupported algorithm")]
fn rejected_as_unsupported_algorithm(world: &Mutex<GateWorld>) {
    assert_rejected_with(world, "unsupported signing algorithm");
}

#[scenario(path = "tests/features/auth_gate.feature")]
fn auth_gate_scenarios(world: Mutex<GateWorld>) {
    drop(world);
}
