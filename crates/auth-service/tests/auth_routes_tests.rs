//! Auth service integration tests.
//!
//! Drives the real router with an in-memory user store and a `wiremock`
//! profile service.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use auth_service::middleware::ServiceTokenGuard;
use auth_service::repositories::memory::InMemoryUserRepository;
use auth_service::routes::{build_routes, AppState};
use auth_service::services::{AuthService, HttpProfileProvisioner};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::jwt::TokenSigner;
use common::password::MIN_BCRYPT_COST;
use common::secret::SecretString;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{metrics_handle, test_signer, TEST_JWT_SECRET, TEST_SERVICE_TOKEN};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestAuth {
    app: Router,
    users: Arc<InMemoryUserRepository>,
    profile: MockServer,
}

/// Router against a fresh store. The profile mock answers `profile_status`
/// and expects `profile_calls` calls.
async fn spawn_auth(profile_status: u16, profile_calls: u64) -> TestAuth {
    let profile = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(profile_status))
        .expect(profile_calls)
        .mount(&profile)
        .await;

    let users = Arc::new(InMemoryUserRepository::new());
    let state = Arc::new(AppState {
        auth: AuthService::new(
            users.clone(),
            Arc::new(HttpProfileProvisioner::new(profile.uri(), Duration::from_secs(2)).unwrap()),
            Arc::new(TokenSigner::new(&SecretString::from(TEST_JWT_SECRET))),
            MIN_BCRYPT_COST,
        ),
        service_guard: ServiceTokenGuard::new(&SecretString::from(TEST_SERVICE_TOKEN)).unwrap(),
    });

    TestAuth {
        app: build_routes(state, metrics_handle()),
        users,
        profile,
    }
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn alice() -> Value {
    json!({ "username": "alice", "email": "alice@example.com", "password": "password1" })
}

async fn register_alice(app: &Router) -> String {
    let (status, body) = call(app, post_json("/auth/register", &alice())).await;
    assert_eq!(status, StatusCode::CREATED);
    test_signer().verify(body["token"].as_str().unwrap()).unwrap().sub
}

#[tokio::test]
async fn test_register_returns_token_for_new_user() {
    let auth = spawn_auth(201, 1).await;

    let (status, body) = call(&auth.app, post_json("/auth/register", &alice())).await;

    assert_eq!(status, StatusCode::CREATED);
    let claims = test_signer().verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(auth.users.len().await, 1);

    let (status, user) = call(
        &auth.app,
        Request::get(format!("/auth/user/{}", claims.sub))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "alice");
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_sends_identity_to_profile_service() {
    let profile = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/profile"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&profile)
        .await;

    let state = Arc::new(AppState {
        auth: AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(HttpProfileProvisioner::new(profile.uri(), Duration::from_secs(2)).unwrap()),
            Arc::new(test_signer()),
            MIN_BCRYPT_COST,
        ),
        service_guard: ServiceTokenGuard::new(&SecretString::from(TEST_SERVICE_TOKEN)).unwrap(),
    });
    let app = build_routes(state, metrics_handle());

    let user_id = register_alice(&app).await;

    let requests = profile.received_requests().await.unwrap();
    let sent = requests.first().unwrap();
    assert_eq!(sent.headers.get("x-user-id").unwrap(), user_id.as_str());
    let body: Value = serde_json::from_slice(&sent.body).unwrap();
    assert_eq!(body["name"], "alice");
}

#[tokio::test]
async fn test_register_rolls_back_when_profile_fails() {
    let auth = spawn_auth(500, 1).await;

    let (status, body) = call(&auth.app, post_json("/auth/register", &alice())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
    assert!(auth.users.is_empty().await);
}

#[tokio::test]
async fn test_duplicate_register_skips_profile_call() {
    let auth = spawn_auth(201, 1).await;
    register_alice(&auth.app).await;

    let (status, body) = call(&auth.app, post_json("/auth/register", &alice())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email or username already in use");
    auth.profile.verify().await;
}

#[tokio::test]
async fn test_invalid_registration_has_no_side_effects() {
    let auth = spawn_auth(201, 0).await;

    for bad in [
        json!({ "username": "al", "email": "alice@example.com", "password": "password1" }),
        json!({ "username": "alice", "email": "not-an-email", "password": "password1" }),
        json!({ "username": "alice", "email": "alice@example.com", "password": "short" }),
    ] {
        let (status, _) = call(&auth.app, post_json("/auth/register", &bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let request = Request::post("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(&auth.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid JSON");

    assert!(auth.users.is_empty().await);
}

#[tokio::test]
async fn test_login_failures_share_one_response() {
    let auth = spawn_auth(201, 1).await;
    register_alice(&auth.app).await;

    let unknown = call(
        &auth.app,
        post_json("/auth/login", &json!({ "username": "bob", "password": "password1" })),
    )
    .await;
    let wrong = call(
        &auth.app,
        post_json("/auth/login", &json!({ "username": "alice", "password": "password2" })),
    )
    .await;

    assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong);

    let (status, body) = call(
        &auth.app,
        post_json("/auth/login", &json!({ "username": "alice", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(test_signer().verify(body["token"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let auth = spawn_auth(201, 0).await;

    for id in ["not-a-uuid", "00000000-0000-0000-0000-000000000000"] {
        let (status, body) = call(
            &auth.app,
            Request::get(format!("/auth/user/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "user not found");
    }
}

#[tokio::test]
async fn test_delete_user_requires_service_token() {
    let auth = spawn_auth(201, 1).await;
    let user_id = register_alice(&auth.app).await;
    let uri = format!("/auth/user/{user_id}");

    let (status, _) = call(&auth.app, Request::delete(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &auth.app,
        Request::delete(&uri)
            .header("x-service-token", "wrong-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(auth.users.len().await, 1);

    let (status, _) = call(
        &auth.app,
        Request::delete(&uri)
            .header("x-service-token", TEST_SERVICE_TOKEN)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(auth.users.is_empty().await);

    let (status, _) = call(
        &auth.app,
        Request::delete(&uri)
            .header("x-service-token", TEST_SERVICE_TOKEN)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reflects_store() {
    let auth = spawn_auth(201, 0).await;

    let (status, body) = call(
        &auth.app,
        Request::get("/auth/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    auth.users.set_healthy(false);
    let (status, _) = call(
        &auth.app,
        Request::get("/auth/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
