#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use quillgate::db::{Database, Role};
use quillgate::jwt::JwtConfig;
use quillgate::rate_limit::RateLimitConfig;
use quillgate::{ServerConfig, create_app};

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-for-testing-only";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_0123456789";

/// Tests drive the router with `oneshot`, so there is no peer address;
/// the client IP comes from this header instead.
pub const CLIENT_IP_HEADER: &str = "x-forwarded-for";
pub const DEFAULT_CLIENT_IP: &str = "198.51.100.1";

#[derive(Default)]
pub struct TestOptions {
    pub maintenance: bool,
    pub rate_limits: Option<RateLimitConfig>,
}

pub async fn create_test_app() -> (axum::Router, Database) {
    create_test_app_with(TestOptions::default()).await
}

pub async fn create_test_app_with(options: TestOptions) -> (axum::Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let rate_limits = options
        .rate_limits
        .unwrap_or_else(|| RateLimitConfig::generous(Some(CLIENT_IP_HEADER.to_string())));

    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        rate_limits,
        maintenance: options.maintenance,
    };

    (create_app(&config), db)
}

pub fn jwt() -> JwtConfig {
    JwtConfig::new(TEST_JWT_SECRET)
}

/// A bearer token for a plain customer.
pub fn token_for(email: &str) -> String {
    token_with(email, Role::Customer, false)
}

pub fn token_with(email: &str, role: Role, has_access: bool) -> String {
    jwt()
        .generate_token("uid-test", email, role, has_access)
        .expect("Failed to generate test token")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None, DEFAULT_CLIENT_IP)
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request("POST", uri, token, Some(body), DEFAULT_CLIENT_IP)
}

pub fn put_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request("PUT", uri, token, Some(body), DEFAULT_CLIENT_IP)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request("DELETE", uri, token, None, DEFAULT_CLIENT_IP)
}

pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
    client_ip: &str,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CLIENT_IP_HEADER, client_ip);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("Response is not JSON: {}", e))
}
