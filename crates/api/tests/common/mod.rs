//! Common test utilities for integration tests.
//!
//! The router is driven in-process against an `InMemoryStore`, so no
//! database is needed.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use domain::services::InMemoryStore;
use prize_wheel_api::app::create_app;
use prize_wheel_api::config::{
    AdminConfig, CampaignConfig, Config, DatabaseConfig, LoggingConfig, SecurityConfig,
    ServerConfig, WheelConfig,
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "operator@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const SESSION_SECRET: &str = "integration_test_session_secret_0123456789";

/// Hashing is slow; share one hash across tests.
fn admin_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        shared::password::hash_password(ADMIN_PASSWORD).expect("Failed to hash password")
    })
    .clone()
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            max_body_size: 64 * 1024,
        },
        database: DatabaseConfig {
            url: String::new(),
            in_memory: true,
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0, // Disable rate limiting for tests
            hsts_enabled: false,
            trust_forwarded_for: false,
        },
        campaign: CampaignConfig {
            auto_approve: false,
            claim_attempts: 3,
            claim_retry_delay_ms: 1,
        },
        admin: AdminConfig {
            email: ADMIN_EMAIL.to_string(),
            password_hash: admin_password_hash(),
            session_secret: SESSION_SECRET.to_string(),
            session_expiry_secs: 600,
            leeway_secs: 0,
        },
        wheel: WheelConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub fn create_test_app(config: Config, store: Arc<InMemoryStore>) -> TestApp {
    let router = create_app(config, store.clone()).expect("Failed to build app");
    TestApp { router, store }
}

/// App with the default test config and the given emails on the allow-list.
pub fn app_with_allowed(emails: &[&str]) -> TestApp {
    create_test_app(
        test_config(),
        Arc::new(InMemoryStore::with_allowed(emails.iter().copied())),
    )
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_json_request(method: Method, uri: &str, token: &str, body: Value) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

pub fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Attaches the peer address `axum::serve` would record for a real socket.
pub fn from_peer(mut request: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40_000))));
    request
}

pub fn with_forwarded_for(mut request: Request<Body>, value: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("X-Forwarded-For", value.parse().unwrap());
    request
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Logs in as the configured operator and returns the session token.
pub async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/admin/login",
            serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Missing token in response: {}", body))
        .to_string()
}
