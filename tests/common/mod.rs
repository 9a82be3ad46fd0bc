//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;

use huddle_api::state::AppState;
use huddle_auth::claims::RealtimeClaims;
use huddle_auth::verifier::TokenVerifier;
use huddle_core::config::AppConfig;
use huddle_core::types::id::UserId;
use huddle_signaling::coordinator::Coordinator;
use huddle_signaling::gate::ConnectionGate;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.realtime_secret = "realtime-test-secret".to_string();
        config.auth.session_secret = "session-test-secret".to_string();

        let verifier = Arc::new(TokenVerifier::new(&config.auth));
        let state = AppState {
            config: Arc::new(config.clone()),
            coordinator: Coordinator::new(config.signaling.clone()),
            gate: ConnectionGate::new(verifier),
            started_at: Instant::now(),
        };

        Self {
            router: huddle_api::router::build_router(state),
            config,
        }
    }

    /// Mint a realtime token the way the identity service would
    pub fn mint_realtime_token(&self, name: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = RealtimeClaims {
            sub: UserId::new(),
            name: name.to_string(),
            image: None,
            bio: None,
            industry: None,
            skills: vec![],
            networking_available: true,
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.auth.realtime_secret.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Make a WebSocket upgrade request (handshake headers, no real socket)
    pub async fn ws_request(&self, path: &str) -> TestResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .header("connection", "upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
