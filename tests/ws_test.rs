//! Integration tests for the authenticated WebSocket upgrade.

mod common;

use http::StatusCode;

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = common::TestApp::new();

    let response = app.request("GET", "/ws").await;

    assert!(
        response.status == StatusCode::UNAUTHORIZED
            || response.status == StatusCode::BAD_REQUEST
            || response.status == StatusCode::UPGRADE_REQUIRED,
        "Expected 401, 400, or 426, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_ws_upgrade_with_invalid_token_is_refused() {
    let app = common::TestApp::new();

    let response = app.ws_request("/ws?token=not-a-jwt").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body.get("error").unwrap().as_str().unwrap(),
        "AUTHENTICATION"
    );
}

#[tokio::test]
async fn test_ws_upgrade_with_valid_token_switches_protocols() {
    let app = common::TestApp::new();
    let token = app.mint_realtime_token("Aiko");

    let response = app.ws_request(&format!("/ws?token={token}")).await;

    assert_eq!(response.status, StatusCode::SWITCHING_PROTOCOLS);
}
