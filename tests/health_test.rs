//! Integration tests for the liveness endpoints.

mod common;

use http::StatusCode;

#[tokio::test]
async fn test_health_check() {
    let app = common::TestApp::new();

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("status").unwrap().as_str().unwrap(), "ok");
    assert!(response.body.get("uptime_seconds").is_some());
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = common::TestApp::new();

    let response = app.request("GET", "/api/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("connections").unwrap().as_u64(), Some(0));
    assert_eq!(response.body.get("active_calls").unwrap().as_u64(), Some(0));
}
