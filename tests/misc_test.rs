//! Integration tests for the health check, static fallbacks and error pages.

mod common;

use axum::http::StatusCode;
use common::TestClient;

#[tokio::test]
async fn test_health_needs_no_session() {
    let client = TestClient::new().await.anonymous();
    let (status, body) = client.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_unknown_route_renders_error_page() {
    let client = TestClient::new().await;
    let (status, body) = client.get("/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Not Found"));
    assert!(body.contains("The page you"));
    assert!(body.contains("t exist."));
}

#[tokio::test]
async fn test_unreadable_settings_use_defaults() {
    let client = TestClient::new().await;
    client.backend.lock().unwrap().settings = serde_json::json!("not an object");

    let (status, body) = client.get("/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("80% / 20% / 0%"));
}

#[tokio::test]
async fn test_wrong_method_renders_error_page() {
    let client = TestClient::new().await;
    let response = client.get_response("/fake-users/status").await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.body.contains("This action is not supported."));
}
