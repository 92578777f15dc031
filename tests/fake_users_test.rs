//! Integration tests for fake user generation, import, status and export.

mod common;

use axum::http::StatusCode;
use common::TestClient;

const IMPORT_CSV: &[u8] = b"name,email,city,target_audience\n\
Marta Vidal,marta@test.com,barcelona,tourists\n\
Joan Riba,joan@test.com,madrid,students\n";

#[tokio::test]
async fn test_fake_users_grouped_by_city() {
    let client = TestClient::new().await;
    let (status, body) = client.get("/fake-users").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Barcelona, Spain"));
    assert!(body.contains("Madrid, Spain"));
    assert!(body.contains("Launch City"));
    assert!(body.contains("Laia Puig"));

    let barcelona = body.find("Barcelona, Spain").unwrap();
    let madrid = body.find("Madrid, Spain").unwrap();
    assert!(barcelona < madrid, "groups keep backend order");
}

#[tokio::test]
async fn test_fake_users_empty_state() {
    let client = TestClient::new().await;
    client.backend.lock().unwrap().fake_users.clear();

    let (_, body) = client.get("/fake-users").await;
    assert!(body.contains("No fake users created"));
}

#[tokio::test]
async fn test_generate_fake_users() {
    let client = TestClient::new().await;
    let response = client
        .post_form(
            "/fake-users/generate",
            &[("city", "Barcelona"), ("target_audience", "tourists"), ("number", "4")],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().unwrap().starts_with("/fake-users?notice="));
    assert_eq!(client.backend.lock().unwrap().fake_users.len(), 7);

    let (_, body) = client.follow(&response).await;
    assert!(body.contains("Created 4 fake users"));
}

#[tokio::test]
async fn test_generate_rejects_unknown_city() {
    let client = TestClient::new().await;
    let response = client
        .post_form(
            "/fake-users/generate",
            &[("city", "Oslo"), ("target_audience", "tourists"), ("number", "4")],
        )
        .await;

    assert!(response.location().unwrap().contains("error="));
    assert_eq!(client.backend.lock().unwrap().fake_users.len(), 3);
}

#[tokio::test]
async fn test_generate_rejects_too_many() {
    let client = TestClient::new().await;
    let response = client
        .post_form(
            "/fake-users/generate",
            &[("city", "Madrid"), ("target_audience", "students"), ("number", "500")],
        )
        .await;

    let (_, body) = client.follow(&response).await;
    assert!(body.contains("Number must be between 1 and 200"));
}

#[tokio::test]
async fn test_import_csv() {
    let client = TestClient::new().await;
    let response = client
        .post_multipart("/fake-users/import", &[("file", Some("users.csv"), IMPORT_CSV)])
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let (_, body) = client.follow(&response).await;
    assert!(body.contains("Imported 2 fake users, skipped 0 rows"));
    assert_eq!(client.backend.lock().unwrap().imports.len(), 1);
}

#[tokio::test]
async fn test_import_rejects_invalid_email() {
    let client = TestClient::new().await;
    let csv = b"name,email\nBad Row,not-an-email\n";
    let response = client
        .post_multipart("/fake-users/import", &[("file", Some("bad.csv"), csv)])
        .await;

    assert!(response.location().unwrap().contains("error="));
    assert!(client.backend.lock().unwrap().imports.is_empty());

    let (_, body) = client.follow(&response).await;
    assert!(body.contains("invalid email"));
}

#[tokio::test]
async fn test_import_without_file() {
    let client = TestClient::new().await;
    let response = client
        .post_multipart("/fake-users/import", &[("other", None, b"x")])
        .await;

    let (_, body) = client.follow(&response).await;
    assert!(body.contains("No file uploaded"));
}

#[tokio::test]
async fn test_toggle_status() {
    let client = TestClient::new().await;
    let response = client
        .post_form(
            "/fake-users/status",
            &[("email", "laia@test.com"), ("current", "active")],
        )
        .await;

    assert!(response.location().unwrap().contains("notice="));
    assert_eq!(
        client.backend.lock().unwrap().fake_users[0]["status"],
        "blocked"
    );

    client
        .post_form(
            "/fake-users/status",
            &[("email", "laia@test.com"), ("current", "blocked")],
        )
        .await;
    assert_eq!(
        client.backend.lock().unwrap().fake_users[0]["status"],
        "active"
    );
}

#[tokio::test]
async fn test_toggle_unknown_user() {
    let client = TestClient::new().await;
    let response = client
        .post_form(
            "/fake-users/status",
            &[("email", "ghost@test.com"), ("current", "active")],
        )
        .await;

    let (_, body) = client.follow(&response).await;
    assert!(body.contains("Fake user not found"));
}

#[tokio::test]
async fn test_fake_users_export() {
    let client = TestClient::new().await;
    let response = client.get_response("/fake-users/export.csv").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .header("content-disposition")
        .unwrap()
        .contains("fake_users_"));
    let mut lines = response.body.lines();
    assert_eq!(
        lines.next(),
        Some(r#""Name","Email","City","Target Audience","Status","Created""#)
    );
    assert_eq!(lines.count(), 3);
    assert!(response.body.contains(r#""pau@test.com","barcelona","students","blocked""#));
}
