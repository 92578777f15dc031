//! Shared test utilities for integration tests.
//!
//! Each [`TestClient`] starts an in-process fake marketplace backend on an
//! OS-assigned port and points a freshly built admin app at it. Requests go
//! through the full middleware stack with `oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use http_body_util::BodyExt;
use marketplace_admin::config::Config;
use marketplace_admin::server;
use marketplace_admin::state::AppState;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

/// What the fake backend has stored and seen.
#[derive(Debug, Default)]
pub struct BackendState {
    pub fake_users: Vec<Value>,
    pub categories: Vec<Value>,
    pub settings: Value,
    pub category_uploads: Vec<String>,
    pub imports: Vec<String>,
}

pub type SharedBackend = Arc<Mutex<BackendState>>;

/// Response captured from the admin app.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get("location")
            .and_then(|v| v.to_str().ok())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// A test client that simulates a logged-in browser session.
pub struct TestClient {
    app: Router,
    pub state: AppState,
    pub backend: SharedBackend,
    cookie: Option<String>,
}

impl TestClient {
    /// Admin app backed by the default fake backend, logged in.
    pub async fn new() -> Self {
        let backend = Arc::new(Mutex::new(BackendState {
            fake_users: seed_fake_users(),
            categories: seed_categories(),
            settings: json!({
                "revenue_split": {"provider": 70, "seeker": 20, "platform": 10},
                "discounts": {"global_discount": 5, "category_wise": true, "seasonal": false}
            }),
            ..Default::default()
        }));
        Self::with_backend(backend).await
    }

    pub async fn with_backend(backend: SharedBackend) -> Self {
        let (port, _handle) = server::serve(fake_backend(backend.clone()), "127.0.0.1", 0)
            .await
            .expect("Failed to start fake backend");

        let config = Config::for_backend(&format!("http://127.0.0.1:{port}/api"));
        let (state, app) = server::build_app(config).expect("Failed to build app");

        Self {
            app,
            state,
            backend,
            cookie: Some(format!("auth_token={TOKEN}")),
        }
    }

    /// Same client with no session cookie.
    pub fn anonymous(mut self) -> Self {
        self.cookie = None;
        self
    }

    /// Same client with a token the backend no longer accepts.
    pub fn expired(mut self) -> Self {
        self.cookie = Some("auth_token=expired-token".to_string());
        self
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).to_string(),
        }
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header("Cookie", cookie),
            None => builder,
        }
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self.get_response(uri).await;
        (response.status, response.body)
    }

    pub async fn get_response(&self, uri: &str) -> TestResponse {
        self.send(self.builder("GET", uri).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with form data.
    pub async fn post_form(&self, uri: &str, form_data: &[(&str, &str)]) -> TestResponse {
        let body = form_data
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            self.builder("POST", uri)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Make a multipart POST. Each part is `(name, filename, content)`; parts
    /// without a filename are plain text fields.
    pub async fn post_multipart(
        &self,
        uri: &str,
        parts: &[(&str, Option<&str>, &[u8])],
    ) -> TestResponse {
        let boundary = "X-MARKETPLACE-ADMIN-TEST";
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        self.send(
            self.builder("POST", uri)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Follow a flash redirect and return the rendered page.
    pub async fn follow(&self, response: &TestResponse) -> (StatusCode, String) {
        let location = response.location().expect("expected a redirect");
        self.get(location).await
    }
}

// =============================================================================
// Fake marketplace backend
// =============================================================================

fn seed_fake_users() -> Vec<Value> {
    vec![
        json!({"id": "f1", "name": "Laia Puig", "email": "laia@test.com", "city": "barcelona",
               "target_audience": "tourists", "status": "active", "created_at": "2024-03-05T10:00:00Z"}),
        json!({"id": "f2", "name": "Pau Serra", "email": "pau@test.com", "city": "barcelona",
               "target_audience": "students", "status": "blocked", "created_at": "2024-03-06T10:00:00Z"}),
        json!({"id": "f3", "name": "Lucia Gomez", "email": "lucia@test.com", "city": "madrid",
               "target_audience": "professionals", "status": "active", "created_at": "2024-03-07"}),
    ]
}

fn seed_categories() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Home Cleaning", "tags": ["cleaning", "home", "weekly", "deep", "windows", "kitchen", "oven", "carpets"],
               "provider_share": 80, "seeker_share": 20, "discount_percentage": 10, "created_at": "2024-01-15T09:00:00Z"}),
        json!({"id": 2, "name": "Surf Lessons", "tags": "sea|waves",
               "provider_share": 75.5, "seeker_share": 24.5, "created_at": "2024-02-01"}),
    ]
}

fn users() -> Vec<Value> {
    vec![
        json!({"name": "Ana Lopez", "email": "ana@example.com", "city": "Barcelona",
               "login_type": "google", "status": "active", "created_at": "2024-03-01T12:00:00Z"}),
        json!({"name": "Bruno Costa", "email": "bruno@example.com", "city": "Madrid",
               "login_type": "manual", "status": "inactive", "created_at": "2024-02-10T12:00:00Z"}),
        json!({"name": "Chloe Martin", "email": "chloe@example.com", "city": "Paris",
               "login_type": "facebook", "created_at": "2024-01-20T12:00:00Z"}),
    ]
}

fn ok(data: Value) -> Response {
    Json(json!({"IsSuccess": true, "data": data})).into_response()
}

fn fail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({"IsSuccess": false, "detail": detail}))).into_response()
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(fail(StatusCode::UNAUTHORIZED, "Not authenticated")),
    }
}

pub fn fake_backend(state: SharedBackend) -> Router {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/dashboard", get(dashboard))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/categories", get(list_categories).post(create_category))
        .route("/api/admin/fake-users", get(list_fake_users))
        .route("/api/admin/fake-users/generate", post(generate))
        .route("/api/admin/fake-users/import", post(import))
        .route("/api/admin/fake-users/status", put(set_status))
        .route("/api/admin/settings", get(get_settings).post(save_settings))
        .with_state(state)
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        Json(json!({"access_token": TOKEN, "token_type": "bearer"})).into_response()
    } else {
        fail(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn dashboard(headers: HeaderMap, State(state): State<SharedBackend>) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let fake_users = state.lock().unwrap().fake_users.len();
    ok(json!({
        "counts": {"users": 1234, "categories": 2, "fake_users": fake_users, "previous_users": 1000},
        "user_distribution": {
            "Barcelona": {"provider": 30, "seeker": 50},
            "Madrid": {"provider": 10, "seeker": 15}
        },
        "login_distribution": {"google": 60, "manual": 40},
        "recent_users": [
            {"name": "Ana Lopez", "city": "Barcelona", "created_at": "2024-03-01T12:00:00Z"}
        ]
    }))
}

async fn list_users(headers: HeaderMap) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    ok(json!({"total": 3, "users": users()}))
}

async fn list_categories(headers: HeaderMap, State(state): State<SharedBackend>) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let categories = state.lock().unwrap().categories.clone();
    ok(json!({"total": categories.len(), "categories": categories}))
}

async fn create_category(
    headers: HeaderMap,
    State(state): State<SharedBackend>,
    mut multipart: Multipart,
) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let mut fields = HashMap::new();
    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image_file" {
            upload = field.file_name().map(str::to_string);
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }

    let name = fields.get("name").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    if state.categories.iter().any(|c| c["name"] == name.as_str()) {
        return fail(StatusCode::CONFLICT, "Category already exists");
    }
    if let Some(file) = upload {
        state.category_uploads.push(file);
    }
    let category = json!({
        "id": state.categories.len() + 1,
        "name": name,
        "tags": [],
        "provider_share": fields.get("provider_share").and_then(|v| v.parse::<f64>().ok()),
        "seeker_share": fields.get("seeker_share").and_then(|v| v.parse::<f64>().ok()),
        "discount_percentage": fields
            .get("discount_percentage")
            .and_then(|v| v.parse::<f64>().ok()),
    });
    state.categories.push(category.clone());
    ok(json!({"category": category}))
}

#[derive(Deserialize)]
struct Limit {
    limit: Option<usize>,
}

async fn list_fake_users(
    headers: HeaderMap,
    State(state): State<SharedBackend>,
    Query(query): Query<Limit>,
) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let users: Vec<Value> = state
        .lock()
        .unwrap()
        .fake_users
        .iter()
        .take(query.limit.unwrap_or(100))
        .cloned()
        .collect();
    ok(json!({"total": users.len(), "fake_users": users}))
}

async fn generate(
    headers: HeaderMap,
    State(state): State<SharedBackend>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let number: usize = form.get("number").and_then(|n| n.parse().ok()).unwrap_or(0);
    let city = form.get("city").cloned().unwrap_or_default();
    let audience = form.get("target_audience").cloned().unwrap_or_default();

    let mut state = state.lock().unwrap();
    let start = state.fake_users.len();
    for i in 0..number {
        state.fake_users.push(json!({
            "id": format!("g{}", start + i),
            "name": format!("Generated {}", start + i),
            "email": format!("generated{}@test.com", start + i),
            "city": city,
            "target_audience": audience,
            "status": "active",
            "created_at": "2024-04-01T00:00:00Z"
        }));
    }
    Json(json!({"IsSuccess": true, "message": format!("Created {} fake users", number)}))
        .into_response()
}

async fn import(
    headers: HeaderMap,
    State(state): State<SharedBackend>,
    mut multipart: Multipart,
) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let mut content = String::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            content = field.text().await.unwrap_or_default();
        }
    }
    let rows: Vec<&str> = content.lines().skip(1).filter(|l| !l.trim().is_empty()).collect();
    state.lock().unwrap().imports.push(content.clone());

    let created: Vec<Value> = rows.iter().map(|r| json!({"row": r})).collect();
    Json(json!({
        "IsSuccess": true,
        "message": format!("Imported {} fake users", created.len()),
        "data": {"created": created, "skipped": []}
    }))
    .into_response()
}

async fn set_status(
    headers: HeaderMap,
    State(state): State<SharedBackend>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let email = form.get("email").cloned().unwrap_or_default();
    let status = form.get("status").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    match state.fake_users.iter_mut().find(|u| u["email"] == email.as_str()) {
        Some(user) => {
            user["status"] = Value::String(status.clone());
            let message = format!("Fake user status updated to {}", status);
            Json(json!({"IsSuccess": true, "message": message})).into_response()
        }
        None => fail(StatusCode::NOT_FOUND, "Fake user not found"),
    }
}

async fn get_settings(headers: HeaderMap, State(state): State<SharedBackend>) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    let settings = state.lock().unwrap().settings.clone();
    ok(json!({"settings": settings}))
}

async fn save_settings(
    headers: HeaderMap,
    State(state): State<SharedBackend>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorized(&headers) {
        return r;
    }
    state.lock().unwrap().settings = body.clone();
    ok(json!({"settings": body}))
}
