//! HTTP client adapter for the marketplace backend.
//!
//! Every call returns the raw JSON body; shaping it into models is left to the
//! normalizer and the lenient model decoders. A `401` from any authenticated
//! call becomes [`AppError::Unauthorized`].

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AdminSettings, GenerateFakeUsers, NewCategory};
use crate::services::json_lookup::{first_map, stringify, KeyPath};
use crate::session::Session;

const TOKEN_PATHS: &[KeyPath] = &[
    &["access_token"],
    &["data", "access_token"],
    &["token"],
    &["data", "token"],
];

/// An uploaded image to forward with a new category.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct AdminApi {
    client: Client,
    base_url: String,
}

impl AdminApi {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange administrator credentials for a bearer token.
    ///
    /// Rejected credentials surface as [`AppError::Backend`] so the login form
    /// can show the backend's message.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let response = self
            .client
            .post(self.url("/admin/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;
        if !status.is_success() {
            return Err(AppError::Backend {
                status: status.as_u16(),
                message: backend_message(&body),
            });
        }

        first_map(&body, TOKEN_PATHS, |v| v.as_str().map(str::to_string))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Backend {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: "Login response did not contain a token".to_string(),
            })
    }

    pub fn with_session<'a>(&'a self, session: &'a Session) -> AuthedApi<'a> {
        AuthedApi { api: self, session }
    }
}

/// Backend calls on behalf of one administrator session.
pub struct AuthedApi<'a> {
    api: &'a AdminApi,
    session: &'a Session,
}

impl AuthedApi<'_> {
    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let token = self.session.token().ok_or(AppError::Unauthorized)?;
        Ok(self
            .api
            .client
            .request(method, self.api.url(path))
            .bearer_auth(token))
    }

    pub async fn dashboard(&self) -> AppResult<Value> {
        send(self.request(Method::GET, "/admin/dashboard")?).await
    }

    pub async fn categories(&self) -> AppResult<Value> {
        send(
            self.request(Method::GET, "/admin/categories")?
                .query(&[("limit", 1000)]),
        )
        .await
    }

    pub async fn create_category(
        &self,
        category: &NewCategory,
        image: Option<ImageUpload>,
    ) -> AppResult<Value> {
        let mut form = Form::new()
            .text("name", category.name.trim().to_string())
            .text(
                "discount_percentage",
                category.discount_percentage.to_string(),
            )
            .text("provider_share", category.provider_share.to_string())
            .text("seeker_share", category.seeker_share.to_string());

        if let Some(url) = category.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
            form = form.text("image_url", url.trim().to_string());
        }
        if let Some(image) = image {
            let mut part = Part::bytes(image.bytes).file_name(image.filename);
            if let Some(mime) = image.content_type {
                part = part.mime_str(&mime)?;
            }
            form = form.part("image_file", part);
        }

        send(self.request(Method::POST, "/admin/categories")?.multipart(form)).await
    }

    pub async fn users(&self) -> AppResult<Value> {
        send(
            self.request(Method::GET, "/admin/users")?
                .query(&[("limit", 10_000)]),
        )
        .await
    }

    pub async fn fake_users(&self, limit: usize) -> AppResult<Value> {
        send(
            self.request(Method::GET, "/admin/fake-users")?
                .query(&[("limit", limit)]),
        )
        .await
    }

    pub async fn generate_fake_users(&self, request: &GenerateFakeUsers) -> AppResult<Value> {
        let number = request.number().to_string();
        send(
            self.request(Method::POST, "/admin/fake-users/generate")?
                .form(&[
                    ("city", request.city.as_str()),
                    ("target_audience", request.target_audience.as_str()),
                    ("number", number.as_str()),
                ]),
        )
        .await
    }

    pub async fn import_fake_users(&self, filename: String, content: Vec<u8>) -> AppResult<Value> {
        let part = Part::bytes(content)
            .file_name(filename)
            .mime_str("text/csv")?;
        send(
            self.request(Method::POST, "/admin/fake-users/import")?
                .multipart(Form::new().part("file", part)),
        )
        .await
    }

    pub async fn set_fake_user_status(&self, email: &str, status: &str) -> AppResult<Value> {
        send(
            self.request(Method::PUT, "/admin/fake-users/status")?
                .form(&[("email", email), ("status", status)]),
        )
        .await
    }

    pub async fn settings(&self) -> AppResult<Value> {
        send(self.request(Method::GET, "/admin/settings")?).await
    }

    pub async fn save_settings(&self, settings: &AdminSettings) -> AppResult<Value> {
        send(self.request(Method::POST, "/admin/settings")?.json(settings)).await
    }
}

async fn send(request: RequestBuilder) -> AppResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    let url = response.url().path().to_string();

    if status == StatusCode::UNAUTHORIZED {
        debug!(%url, "Backend answered 401");
        return Err(AppError::Unauthorized);
    }

    let body = read_body(response).await?;
    if !status.is_success() {
        let message = backend_message(&body);
        warn!(%url, status = status.as_u16(), %message, "Backend request failed");
        return Err(AppError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    debug!(%url, status = status.as_u16(), "Backend request succeeded");
    Ok(body)
}

/// Response body as JSON; a body that is not JSON is kept as a string.
async fn read_body(response: reqwest::Response) -> AppResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Human-readable message from an error body.
///
/// Prefers `detail`, then `message`; strings are used as-is, anything else is
/// serialized. Falls back to the whole body.
pub fn backend_message(body: &Value) -> String {
    ["detail", "message"]
        .iter()
        .find_map(|key| body.get(*key).filter(|v| !v.is_null()))
        .map(stringify)
        .unwrap_or_else(|| match body {
            Value::Null => "Request failed".to_string(),
            other => stringify(other),
        })
}
