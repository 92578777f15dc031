//! Administrator session handling.
//!
//! The bearer token issued by the backend's `/admin/login` endpoint is kept in
//! an HTTP-only cookie. Each request turns that cookie into an explicit
//! [`Session`] value which handlers hand to the HTTP client adapter; nothing
//! reads the token from ambient state.
//!
//! The token is set on login, read on every outgoing backend request, and
//! cleared on logout or whenever the backend answers `401`.

use askama::Template;
use axum::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use std::convert::Infallible;
use tower_cookies::{Cookie, Cookies};

use crate::error::{AppError, RenderHtml, SessionExpired};
use crate::state::AppState;
use crate::VERSION;

/// Cookie name for the backend bearer token.
pub const SESSION_COOKIE: &str = "auth_token";

/// The current administrator's credentials, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    pub fn from_cookies(cookies: &Cookies) -> Self {
        cookies
            .get(SESSION_COOKIE)
            .map(|c| Self::with_token(c.value()))
            .unwrap_or_default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Persist a freshly issued token in the browser.
    pub fn store(cookies: &Cookies, token: &str) {
        let cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(tower_cookies::cookie::SameSite::Strict)
            .build();
        cookies.add(cookie);
    }

    pub fn clear(cookies: &Cookies) {
        cookies.remove(
            Cookie::build((SESSION_COOKIE, ""))
                .path("/")
                .http_only(true)
                .build(),
        );
    }
}

/// A cookie that, when sent as `Set-Cookie`, removes the token.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Cookies>()
            .map(Session::from_cookies)
            .unwrap_or_default())
    }
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub active: &'static str,
    pub version: &'static str,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginFormData {
    pub email: String,
    pub password: String,
}

/// Redirects requests without a token to the login page, and drops the view
/// bookkeeping of tokens the backend has rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if path == "/login" || path.starts_with("/static/") || path == "/health" {
        return next.run(request).await;
    }

    let session = Session::from_cookies(&cookies);
    if let Some(token) = session.token() {
        let response = next.run(request).await;
        if response.extensions().get::<SessionExpired>().is_some() {
            tracing::debug!("Forgetting views of expired session");
            state.views.forget(token);
        }
        return response;
    }

    let is_htmx = request.headers().contains_key("HX-Request");
    if is_htmx || path.starts_with("/api/") {
        return (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
    }

    Redirect::to("/login").into_response()
}

fn render_login(email: String, error: Option<String>) -> Response {
    let template = LoginTemplate {
        title: "Login".into(),
        active: "login",
        version: VERSION,
        email,
        error,
    };

    match template.render_html() {
        Ok(html) => html.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub async fn login_page(session: Session) -> Response {
    if session.is_authenticated() {
        return Redirect::to("/").into_response();
    }
    render_login(String::new(), None)
}

pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginFormData>,
) -> Response {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return render_login(email, Some("Email and password are required".into()));
    }

    match state.api.login(&email, &form.password).await {
        Ok(token) => {
            tracing::info!(%email, "Administrator logged in");
            Session::store(&cookies, &token);
            Redirect::to("/").into_response()
        }
        Err(AppError::Backend { status: 401, message }) => {
            tracing::warn!(%email, "Login rejected by backend");
            render_login(email, Some(message))
        }
        Err(e) => {
            tracing::warn!(%email, error = %e, "Login failed");
            render_login(email, Some(e.user_message()))
        }
    }
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    if let Some(token) = Session::from_cookies(&cookies).token() {
        state.views.forget(token);
    }
    Session::clear(&cookies);
    Redirect::to("/login")
}
