use askama::Template;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::error_pages::ErrorMessage;
use crate::session;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the session token. Never shown to a view: the
    /// response clears the token and sends the browser to the login page.
    #[error("Session expired")]
    Unauthorized,

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message suitable for showing inline next to a form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::CsvParse(msg) => msg.clone(),
            AppError::Backend { message, .. } => message.clone(),
            AppError::Transport(_) => "Could not reach the marketplace backend".to_string(),
            AppError::Unauthorized => "Your session has expired".to_string(),
            AppError::Io(_) | AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => {
                tracing::info!("Backend rejected session token, redirecting to login");
                return unauthorized_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::CsvParse(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Backend { status, message } => {
                tracing::warn!(status, %message, "Backend reported an error");
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message.clone(),
                )
            }
            AppError::Transport(e) => {
                tracing::error!("Transport error: {:?}", e);
                (StatusCode::BAD_GATEWAY, self.user_message())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let html = format!(r#"<p class="flash error">{}</p>"#, html_escape(&message));

        let mut response = (status, Html(html)).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}

/// Marks a response caused by the backend rejecting the session token.
#[derive(Clone, Copy, Debug)]
pub struct SessionExpired;

/// Clear the token cookie and send the browser to `/login`.
fn unauthorized_response() -> Response {
    let mut response = Redirect::to("/login").into_response();
    response.extensions_mut().insert(SessionExpired);
    if let Ok(value) = HeaderValue::from_str(&session::removal_cookie().to_string()) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
        .headers_mut()
        .insert("HX-Redirect", HeaderValue::from_static("/login"));
    response
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub type AppResult<T> = Result<T, AppError>;

pub trait RenderHtml {
    fn render_html(self) -> AppResult<Html<String>>;
}

impl<T: Template> RenderHtml for T {
    fn render_html(self) -> AppResult<Html<String>> {
        self.render()
            .map(Html)
            .map_err(|e| AppError::Internal(format!("Template error: {}", e)))
    }
}
