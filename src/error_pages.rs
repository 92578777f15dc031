use askama::Template;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};

use crate::VERSION;

/// Newtype for passing error messages through response extensions.
#[derive(Clone)]
pub struct ErrorMessage(pub String);

#[derive(Template)]
#[template(path = "pages/error.html")]
struct ErrorPageTemplate {
    title: String,
    active: &'static str,
    version: &'static str,
    status_code: u16,
    status_text: &'static str,
    message: String,
}

/// Middleware that replaces 4xx/5xx responses with a full error page.
///
/// JSON endpoints, CSV downloads and the health check keep their own
/// bodies.
pub async fn error_page_middleware(request: Request<Body>, next: Next) -> Response {
    let is_htmx = request.headers().contains_key("hx-request");
    let path = request.uri().path().to_owned();
    let keep_body = path.starts_with("/api/") || path.ends_with(".csv") || path == "/health";

    let method = request.method().clone();
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = response
        .extensions()
        .get::<ErrorMessage>()
        .map(|e| e.0.as_str())
        .unwrap_or("");
    tracing::warn!(%status, %method, %path, message, "request failed");

    if is_htmx || keep_body {
        response
    } else {
        render_error_page(status, &response)
    }
}

/// Fallback handler for unmatched routes.
pub async fn fallback_handler() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    response.extensions_mut().insert(ErrorMessage(
        "The page you're looking for doesn't exist.".into(),
    ));
    response
}

fn render_error_page(status: StatusCode, response: &Response) -> Response {
    let message = response
        .extensions()
        .get::<ErrorMessage>()
        .map(|e| e.0.clone())
        .unwrap_or_else(|| default_message(status));

    let (status_text, _) = status_info(status);

    let template = ErrorPageTemplate {
        title: status_text.to_string(),
        active: "error",
        version: VERSION,
        status_code: status.as_u16(),
        status_text,
        message,
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page template: {}", e);
            (status, "Internal Server Error").into_response()
        }
    }
}

fn status_info(status: StatusCode) -> (&'static str, &'static str) {
    match status.as_u16() {
        400 => ("Bad Request", "The request could not be understood."),
        404 => ("Not Found", "The page you're looking for doesn't exist."),
        405 => ("Method Not Allowed", "This action is not supported."),
        413 => ("Payload Too Large", "The uploaded file is too large."),
        500 => ("Internal Server Error", "Something went wrong on our end."),
        502 => ("Bad Gateway", "The marketplace backend could not be reached."),
        _ => ("Error", ""),
    }
}

fn default_message(status: StatusCode) -> String {
    let msg = status_info(status).1;
    if msg.is_empty() {
        format!("An unexpected error occurred ({}).", status.as_u16())
    } else {
        msg.to_string()
    }
}
