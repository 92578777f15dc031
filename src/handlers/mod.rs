pub mod api;
pub mod categories;
pub mod dashboard;
pub mod fake_users;
pub mod settings;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::view_tracker::ViewTicket;
use crate::session::Session;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(dashboard::index))
        .route("/users", get(users::index))
        .route("/categories", get(categories::index))
        .route("/fake-users", get(fake_users::index))
        .route("/settings", get(settings::index))
        // Mutations
        .route("/categories/create", post(categories::create))
        .route("/fake-users/generate", post(fake_users::generate))
        .route("/fake-users/import", post(fake_users::import))
        .route("/fake-users/status", post(fake_users::toggle_status))
        .route("/settings/update", post(settings::update))
        // CSV exports
        .route("/users/export.csv", get(users::export))
        .route("/categories/export.csv", get(categories::export))
        .route("/fake-users/export.csv", get(fake_users::export))
        // API (JSON for charts)
        .route("/api/dashboard/cities", get(api::cities))
        .route("/api/dashboard/logins", get(api::logins))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}

/// Start a page view for the session; later views supersede it.
pub(crate) fn enter_view(state: &AppState, session: &Session, view: &'static str) -> ViewTicket {
    state.views.enter(session.token().unwrap_or_default(), view)
}

/// `204 No Content` when the session has moved on to another view since
/// `ticket` was taken.
pub(crate) fn stale_response(ticket: &ViewTicket) -> Option<Response> {
    if ticket.is_current() {
        return None;
    }
    debug!(view = ticket.view(), "Discarding stale view result");
    Some(StatusCode::NO_CONTENT.into_response())
}

/// Redirect back to a list page after a mutation, with its outcome as a
/// `notice` or `error` flash parameter.
///
/// Expired sessions and internal failures are not flashed; they go through
/// the regular error response.
pub(crate) fn flash_redirect(path: &str, outcome: AppResult<String>) -> AppResult<Redirect> {
    let (key, message) = match outcome {
        Ok(notice) => ("notice", notice),
        Err(
            e @ (AppError::Validation(_)
            | AppError::CsvParse(_)
            | AppError::Backend { .. }
            | AppError::Transport(_)),
        ) => ("error", e.user_message()),
        Err(e) => return Err(e),
    };

    let query = serde_urlencoded::to_string([(key, message.as_str())])
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Redirect::to(&format!("{}?{}", path, query)))
}
