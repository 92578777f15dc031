use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error_pages::{error_page_middleware, fallback_handler};
use crate::handlers;
use crate::session;
use crate::state::AppState;

/// Largest accepted request body; covers CSV imports and category images.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the backend client and assembles the full middleware stack.
/// Returns the shared state and a ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let static_path = config.static_path.clone();
    let state = AppState::new(config)?;
    tracing::info!(backend = %state.api.base_url(), "Using marketplace backend");

    let app = Router::new()
        .merge(handlers::routes())
        .route("/login", get(session::login_page))
        .route("/login", post(session::login_submit))
        .route("/logout", post(session::logout))
        .fallback(fallback_handler)
        .nest_service("/static", ServeDir::new(static_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::auth_middleware,
        ))
        .layer(middleware::from_fn(error_page_middleware))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    Ok((state, app))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
