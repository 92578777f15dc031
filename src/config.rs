use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the marketplace REST backend.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the marketplace backend, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub static_path: PathBuf,
    /// Rows per page in the listing views.
    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("MARKETPLACE_ADMIN_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("MARKETPLACE_ADMIN_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7070),
            api_base_url: env::var("MARKETPLACE_ADMIN_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            request_timeout: Duration::from_secs(
                env::var("MARKETPLACE_ADMIN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
            static_path: env::var("MARKETPLACE_ADMIN_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            page_size: env::var("MARKETPLACE_ADMIN_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(10),
        }
    }

    /// Configuration pointing at a specific backend, with every other value
    /// at its default.
    pub fn for_backend(api_base_url: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 7070,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(15),
            static_path: PathBuf::from("static"),
            page_size: 10,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
