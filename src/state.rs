use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::services::admin_api::AdminApi;
use crate::services::view_tracker::ViewTracker;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: AdminApi,
    pub views: Arc<ViewTracker>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let api = AdminApi::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            api,
            views: Arc::new(ViewTracker::new()),
        })
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }
}
