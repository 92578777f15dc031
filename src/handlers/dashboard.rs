use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::{AppResult, RenderHtml};
use crate::handlers::{enter_view, stale_response};
use crate::models::{ActivityItem, DashboardStats};
use crate::services::charts::{self, BarChart, PieSlice, PROVIDER_COLOR, SEEKER_COLOR};
use crate::services::dashboard_stats;
use crate::session::Session;
use crate::state::AppState;
use crate::VERSION;

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub active: &'static str,
    pub version: &'static str,
    pub total_users: String,
    pub total_categories: String,
    pub fake_users: String,
    pub growth_text: String,
    /// CSS modifier for the growth line: `up`, `down` or `flat`.
    pub growth_class: &'static str,
    pub bars: BarChart,
    pub pie: Vec<PieSlice>,
    pub pie_gradient: String,
    pub provider_color: &'static str,
    pub seeker_color: &'static str,
    pub activity: Vec<ActivityItem>,
}

impl DashboardTemplate {
    fn from_stats(stats: DashboardStats) -> Self {
        let growth_class = match &stats.growth {
            Some(g) if g.is_positive() => "up",
            Some(g) if g.is_negative() => "down",
            _ => "flat",
        };
        let pie = charts::pie_chart(&stats.login_series);

        Self {
            title: "Dashboard".into(),
            active: "dashboard",
            version: VERSION,
            total_users: stats.total_users_display(),
            total_categories: stats.total_categories_display(),
            fake_users: stats.fake_users_display(),
            growth_text: stats.growth_text(),
            growth_class,
            bars: charts::bar_chart(&stats.city_series),
            pie_gradient: charts::conic_gradient(&pie),
            pie,
            provider_color: PROVIDER_COLOR,
            seeker_color: SEEKER_COLOR,
            activity: stats.recent_activity,
        }
    }
}

pub async fn index(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    debug!("Loading dashboard");
    let ticket = enter_view(&state, &session, "dashboard");

    let raw = state.api.with_session(&session).dashboard().await;
    if let Some(stale) = stale_response(&ticket) {
        return Ok(stale);
    }

    let stats = dashboard_stats::normalize(&raw?);
    Ok(DashboardTemplate::from_stats(stats)
        .render_html()?
        .into_response())
}
