use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::info;

use crate::error::{AppError, AppResult, RenderHtml};
use crate::handlers::{enter_view, flash_redirect, stale_response};
use crate::list_utils::ListQuery;
use crate::models::{AdminSettings, SettingsForm, SplitBar};
use crate::session::Session;
use crate::state::AppState;
use crate::VERSION;

#[derive(Template)]
#[template(path = "pages/settings.html")]
pub struct SettingsTemplate {
    pub title: String,
    pub active: &'static str,
    pub version: &'static str,
    pub settings: AdminSettings,
    pub bar: SplitBar,
    pub split_label: String,
    pub notice: Option<String>,
    pub error: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let ticket = enter_view(&state, &session, "settings");
    let raw = state.api.with_session(&session).settings().await;
    if let Some(stale) = stale_response(&ticket) {
        return Ok(stale);
    }

    let settings = AdminSettings::from_payload(&raw?);
    let template = SettingsTemplate {
        title: "Settings".into(),
        active: "settings",
        version: VERSION,
        bar: settings.split_bar(),
        split_label: settings.split_label(),
        settings,
        notice: query.notice.clone(),
        error: query.error.clone(),
    };

    Ok(template.render_html()?.into_response())
}

pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SettingsForm>,
) -> AppResult<Redirect> {
    let settings = AdminSettings::from(form);
    let outcome = async {
        settings.validate()?;
        state
            .api
            .with_session(&session)
            .save_settings(&settings)
            .await?;
        info!(split = %settings.split_label(), "Settings updated");
        Ok::<_, AppError>("Settings updated".to_string())
    }
    .await;

    flash_redirect("/settings", outcome)
}
