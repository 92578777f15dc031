use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{CityEntry, LoginSlice};
use crate::services::charts::{self, CitySeriesMode, PieSlice};
use crate::services::dashboard_stats;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CitySeries {
    pub mode: CitySeriesMode,
    pub series: Vec<CityEntry>,
}

#[derive(Debug, Serialize)]
pub struct LoginSeries {
    pub series: Vec<LoginSlice>,
    pub slices: Vec<PieSlice>,
}

pub async fn cities(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<CitySeries>> {
    let raw = state.api.with_session(&session).dashboard().await?;
    let stats = dashboard_stats::normalize(&raw);

    Ok(Json(CitySeries {
        mode: CitySeriesMode::of(&stats.city_series),
        series: stats.city_series,
    }))
}

pub async fn logins(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<LoginSeries>> {
    let raw = state.api.with_session(&session).dashboard().await?;
    let stats = dashboard_stats::normalize(&raw);

    Ok(Json(LoginSeries {
        slices: charts::pie_chart(&stats.login_series),
        series: stats.login_series,
    }))
}
