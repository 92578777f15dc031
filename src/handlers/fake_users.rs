use askama::Template;
use axum::extract::{Multipart, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, RenderHtml};
use crate::handlers::{enter_view, flash_redirect, stale_response};
use crate::list_utils::ListQuery;
use crate::models::fake_user::{
    audience_label, group_by_city, AUDIENCES, CITY_OPTIONS, MAX_EXPORT_ROWS,
};
use crate::models::{CityGroup, FakeUser, FakeUserStatus, GenerateFakeUsers, StatusToggle};
use crate::services::csv_export::{dated_filename, CsvDownload};
use crate::services::csv_import::check_fake_user_csv;
use crate::services::json_lookup::{lookup, stringify};
use crate::session::Session;
use crate::state::AppState;
use crate::VERSION;

/// Rows fetched for the listing page.
const PAGE_FETCH_LIMIT: usize = 1000;

pub struct AudienceOption {
    pub value: &'static str,
    pub label: String,
}

#[derive(Template)]
#[template(path = "pages/fake_users.html")]
pub struct FakeUsersTemplate {
    pub title: String,
    pub active: &'static str,
    pub version: &'static str,
    pub groups: Vec<CityGroup>,
    pub total: usize,
    pub cities: &'static [(&'static str, &'static str)],
    pub audiences: Vec<AudienceOption>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let ticket = enter_view(&state, &session, "fake_users");
    let raw = state
        .api
        .with_session(&session)
        .fake_users(PAGE_FETCH_LIMIT)
        .await;
    if let Some(stale) = stale_response(&ticket) {
        return Ok(stale);
    }

    let users = FakeUser::list_from_payload(&raw?);
    let total = users.len();
    let groups = group_by_city(users);
    debug!(total, cities = groups.len(), "Fake users loaded");

    let template = FakeUsersTemplate {
        title: "Fake Users".into(),
        active: "fake_users",
        version: VERSION,
        groups,
        total,
        cities: CITY_OPTIONS,
        audiences: AUDIENCES
            .iter()
            .map(|&a| AudienceOption {
                value: a,
                label: audience_label(a),
            })
            .collect(),
        notice: query.notice.clone(),
        error: query.error.clone(),
    };

    Ok(template.render_html()?.into_response())
}

/// The backend's own summary line, or `fallback`.
fn backend_notice(response: &Value, fallback: String) -> String {
    lookup(response, &["message"])
        .map(stringify)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
}

pub async fn generate(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GenerateFakeUsers>,
) -> AppResult<Redirect> {
    let outcome = async {
        form.validate()?;
        let response = state
            .api
            .with_session(&session)
            .generate_fake_users(&form)
            .await?;
        info!(city = %form.city, number = form.number(), "Fake users generated");
        Ok::<_, AppError>(backend_notice(
            &response,
            format!("Created {} fake users", form.number()),
        ))
    }
    .await;

    flash_redirect("/fake-users", outcome)
}

async fn read_upload(mut multipart: Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("fake_users.csv").to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
            debug!(file_name = %file_name, size_bytes = content.len(), "Received CSV file");
            return Ok((file_name, content.to_vec()));
        }
    }
    Err(AppError::Validation("No file uploaded".into()))
}

/// Import summary from the backend's `created`/`skipped` lists.
fn import_notice(response: &Value, duplicates: usize) -> String {
    let count = |key: &str| {
        lookup(response, &["data", key])
            .and_then(Value::as_array)
            .map(Vec::len)
    };
    let mut notice = match (count("created"), count("skipped")) {
        (Some(created), Some(skipped)) => {
            format!("Imported {} fake users, skipped {} rows", created, skipped)
        }
        _ => backend_notice(response, "Import finished".into()),
    };
    if duplicates > 0 {
        notice.push_str(&format!(
            " ({} duplicate emails in the file)",
            duplicates
        ));
    }
    notice
}

pub async fn import(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let outcome = async {
        let (file_name, content) = read_upload(multipart).await?;
        let check = check_fake_user_csv(&content)?;
        if !check.warnings.is_empty() {
            warn!(summary = %check.summary(), "Importing CSV with duplicate emails");
        }
        let response = state
            .api
            .with_session(&session)
            .import_fake_users(file_name, content)
            .await?;
        Ok::<_, AppError>(import_notice(&response, check.warnings.len()))
    }
    .await;

    flash_redirect("/fake-users", outcome)
}

pub async fn toggle_status(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<StatusToggle>,
) -> AppResult<Redirect> {
    let outcome = async {
        let email = form.email.trim();
        if email.is_empty() {
            return Err(AppError::Validation(
                "Cannot update this user: missing email".into(),
            ));
        }
        let next = FakeUserStatus::from_str(&form.current).toggled();
        let response = state
            .api
            .with_session(&session)
            .set_fake_user_status(email, next.as_str())
            .await?;
        info!(%email, status = next.as_str(), "Fake user status changed");
        Ok(backend_notice(
            &response,
            format!("Fake user {} set to {}", email, next.as_str()),
        ))
    }
    .await;

    flash_redirect("/fake-users", outcome)
}

pub async fn export(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let raw = state
        .api
        .with_session(&session)
        .fake_users(MAX_EXPORT_ROWS + 1)
        .await?;
    let users = FakeUser::list_from_payload(&raw);

    if users.len() > MAX_EXPORT_ROWS {
        warn!(rows = users.len(), "Refusing oversized fake user export");
        return Ok(flash_redirect(
            "/fake-users",
            Err(AppError::Validation(
                "Too many rows to export. Please narrow down the selection.".into(),
            )),
        )?
        .into_response());
    }

    let today = chrono::Local::now().date_naive();
    Ok(CsvDownload::build(dated_filename("fake_users", today), &users)?.into_response())
}
