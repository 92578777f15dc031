use askama::Template;
use axum::extract::{Multipart, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, RenderHtml};
use crate::handlers::{enter_view, flash_redirect, stale_response};
use crate::list_utils::{paginate, ListQuery, Pager};
use crate::models::{Category, NewCategory, NewCategoryForm};
use crate::services::admin_api::ImageUpload;
use crate::services::csv_export::CsvDownload;
use crate::services::json_lookup::{find_records, KeyPath};
use crate::session::Session;
use crate::state::AppState;
use crate::VERSION;

const CATEGORY_LISTS: &[KeyPath] = &[&["data", "categories"], &["categories"], &["data"]];

#[derive(Template)]
#[template(path = "pages/categories.html")]
pub struct CategoriesTemplate {
    pub title: String,
    pub active: &'static str,
    pub version: &'static str,
    pub categories: Vec<Category>,
    pub pager: Pager,
    pub search: String,
    pub defaults: NewCategory,
    pub notice: Option<String>,
    pub error: Option<String>,
}

fn categories_from_payload(raw: &Value) -> Vec<Category> {
    find_records(raw, CATEGORY_LISTS)
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record.clone()) {
            Ok(category) => Some(category),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable category record");
                None
            }
        })
        .collect()
}

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let ticket = enter_view(&state, &session, "categories");
    let raw = state.api.with_session(&session).categories().await;
    if let Some(stale) = stale_response(&ticket) {
        return Ok(stale);
    }

    let categories: Vec<Category> = categories_from_payload(&raw?)
        .into_iter()
        .filter(|c| c.matches(query.search()))
        .collect();
    let page = paginate(categories, query.page(), state.page_size());

    let template = CategoriesTemplate {
        title: "Categories".into(),
        active: "categories",
        version: VERSION,
        pager: Pager::new(&page, &query, "/categories"),
        categories: page.items,
        search: query.search().to_string(),
        defaults: NewCategory::default(),
        notice: query.notice.clone(),
        error: query.error.clone(),
    };

    Ok(template.render_html()?.into_response())
}

/// Split the create form into its text fields and the optional image.
async fn read_category_form(
    mut multipart: Multipart,
) -> AppResult<(NewCategory, Option<ImageUpload>)> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image_file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {}", e)))?;
            if !filename.is_empty() && !bytes.is_empty() {
                image = Some(ImageUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e)))?;
            fields.insert(name, Value::String(text));
        }
    }

    let form: NewCategoryForm = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("Invalid category: {}", e)))?;
    Ok((form.into(), image))
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let outcome = async {
        let (category, image) = read_category_form(multipart).await?;
        category.validate()?;
        state
            .api
            .with_session(&session)
            .create_category(&category, image)
            .await?;
        info!(name = %category.name, "Category created");
        Ok::<_, AppError>(format!("Category \"{}\" created", category.name.trim()))
    }
    .await;

    flash_redirect("/categories", outcome)
}

pub async fn export(State(state): State<AppState>, session: Session) -> AppResult<CsvDownload> {
    let raw = state.api.with_session(&session).categories().await?;
    let categories = categories_from_payload(&raw);
    debug!(rows = categories.len(), "Exporting categories");
    CsvDownload::build("categories.csv", &categories)
}
