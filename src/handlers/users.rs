use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::{AppResult, RenderHtml};
use crate::handlers::{enter_view, stale_response};
use crate::list_utils::{paginate, ListQuery, Pager, SortHeader};
use crate::models::{LoginGroup, User, UserSortColumn};
use crate::services::csv_export::{dated_filename, CsvDownload};
use crate::session::Session;
use crate::sort_utils::Sortable;
use crate::state::AppState;
use crate::VERSION;

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("email", "Email"),
    ("city", "City"),
    ("registered", "Registered"),
];

pub struct LoginOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "pages/users.html")]
pub struct UsersTemplate {
    pub title: String,
    pub active: &'static str,
    pub version: &'static str,
    pub users: Vec<User>,
    pub pager: Pager,
    pub headers: Vec<SortHeader>,
    pub search: String,
    pub login_options: Vec<LoginOption>,
    pub export_href: String,
}

/// Users matching the search and login filters, in the requested order.
fn filtered_users(raw: &serde_json::Value, query: &ListQuery) -> Vec<User> {
    let group = LoginGroup::from_str(query.login.as_deref().unwrap_or(""));
    let sort = query.resolve_sort::<UserSortColumn>();

    let mut users: Vec<User> = User::list_from_payload(raw)
        .into_iter()
        .filter(|u| group.admits(u) && u.matches(query.search()))
        .collect();
    users.sort_by(|a, b| sort.column.compare(a, b, sort.direction));
    users
}

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let ticket = enter_view(&state, &session, "users");
    let raw = state.api.with_session(&session).users().await;
    if let Some(stale) = stale_response(&ticket) {
        return Ok(stale);
    }

    let users = filtered_users(&raw?, &query);
    debug!(matching = users.len(), "Users loaded");

    let group = LoginGroup::from_str(query.login.as_deref().unwrap_or(""));
    let sort = query.resolve_sort::<UserSortColumn>();
    let page = paginate(users, query.page(), state.page_size());

    let template = UsersTemplate {
        title: "Users".into(),
        active: "users",
        version: VERSION,
        pager: Pager::new(&page, &query, "/users"),
        users: page.items,
        headers: query.sort_headers("/users", &sort, SORT_COLUMNS),
        search: query.search().to_string(),
        login_options: LoginGroup::all()
            .into_iter()
            .map(|g| LoginOption {
                value: g.as_str(),
                label: g.label(),
                selected: g == group,
            })
            .collect(),
        export_href: query.filtered_href("/users/export.csv"),
    };

    Ok(template.render_html()?.into_response())
}

/// The filtered (not paged) user list as CSV.
pub async fn export(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<CsvDownload> {
    let raw = state.api.with_session(&session).users().await?;
    let users = filtered_users(&raw, &query);
    debug!(rows = users.len(), "Exporting users");

    let today = chrono::Local::now().date_naive();
    CsvDownload::build(dated_filename("users", today), &users)
}
