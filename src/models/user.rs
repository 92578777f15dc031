use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::filters;
use crate::services::csv_export::CsvExportable;
use crate::services::json_lookup::{as_text, field, find_records, KeyPath};
use crate::sort_utils::{SortDirection, SortableColumn};

const USER_LISTS: &[KeyPath] = &[&["data", "users"], &["users"], &["data"]];

/// Login-type filter on the users page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LoginGroup {
    #[default]
    All,
    Social,
    Manual,
}

impl LoginGroup {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "social" => Self::Social,
            "manual" => Self::Manual,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Social => "social",
            Self::Manual => "manual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Login Types",
            Self::Social => "Google Auth",
            Self::Manual => "Manual Login",
        }
    }

    pub fn all() -> [LoginGroup; 3] {
        [Self::All, Self::Social, Self::Manual]
    }

    pub fn admits(&self, user: &User) -> bool {
        match self {
            Self::All => true,
            Self::Social => user.is_social(),
            Self::Manual => user.is_manual(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub city: String,
    /// Lowercased login type as reported by the backend.
    pub login_type: String,
    pub status: Option<String>,
    pub registered_at: String,
}

impl User {
    /// Decode one backend record, accepting the field aliases older
    /// backends used. Non-objects are not users.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |keys: &[&str]| field(object, keys, as_text).unwrap_or_default();

        let status = field(object, &["status"], as_text).or_else(|| {
            ["active", "is_active"]
                .iter()
                .any(|k| object.get(*k).and_then(Value::as_bool) == Some(true))
                .then(|| "active".to_string())
        });

        Some(Self {
            id: text(&["id", "_id"]),
            name: text(&["name", "full_name", "username", "displayName"]),
            email: text(&["email", "email_address"]),
            city: text(&["city", "location", "city_name"]),
            login_type: text(&["login_type", "type", "auth_provider"]).to_lowercase(),
            status,
            registered_at: text(&["registered_at", "created_at", "createdAt", "created"]),
        })
    }

    /// All users found in a `/admin/users` payload.
    pub fn list_from_payload(raw: &Value) -> Vec<Self> {
        find_records(raw, USER_LISTS)
            .into_iter()
            .filter_map(Self::from_json)
            .collect()
    }

    pub fn is_social(&self) -> bool {
        ["social", "google", "oauth", "facebook", "apple"]
            .iter()
            .any(|t| self.login_type.contains(t))
    }

    pub fn is_manual(&self) -> bool {
        ["manual", "normal", "local", "email"]
            .iter()
            .any(|t| self.login_type.contains(t))
    }

    /// Login type as shown in the table and the export.
    pub fn login_label(&self) -> String {
        if self.is_social() {
            LoginGroup::Social.label().to_string()
        } else if self.is_manual() {
            LoginGroup::Manual.label().to_string()
        } else {
            self.login_type.clone()
        }
    }

    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or("-")
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn registered_display(&self) -> String {
        filters::format_date(&self.registered_at)
    }

    /// Case-insensitive search over name, email and city.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty()
            || [&self.name, &self.email, &self.city]
                .iter()
                .any(|f| f.to_lowercase().contains(&q))
    }
}

impl CsvExportable for User {
    fn headers() -> &'static [&'static str] {
        &["Name", "Email", "City", "Login Type", "Status", "Registered"]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.city.clone(),
            self.login_label(),
            self.status.clone().unwrap_or_default(),
            self.registered_at.clone(),
        ]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UserSortColumn {
    Name,
    Email,
    City,
    #[default]
    Registered,
}

impl SortableColumn for UserSortColumn {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "city" => Some(Self::City),
            "registered" => Some(Self::Registered),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::City => "city",
            Self::Registered => "registered",
        }
    }
}

impl UserSortColumn {
    fn key<'a>(&self, user: &'a User) -> &'a str {
        match self {
            Self::Name => &user.name,
            Self::Email => &user.email,
            Self::City => &user.city,
            Self::Registered => &user.registered_at,
        }
    }

    pub fn compare(&self, a: &User, b: &User, direction: SortDirection) -> Ordering {
        let ord = self
            .key(a)
            .to_lowercase()
            .cmp(&self.key(b).to_lowercase());
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}
