use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::filters;
use crate::form_utils::deserialize_optional_i64;
use crate::services::csv_export::CsvExportable;
use crate::services::json_lookup::{as_text, field, find_records, KeyPath};

const FAKE_USER_LISTS: &[KeyPath] = &[&["data", "fake_users"], &["fake_users"], &["data"]];

/// Cities the backend accepts for generated users; Barcelona is the launch city.
pub const CITY_OPTIONS: &[(&str, &str)] = &[
    ("Barcelona", "Barcelona (Launch City)"),
    ("Madrid", "Madrid"),
    ("Paris", "Paris"),
    ("Rome", "Rome"),
    ("Berlin", "Berlin"),
];

pub const AUDIENCES: &[&str] = &["tourists", "students", "professionals", "families", "other"];

pub const MAX_GENERATE: i64 = 200;
pub const MAX_EXPORT_ROWS: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FakeUserStatus {
    #[default]
    Active,
    Blocked,
}

impl FakeUserStatus {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "active" => Self::Active,
            _ => Self::Blocked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Blocked,
            Self::Blocked => Self::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FakeUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub city: String,
    pub target_audience: String,
    pub status: FakeUserStatus,
    pub created_at: String,
}

impl FakeUser {
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |keys: &[&str]| field(object, keys, as_text);

        let status = match text(&["status"]) {
            Some(s) => FakeUserStatus::from_str(&s),
            None => match object.get("active").and_then(Value::as_bool) {
                Some(false) => FakeUserStatus::Blocked,
                _ => FakeUserStatus::Active,
            },
        };

        Some(Self {
            id: text(&["id", "_id", "email"]).unwrap_or_default(),
            name: text(&["name", "full_name", "displayName"]).unwrap_or_else(|| "Unnamed".into()),
            email: text(&["email", "email_address"]).unwrap_or_default(),
            city: text(&["city", "city_name", "location"]).unwrap_or_else(|| "unknown".into()),
            target_audience: text(&["target_audience", "audience"])
                .unwrap_or_else(|| "other".into()),
            status,
            created_at: text(&["created_at", "createdAt", "created", "registered_at"])
                .unwrap_or_default(),
        })
    }

    pub fn list_from_payload(raw: &Value) -> Vec<Self> {
        find_records(raw, FAKE_USER_LISTS)
            .into_iter()
            .filter_map(Self::from_json)
            .collect()
    }

    pub fn audience_label(&self) -> String {
        audience_label(&self.target_audience)
    }

    pub fn created_display(&self) -> String {
        filters::format_date(&self.created_at)
    }
}

impl CsvExportable for FakeUser {
    fn headers() -> &'static [&'static str] {
        &["Name", "Email", "City", "Target Audience", "Status", "Created"]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.city.to_lowercase(),
            self.target_audience.clone(),
            self.status.as_str().to_string(),
            self.created_at.clone(),
        ]
    }
}

pub fn audience_label(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    if v.is_empty() {
        "Other".to_string()
    } else if v.contains("tour") {
        "Tourists".to_string()
    } else if v.contains("student") {
        "Students".to_string()
    } else if v.contains("prof") {
        "Professionals".to_string()
    } else if v.contains("family") || v.contains("families") {
        "Families".to_string()
    } else {
        let mut chars = v.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Other".to_string(),
        }
    }
}

/// "City, Country" for the known cities, the key itself otherwise.
pub fn city_label(key: &str) -> String {
    let s = key.to_lowercase();
    let known = [
        ("barc", "Barcelona, Spain"),
        ("madrid", "Madrid, Spain"),
        ("paris", "Paris, France"),
        ("rome", "Rome, Italy"),
        ("berlin", "Berlin, Germany"),
    ];
    if key.trim().is_empty() {
        return "Unknown".to_string();
    }
    known
        .iter()
        .find(|(needle, _)| s.contains(needle))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Fake users of one city, in backend order.
#[derive(Debug, Clone, Serialize)]
pub struct CityGroup {
    pub key: String,
    pub label: String,
    pub is_launch_city: bool,
    pub users: Vec<FakeUser>,
}

/// Group by lowercased city, keeping the order in which cities first appear.
pub fn group_by_city(users: Vec<FakeUser>) -> Vec<CityGroup> {
    let mut groups: Vec<CityGroup> = Vec::new();
    for user in users {
        let key = user.city.to_lowercase();
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.users.push(user),
            None => groups.push(CityGroup {
                label: city_label(&key),
                is_launch_city: key.contains("barc"),
                key,
                users: vec![user],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateFakeUsers {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub number: Option<i64>,
}

impl GenerateFakeUsers {
    pub fn number(&self) -> i64 {
        self.number.unwrap_or(5)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !CITY_OPTIONS.iter().any(|(city, _)| *city == self.city) {
            return Err(AppError::Validation(format!(
                "City '{}' is not allowed",
                self.city
            )));
        }
        if !AUDIENCES.contains(&self.target_audience.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown target audience '{}'",
                self.target_audience
            )));
        }
        if !(1..=MAX_GENERATE).contains(&self.number()) {
            return Err(AppError::Validation(format!(
                "Number must be between 1 and {}",
                MAX_GENERATE
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusToggle {
    pub email: String,
    /// Status shown on the page when the toggle was clicked.
    #[serde(default)]
    pub current: String,
}
