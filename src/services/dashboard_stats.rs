//! Normalization of the `/admin/dashboard` payload.
//!
//! The backend has shipped several shapes for the same statistics over time.
//! [`normalize`] never fails: every field falls back to `None`, `0` or an
//! empty series when nothing recognizable is present.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::models::{ActivityItem, CityEntry, DashboardStats, Growth, LoginLabel, LoginSlice};
use crate::services::json_lookup::{
    as_integer, as_number, as_text, field, first_map, first_present, payload_root, stringify,
    KeyPath,
};

const TOTAL_USERS: &[KeyPath] = &[&["total_users"], &["counts", "users"], &["users"], &["total"]];

const TOTAL_CATEGORIES: &[KeyPath] = &[
    &["total_categories"],
    &["counts", "categories"],
    &["categories"],
];

const FAKE_USERS: &[KeyPath] = &[&["fake_users"], &["counts", "fake_users"]];

const PREVIOUS_TOTAL_USERS: &[KeyPath] = &[
    &["previous_total_users"],
    &["counts", "previous_users"],
    &["previous_total"],
];

const GROWTH_RATE: &[KeyPath] = &[&["growth_rate"], &["growth", "rate"]];

const CITY_SOURCES: &[KeyPath] = &[
    &["user_distribution"],
    &["city_distribution"],
    &["city_distribution_by_city"],
    &["users_by_city"],
    &["user_counts_by_city"],
    &["counts_by_city"],
    &["counts", "cities"],
    &["counts", "city_breakdown"],
];

const LOGIN_SOURCES: &[KeyPath] = &[
    &["login_distribution"],
    &["login_type_distribution"],
    &["login"],
    &["auth_providers"],
    &["providers"],
    &["login_counts"],
    &["loginStats"],
];

const ACTIVITY_SOURCES: &[KeyPath] = &[&["recent_activity"], &["activity"], &["recent"]];

const NAME_KEYS: &[&str] = &["name", "city", "label", "key"];
const PROVIDER_KEYS: &[&str] = &["provider", "provider_count", "providers", "providerCount"];
const SEEKER_KEYS: &[&str] = &["seeker", "seeker_count", "seekers", "seekerCount"];
const COUNT_KEYS: &[&str] = &["count", "value", "total", "users"];

const LOGIN_LABEL_KEYS: &[&str] = &["name", "type", "label", "provider", "login_type"];
const LOGIN_VALUE_KEYS: &[&str] = &["value", "count", "total"];

/// Shown when the backend reports no activity feed at all.
fn placeholder_activity() -> Vec<ActivityItem> {
    vec![
        ActivityItem::new("New category \"Outdoor Sports\" created", "2 minutes ago"),
        ActivityItem::new("Fake user batch generated for Barcelona", "15 minutes ago"),
        ActivityItem::new("Social login filter applied", "1 hour ago"),
        ActivityItem::new("New user registered from Madrid", "2 hours ago"),
    ]
}

/// Build the canonical record from an arbitrary statistics payload.
pub fn normalize(raw: &Value) -> DashboardStats {
    let data = payload_root(raw);

    let total_users = first_map(data, TOTAL_USERS, as_integer).map(non_negative);
    let total_categories = first_map(data, TOTAL_CATEGORIES, as_integer).map(non_negative);
    let fake_users = first_map(data, FAKE_USERS, as_integer)
        .map(non_negative)
        .unwrap_or(0);
    let previous_total_users =
        first_map(data, PREVIOUS_TOTAL_USERS, as_integer).map(non_negative);

    let growth = match first_map(data, GROWTH_RATE, as_number) {
        Some(rate) => Some(Growth::from_rate(rate)),
        None => match (total_users, previous_total_users) {
            (Some(current), Some(previous)) => Some(Growth::between(current, previous)),
            _ => None,
        },
    };

    let city_series = first_present(data, CITY_SOURCES)
        .map(city_series)
        .unwrap_or_default();
    let login_series = first_present(data, LOGIN_SOURCES)
        .map(login_series)
        .unwrap_or_default();
    let recent_activity = recent_activity(data, raw);

    debug!(
        ?total_users,
        ?total_categories,
        fake_users,
        cities = city_series.len(),
        login_types = login_series.len(),
        "Normalized dashboard statistics"
    );

    DashboardStats {
        total_users,
        total_categories,
        fake_users,
        previous_total_users,
        growth,
        city_series,
        login_series,
        recent_activity,
    }
}

fn non_negative(n: i64) -> i64 {
    n.max(0)
}

/// An alias holding `null` counts as absent so the next alias is tried.
fn present(value: &Value) -> Option<&Value> {
    (!value.is_null()).then_some(value)
}

fn count_of(value: &Value) -> i64 {
    as_integer(value).map(non_negative).unwrap_or(0)
}

fn city_series(source: &Value) -> Vec<CityEntry> {
    match source {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| city_from_element(item, i + 1))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| city_from_entry(name.clone(), value))
            .collect(),
        other => {
            trace!(?other, "City distribution is neither a list nor a mapping");
            Vec::new()
        }
    }
}

fn city_from_element(item: &Value, position: usize) -> CityEntry {
    let fallback_name = || format!("Item {}", position);
    match item {
        Value::Object(object) => {
            let name = field(object, NAME_KEYS, as_text).unwrap_or_else(fallback_name);
            city_from_object(name.clone(), object).unwrap_or_else(|| match single_pair(object) {
                Some((key, value)) => CityEntry::Count {
                    name: key.clone(),
                    count: count_of(value),
                },
                None => CityEntry::Count { name, count: 0 },
            })
        }
        Value::Array(pair) => CityEntry::Count {
            name: pair.first().and_then(as_text).unwrap_or_else(fallback_name),
            count: pair.get(1).map(count_of).unwrap_or(0),
        },
        scalar => CityEntry::Count {
            name: fallback_name(),
            count: count_of(scalar),
        },
    }
}

fn city_from_entry(name: String, value: &Value) -> CityEntry {
    match value {
        Value::Object(object) => {
            city_from_object(name.clone(), object).unwrap_or(CityEntry::Count { name, count: 0 })
        }
        scalar => CityEntry::Count {
            name,
            count: count_of(scalar),
        },
    }
}

/// Split entry when any role field is present, count entry when a count
/// field is present.
fn city_from_object(name: String, object: &Map<String, Value>) -> Option<CityEntry> {
    let provider = field(object, PROVIDER_KEYS, present);
    let seeker = field(object, SEEKER_KEYS, present);
    if provider.is_some() || seeker.is_some() {
        return Some(CityEntry::Split {
            name,
            provider: provider.map(count_of).unwrap_or(0),
            seeker: seeker.map(count_of).unwrap_or(0),
        });
    }

    field(object, COUNT_KEYS, present).map(|count| CityEntry::Count {
        name,
        count: count_of(count),
    })
}

/// The only key of an object `{"Madrid": 7}` that is not itself a name field.
fn single_pair(object: &Map<String, Value>) -> Option<(&String, &Value)> {
    if object.len() != 1 {
        return None;
    }
    object
        .iter()
        .next()
        .filter(|(key, _)| !NAME_KEYS.contains(&key.as_str()))
}

fn login_series(source: &Value) -> Vec<LoginSlice> {
    match source {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|object| LoginSlice {
                label: LoginLabel::classify(
                    &field(object, LOGIN_LABEL_KEYS, as_text).unwrap_or_else(|| "other".into()),
                ),
                value: field(object, LOGIN_VALUE_KEYS, present)
                    .map(count_of)
                    .unwrap_or(0),
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| LoginSlice {
                label: LoginLabel::classify(key),
                value: match value {
                    Value::Object(object) => field(object, LOGIN_VALUE_KEYS, present)
                        .map(count_of)
                        .unwrap_or(0),
                    scalar => count_of(scalar),
                },
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn recent_activity(data: &Value, raw: &Value) -> Vec<ActivityItem> {
    let feed = first_map(data, ACTIVITY_SOURCES, present)
        .or_else(|| raw.get("recent_activity").and_then(present));

    if let Some(feed) = feed {
        return match feed {
            Value::Array(items) => items.iter().map(activity_item).collect(),
            _ => Vec::new(),
        };
    }

    // The current backend only lists recently registered users.
    if let Some(Value::Array(users)) = data.get("recent_users") {
        return users.iter().filter_map(registration_activity).collect();
    }

    placeholder_activity()
}

fn activity_item(item: &Value) -> ActivityItem {
    match item {
        Value::Object(object) => ActivityItem {
            title: field(object, &["title", "message"], |v| Some(stringify(v)))
                .unwrap_or_default(),
            time: field(object, &["time", "when"], |v| Some(stringify(v))).unwrap_or_default(),
        },
        Value::Null => ActivityItem::new("", ""),
        other => ActivityItem::new(stringify(other), ""),
    }
}

fn registration_activity(user: &Value) -> Option<ActivityItem> {
    let object = user.as_object()?;
    let who = field(object, &["name", "email"], as_text).unwrap_or_else(|| "New user".into());
    let title = match field(object, &["city"], as_text) {
        Some(city) => format!("{} registered from {}", who, city),
        None => format!("{} registered", who),
    };
    let time = field(object, &["created_at"], as_text).unwrap_or_default();
    Some(ActivityItem { title, time })
}
