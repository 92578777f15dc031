use serde::Serialize;
use std::fmt;

use crate::filters;

/// Direction of the month-over-month user growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthSign {
    Positive,
    Negative,
    None,
    New,
}

/// Month-over-month growth of the user base.
///
/// `value` is `None` exactly when `sign` is [`GrowthSign::None`] or
/// [`GrowthSign::New`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Growth {
    pub text: String,
    pub value: Option<f64>,
    pub sign: GrowthSign,
}

impl Growth {
    /// Growth from a rate in percent as reported or computed.
    pub fn from_rate(rate: f64) -> Self {
        if rate > 0.0 {
            Self {
                text: format!("+{}% from last month", rate),
                value: Some(rate),
                sign: GrowthSign::Positive,
            }
        } else if rate < 0.0 {
            Self {
                text: format!("{}% from last month", rate),
                value: Some(rate),
                sign: GrowthSign::Negative,
            }
        } else {
            Self {
                text: "0% from last month".to_string(),
                value: None,
                sign: GrowthSign::None,
            }
        }
    }

    /// Growth between two user totals, rounded to one decimal.
    ///
    /// A zero previous total never reaches the division: it reports `New`
    /// when users appeared, and no growth otherwise.
    pub fn between(current: i64, previous: i64) -> Self {
        if previous == 0 {
            return if current > 0 {
                Self {
                    text: "New".to_string(),
                    value: None,
                    sign: GrowthSign::New,
                }
            } else {
                Self::none()
            };
        }

        let rate = (current - previous) as f64 / previous as f64 * 100.0;
        Self::from_rate((rate * 10.0).round() / 10.0)
    }

    pub fn none() -> Self {
        Self {
            text: "-".to_string(),
            value: None,
            sign: GrowthSign::None,
        }
    }

    /// Short badge such as `+20%`, only when there is a numeric rate.
    pub fn badge(&self) -> Option<String> {
        self.value.map(|v| {
            if v > 0.0 {
                format!("+{}%", v)
            } else {
                format!("{}%", v)
            }
        })
    }

    pub fn is_positive(&self) -> bool {
        self.sign == GrowthSign::Positive
    }

    pub fn is_negative(&self) -> bool {
        self.sign == GrowthSign::Negative
    }
}

/// One bar of the per-city user distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CityEntry {
    /// Users split by marketplace role.
    Split {
        name: String,
        provider: i64,
        seeker: i64,
    },
    Count {
        name: String,
        count: i64,
    },
}

impl CityEntry {
    pub fn name(&self) -> &str {
        match self {
            CityEntry::Split { name, .. } | CityEntry::Count { name, .. } => name,
        }
    }

    pub fn total(&self) -> i64 {
        match self {
            CityEntry::Split {
                provider, seeker, ..
            } => provider.saturating_add(*seeker),
            CityEntry::Count { count, .. } => *count,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, CityEntry::Split { .. })
    }
}

/// Display bucket for a login method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LoginLabel {
    #[serde(rename = "Normal Login")]
    Normal,
    #[serde(rename = "Google Login")]
    Google,
    #[serde(rename = "Facebook Login")]
    Facebook,
    #[serde(rename = "Apple Login")]
    Apple,
    #[serde(rename = "Social Login")]
    Social,
    Other,
}

impl LoginLabel {
    /// Classify a raw backend label such as `manual` or `GOOGLE_OAUTH`.
    pub fn classify(raw: &str) -> Self {
        let token = raw.to_lowercase();
        if token.contains("manual") || token.contains("normal") {
            Self::Normal
        } else if token.contains("google") {
            Self::Google
        } else if token.contains("facebook") {
            Self::Facebook
        } else if token.contains("apple") {
            Self::Apple
        } else if token.contains("social") {
            Self::Social
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal Login",
            Self::Google => "Google Login",
            Self::Facebook => "Facebook Login",
            Self::Apple => "Apple Login",
            Self::Social => "Social Login",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for LoginLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSlice {
    pub label: LoginLabel,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    pub title: String,
    pub time: String,
}

impl ActivityItem {
    pub fn new(title: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time: time.into(),
        }
    }
}

/// Canonical dashboard statistics, rebuilt from every backend fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: Option<i64>,
    pub total_categories: Option<i64>,
    pub fake_users: i64,
    pub previous_total_users: Option<i64>,
    pub growth: Option<Growth>,
    pub city_series: Vec<CityEntry>,
    pub login_series: Vec<LoginSlice>,
    pub recent_activity: Vec<ActivityItem>,
}

impl DashboardStats {
    pub fn total_users_display(&self) -> String {
        display_count(self.total_users)
    }

    pub fn total_categories_display(&self) -> String {
        display_count(self.total_categories)
    }

    pub fn fake_users_display(&self) -> String {
        filters::format_count(self.fake_users)
    }

    pub fn growth_text(&self) -> String {
        self.growth
            .as_ref()
            .map(|g| g.text.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}

fn display_count(value: Option<i64>) -> String {
    value
        .map(filters::format_count)
        .unwrap_or_else(|| "-".to_string())
}
