use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::filters;
use crate::form_utils::{deserialize_checkbox, deserialize_optional_f64};
use crate::services::json_lookup::{as_number, first_present, lookup, payload_root, KeyPath};

const SETTINGS_PATHS: &[KeyPath] = &[&["settings"], &["admin_config"]];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueSplit {
    pub provider: f64,
    pub seeker: f64,
    pub platform: f64,
}

impl Default for RevenueSplit {
    fn default() -> Self {
        Self {
            provider: 80.0,
            seeker: 20.0,
            platform: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Discounts {
    pub global_discount: f64,
    pub category_wise: bool,
    pub seasonal: bool,
}

/// Revenue split and discount configuration stored by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminSettings {
    pub revenue_split: RevenueSplit,
    pub discounts: Discounts,
}

/// Segment widths for the split preview bar, always summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitBar {
    pub provider: i64,
    pub seeker: i64,
    pub platform: i64,
}

impl AdminSettings {
    /// Read settings from a `/admin/settings` payload; anything missing keeps
    /// the backend's defaults.
    pub fn from_payload(raw: &Value) -> Self {
        let data = payload_root(raw);
        let settings = first_present(data, SETTINGS_PATHS).unwrap_or(data);
        let defaults = Self::default();

        let number = |path: &[&str], fallback: f64| {
            lookup(settings, path).and_then(as_number).unwrap_or(fallback)
        };
        let flag = |path: &[&str]| {
            lookup(settings, path)
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };

        Self {
            revenue_split: RevenueSplit {
                provider: number(&["revenue_split", "provider"], defaults.revenue_split.provider),
                seeker: number(&["revenue_split", "seeker"], defaults.revenue_split.seeker),
                platform: number(&["revenue_split", "platform"], defaults.revenue_split.platform),
            },
            discounts: Discounts {
                global_discount: number(&["discounts", "global_discount"], 0.0),
                category_wise: flag(&["discounts", "category_wise"]),
                seasonal: flag(&["discounts", "seasonal"]),
            },
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let split = &self.revenue_split;
        for (name, value) in [
            ("Provider", split.provider),
            ("Seeker", split.seeker),
            ("Platform", split.platform),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(AppError::Validation(format!(
                    "{} share must be between 0 and 100",
                    name
                )));
            }
        }
        if split.provider + split.seeker + split.platform > 100.0 {
            return Err(AppError::Validation(
                "Sum of Provider + Seeker + Platform must not exceed 100%".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.discounts.global_discount) {
            return Err(AppError::Validation(
                "Global discount must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }

    pub fn split_bar(&self) -> SplitBar {
        let RevenueSplit {
            provider,
            seeker,
            platform,
        } = self.revenue_split;
        let sum = provider + seeker + platform;
        let total = if sum == 0.0 { 100.0 } else { sum };
        let p = (provider / total * 100.0).round() as i64;
        let s = (seeker / total * 100.0).round() as i64;
        SplitBar {
            provider: p,
            seeker: s,
            platform: 100 - p - s,
        }
    }

    pub fn split_label(&self) -> String {
        let split = &self.revenue_split;
        format!(
            "{}% / {}% / {}%",
            filters::format_share(split.provider),
            filters::format_share(split.seeker),
            filters::format_share(split.platform)
        )
    }
}

/// The settings form. Blank numbers count as 0; unticked boxes are absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsForm {
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub provider: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub seeker: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub platform: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub global_discount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub category_wise: bool,
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub seasonal: bool,
}

impl From<SettingsForm> for AdminSettings {
    fn from(form: SettingsForm) -> Self {
        Self {
            revenue_split: RevenueSplit {
                provider: form.provider.unwrap_or(0.0),
                seeker: form.seeker.unwrap_or(0.0),
                platform: form.platform.unwrap_or(0.0),
            },
            discounts: Discounts {
                global_discount: form.global_discount.unwrap_or(0.0),
                category_wise: form.category_wise,
                seasonal: form.seasonal,
            },
        }
    }
}
