use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::filters;
use crate::form_utils::{deserialize_optional_f64, lenient_f64, lenient_tags, lenient_text};
use crate::services::csv_export::CsvExportable;

/// Tags shown on a category card before the "+N" counter.
pub const PREVIEW_TAG_COUNT: usize = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub provider_share: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub seeker_share: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub discount_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

impl Category {
    pub fn preview_tags(&self) -> &[String] {
        &self.tags[..self.tags.len().min(PREVIEW_TAG_COUNT)]
    }

    pub fn hidden_tag_count(&self) -> usize {
        self.tags.len().saturating_sub(PREVIEW_TAG_COUNT)
    }

    pub fn split_display(&self) -> String {
        match (self.provider_share, self.seeker_share) {
            (Some(p), Some(s)) => format!(
                "{}% / {}%",
                filters::format_share(p),
                filters::format_share(s)
            ),
            _ => "-".to_string(),
        }
    }

    pub fn discount_display(&self) -> String {
        self.discount_percentage
            .map(|d| format!("{}%", filters::format_share(d)))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn created_display(&self) -> String {
        filters::format_date(self.created_at.as_deref().unwrap_or(""))
    }

    pub fn matches(&self, query: &str) -> bool {
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

impl CsvExportable for Category {
    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "tags",
            "provider_share",
            "seeker_share",
            "discount_percentage",
            "image",
            "created_at",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        let number = |v: Option<f64>| v.map(filters::format_share).unwrap_or_default();
        vec![
            self.id.clone().unwrap_or_default(),
            self.name.clone(),
            self.tags.join("|"),
            number(self.provider_share),
            number(self.seeker_share),
            number(self.discount_percentage),
            self.image.clone().unwrap_or_default(),
            self.created_at.clone().unwrap_or_default(),
        ]
    }
}

/// The create-category form. Blank numeric inputs fall back to the
/// backend's defaults (80/20 split, no discount).
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub discount_percentage: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub provider_share: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub seeker_share: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub discount_percentage: f64,
    pub provider_share: f64,
    pub seeker_share: f64,
    pub image_url: Option<String>,
}

impl Default for NewCategory {
    fn default() -> Self {
        Self {
            name: String::new(),
            discount_percentage: 0.0,
            provider_share: 80.0,
            seeker_share: 20.0,
            image_url: None,
        }
    }
}

impl From<NewCategoryForm> for NewCategory {
    fn from(form: NewCategoryForm) -> Self {
        let defaults = Self::default();
        Self {
            name: form.name,
            discount_percentage: form
                .discount_percentage
                .unwrap_or(defaults.discount_percentage),
            provider_share: form.provider_share.unwrap_or(defaults.provider_share),
            seeker_share: form.seeker_share.unwrap_or(defaults.seeker_share),
            image_url: form.image_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Category name is required".into()));
        }
        if self.provider_share < 0.0 || self.seeker_share < 0.0 {
            return Err(AppError::Validation("Shares must be non-negative".into()));
        }
        if (self.provider_share + self.seeker_share - 100.0).abs() > f64::EPSILON {
            return Err(AppError::Validation(
                "Provider + Seeker share must equal 100%".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.discount_percentage) {
            return Err(AppError::Validation(
                "Discount must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_backend_record() {
        let category: Category = serde_json::from_value(json!({
            "id": 4,
            "name": "Yoga",
            "image": null,
            "tags": ["wellness", "fitness"],
            "provider_share": 80.0,
            "seeker_share": "20",
            "discount_percentage": null,
            "created_at": "2025-02-01T09:00:00"
        }))
        .unwrap();
        assert_eq!(category.id.as_deref(), Some("4"));
        assert_eq!(category.split_display(), "80% / 20%");
        assert_eq!(category.discount_display(), "-");
        assert_eq!(category.created_display(), "2/1/2025");
    }

    #[test]
    fn test_tag_preview() {
        let category = Category {
            tags: (1..=9).map(|i| format!("t{}", i)).collect(),
            ..Default::default()
        };
        assert_eq!(category.preview_tags().len(), 6);
        assert_eq!(category.hidden_tag_count(), 3);
    }

    #[test]
    fn test_csv_row_joins_tags() {
        let category = Category {
            id: Some("1".into()),
            name: "Surf \"pro\"".into(),
            tags: vec!["sea".into(), "board".into()],
            provider_share: Some(70.0),
            seeker_share: Some(30.0),
            ..Default::default()
        };
        let row = category.to_row();
        assert_eq!(row[1], "Surf \"pro\"");
        assert_eq!(row[2], "sea|board");
        assert_eq!(row[3], "70");
        assert_eq!(row[5], "");
    }

    #[test]
    fn test_validation() {
        let ok = NewCategory {
            name: "Cooking".into(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let blank = NewCategory::default();
        assert!(blank.validate().is_err());

        let bad_split = NewCategory {
            name: "Cooking".into(),
            provider_share: 70.0,
            seeker_share: 20.0,
            ..Default::default()
        };
        assert!(matches!(bad_split.validate(), Err(AppError::Validation(m)) if m.contains("100%")));

        let bad_discount = NewCategory {
            name: "Cooking".into(),
            discount_percentage: 120.0,
            ..Default::default()
        };
        assert!(bad_discount.validate().is_err());
    }

    #[test]
    fn test_form_defaults() {
        let form: NewCategoryForm =
            serde_urlencoded::from_str("name=Dance&provider_share=&image_url=").unwrap();
        let category = NewCategory::from(form);
        assert_eq!(category.provider_share, 80.0);
        assert_eq!(category.seeker_share, 20.0);
        assert_eq!(category.image_url, None);
    }
}
