//! Chart-ready series derived from [`DashboardStats`](crate::models::DashboardStats).
//!
//! Bars and pie slices carry precomputed widths, percentages and colours so
//! templates only print fields.

use serde::Serialize;

use crate::models::{CityEntry, LoginSlice};

pub const PALETTE: [&str; 5] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];
pub const PROVIDER_COLOR: &str = "#3b82f6";
pub const SEEKER_COLOR: &str = "#10b981";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CitySeriesMode {
    /// Provider and seeker bars stacked per city.
    Stacked,
    Single,
}

impl CitySeriesMode {
    /// `Stacked` as soon as one entry carries a role split.
    pub fn of(series: &[CityEntry]) -> Self {
        if series.iter().any(CityEntry::is_split) {
            Self::Stacked
        } else {
            Self::Single
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub name: String,
    pub provider: i64,
    pub seeker: i64,
    pub total: i64,
    /// Widths relative to the largest bar, as CSS percentages.
    pub provider_width: String,
    pub seeker_width: String,
    pub total_width: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub mode: CitySeriesMode,
    pub max: i64,
    pub rows: Vec<BarRow>,
}

impl BarChart {
    pub fn is_stacked(&self) -> bool {
        self.mode == CitySeriesMode::Stacked
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn bar_chart(series: &[CityEntry]) -> BarChart {
    let mode = CitySeriesMode::of(series);
    let max = series.iter().map(CityEntry::total).max().unwrap_or(0);

    let rows = series
        .iter()
        .map(|entry| {
            // Count entries stack as provider-only bars.
            let (provider, seeker) = match entry {
                CityEntry::Split {
                    provider, seeker, ..
                } => (*provider, *seeker),
                CityEntry::Count { count, .. } => (*count, 0),
            };
            let total = provider.saturating_add(seeker);
            BarRow {
                name: entry.name().to_string(),
                provider,
                seeker,
                total,
                provider_width: width(provider, max),
                seeker_width: width(seeker, max),
                total_width: width(total, max),
            }
        })
        .collect();

    BarChart { mode, max, rows }
}

fn width(value: i64, max: i64) -> String {
    if max <= 0 {
        return "0%".to_string();
    }
    let pct = value as f64 / max as f64 * 100.0;
    format!("{:.1}%", pct.clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: i64,
    pub percent: i64,
    pub color: &'static str,
    pub start_deg: f64,
    pub end_deg: f64,
}

/// Slices with whole-number percentages of the series total.
///
/// An all-zero series divides by 100 instead, so every slice reads 0%.
pub fn pie_chart(series: &[LoginSlice]) -> Vec<PieSlice> {
    let sum: f64 = series.iter().map(|s| s.value as f64).sum();
    let denom = if sum == 0.0 { 100.0 } else { sum };

    let mut cursor = 0.0;
    series
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let share = slice.value as f64 / denom;
            let start_deg = cursor;
            cursor += share * 360.0;
            PieSlice {
                label: slice.label.to_string(),
                value: slice.value,
                percent: (share * 100.0).round() as i64,
                color: PALETTE[i % PALETTE.len()],
                start_deg,
                end_deg: cursor,
            }
        })
        .collect()
}

/// `conic-gradient(...)` background for a pie, grey when there is nothing to show.
pub fn conic_gradient(slices: &[PieSlice]) -> String {
    let stops: Vec<String> = slices
        .iter()
        .filter(|s| s.end_deg > s.start_deg)
        .map(|s| format!("{} {:.2}deg {:.2}deg", s.color, s.start_deg, s.end_deg))
        .collect();

    if stops.is_empty() {
        "conic-gradient(#e5e7eb 0deg 360deg)".to_string()
    } else {
        format!("conic-gradient({})", stops.join(", "))
    }
}
