//! Display formatting for counts, percentages and backend timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format a count with a comma thousands separator.
pub fn format_count(n: i64) -> String {
    let digits = format_with_thousands(n.unsigned_abs(), ',');
    if n < 0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Format a percentage share such as `80` or `12.5`, without a sign.
pub fn format_share(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Format a backend timestamp as `M/D/YYYY`.
///
/// Accepts RFC 3339, naive ISO datetimes (with or without fractional
/// seconds) and plain dates. Anything else is shown as received; an empty
/// value is shown as `-`.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "-".to_string();
    }

    parse_date(raw)
        .map(|d| d.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn format_with_thousands(n: u64, sep: char) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }

    result
}
