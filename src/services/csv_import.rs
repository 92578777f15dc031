use crate::error::AppError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

/// Upper bound the backend enforces on one upload.
pub const MAX_IMPORT_ROWS: usize = 5000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Outcome of checking a fake-user CSV before it is forwarded.
#[derive(Debug, Default)]
pub struct ImportCheck {
    pub rows: usize,
    /// Rows the backend will skip; reported but not fatal.
    pub warnings: Vec<String>,
}

impl ImportCheck {
    pub fn summary(&self) -> String {
        if self.warnings.is_empty() {
            format!("{} rows checked", self.rows)
        } else {
            format!(
                "{} rows checked; {}",
                self.rows,
                self.warnings.join("; ")
            )
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate an uploaded fake-user CSV.
///
/// The file must be UTF-8 with a header row and between 1 and
/// [`MAX_IMPORT_ROWS`] data rows. Malformed emails reject the upload;
/// repeated emails only produce warnings since the backend skips them.
pub fn check_fake_user_csv(content: &[u8]) -> Result<ImportCheck, AppError> {
    trace!(content_size = content.len(), "Checking fake user CSV");

    let content_str =
        std::str::from_utf8(content).map_err(|e| AppError::CsvParse(e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content_str.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::CsvParse("CSV file has no header row".into()));
    }

    let email_col = find_column(&headers, "email");
    debug!(
        column_count = headers.len(),
        has_email = email_col.is_some(),
        "CSV headers parsed"
    );

    let mut check = ImportCheck::default();
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;
        check.rows += 1;
        if check.rows > MAX_IMPORT_ROWS {
            return Err(AppError::Validation(format!(
                "Too many rows in CSV (limit {})",
                MAX_IMPORT_ROWS
            )));
        }

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let Some(email) = email_col
            .and_then(|col| record.get(col))
            .filter(|s| !s.is_empty())
        else {
            continue;
        };

        if !is_valid_email(email) {
            errors.push(format!("Row {}: invalid email '{}'", row_number, email));
        } else if !seen.insert(email.to_lowercase()) {
            check
                .warnings
                .push(format!("Row {}: duplicate email {}", row_number, email));
        }
    }

    if check.rows == 0 {
        return Err(AppError::Validation("CSV file contains no data rows".into()));
    }
    if !errors.is_empty() {
        warn!(error_count = errors.len(), "Rejecting fake user CSV");
        return Err(AppError::Validation(errors.join("; ")));
    }

    debug!(
        rows = check.rows,
        duplicates = check.warnings.len(),
        "Fake user CSV accepted"
    );
    Ok(check)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}
