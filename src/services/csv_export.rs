//! CSV downloads for the listing pages.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};

/// A record that can be written as one CSV row.
pub trait CsvExportable {
    fn headers() -> &'static [&'static str];
    fn to_row(&self) -> Vec<String>;
}

/// Header row plus one row per record, every field quoted.
pub fn to_csv<T: CsvExportable>(records: &[T]) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(T::headers())
        .map_err(|e| AppError::Internal(format!("Failed to write CSV: {}", e)))?;
    for record in records {
        writer
            .write_record(record.to_row())
            .map_err(|e| AppError::Internal(format!("Failed to write CSV: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

/// `users_2025-01-31.csv` style name for a dated export.
pub fn dated_filename(entity: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", entity, date.format("%Y-%m-%d"))
}

/// A CSV body served as a file download.
pub struct CsvDownload {
    pub filename: String,
    pub body: String,
}

impl CsvDownload {
    pub fn build<T: CsvExportable>(filename: impl Into<String>, records: &[T]) -> AppResult<Self> {
        Ok(Self {
            filename: filename.into(),
            body: to_csv(records)?,
        })
    }
}

impl IntoResponse for CsvDownload {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}
