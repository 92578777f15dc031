pub mod admin_api;
pub mod charts;
pub mod csv_export;
pub mod csv_import;
pub mod dashboard_stats;
pub mod json_lookup;
pub mod view_tracker;
