//! post-insights adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `source`: JSON file sources for posts and search results
//! - `export`: CSV, Parquet, SQLite and analysis-package exporters
//! - `report_fs`: report file writer (whole or chunked)

mod export_csv;
mod export_parquet;
mod export_sqlite;
mod json_source;
mod package;
pub mod report_fs;

/// Re-exports for source adapters
pub mod source {
    pub use crate::json_source::{
        JsonPostSource, JsonSearchResultSource, decode_records, decode_with_raw,
    };
}

/// Re-exports for export adapters
pub mod export {
    pub use crate::export_csv::{CsvExporter, DetailedCsvExporter, SummaryCsvExporter};
    pub use crate::export_parquet::ParquetExporter;
    pub use crate::export_sqlite::{SqliteDatabase, SqliteExporter};
    pub use crate::package::AnalysisPackage;
}
