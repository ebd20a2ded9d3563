//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Post, SearchResult};

/// Error type for post source operations
#[derive(Debug, Error)]
pub enum PostSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed record at index {index}: {message}")]
    Malformed { index: usize, message: String },
    #[error("Invalid JSON: {0}")]
    Decode(String),
    #[error("Expected a JSON array of records")]
    NotAnArray,
}

/// Port for loading scraped posts
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Load every post, in source order
    async fn load_posts(&self) -> Result<Vec<Post>, PostSourceError>;
}

/// Port for loading web search results (competitor research input)
#[async_trait]
pub trait SearchResultSource: Send + Sync {
    async fn load_results(&self) -> Result<Vec<SearchResult>, PostSourceError>;
}

/// Error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Parquet error: {0}")]
    Parquet(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// File or directory written
    pub path: PathBuf,
    /// Number of post rows written
    pub rows: usize,
}

/// Port for writing a post collection to an external format
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError>;

    /// Short format name (e.g., "csv", "sqlite")
    fn format(&self) -> &'static str;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
