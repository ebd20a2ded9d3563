//! Analysis package: every export format plus a README in one directory

use async_trait::async_trait;
use post_insights_domain::{Clock, ExportError, ExportSummary, Exporter, Post};
use serde_json::Value;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::export_csv::{CsvExporter, DetailedCsvExporter};
use crate::export_parquet::ParquetExporter;
use crate::export_sqlite::SqliteExporter;

const GENERATED_AT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Writes `raw_data.json`, `metrics.csv`, `detailed/`, `data.parquet`,
/// `data.db` and `README.md`
pub struct AnalysisPackage<C> {
    dir: PathBuf,
    clock: C,
    raw_records: Option<Vec<Value>>,
}

impl<C: Clock> AnalysisPackage<C> {
    pub fn new(dir: impl AsRef<Path>, clock: C) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            clock,
            raw_records: None,
        }
    }

    /// Records to store in `raw_data.json` as loaded; without them the
    /// posts are serialized instead
    pub fn with_raw_records(mut self, records: Vec<Value>) -> Self {
        self.raw_records = Some(records);
        self
    }

    fn raw_data(&self, posts: &[Post]) -> Result<String, ExportError> {
        let text = match &self.raw_records {
            Some(records) => serde_json::to_string_pretty(records),
            None => serde_json::to_string_pretty(posts),
        };
        text.map_err(|e| ExportError::Serialization(e.to_string()))
    }

    fn readme(&self, account: &str, posts: usize) -> Result<String, ExportError> {
        let generated = self
            .clock
            .now()
            .format(GENERATED_AT)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
        Ok(format!(
            r#"# Instagram Analysis Package: @{account}

Generated: {generated}
Posts: {posts}

## Files Included

### 1. raw_data.json
- Complete post data as loaded
- Use for: custom analysis, archiving

### 2. metrics.csv
- Flat file with key metrics, one row per post
- Use for: spreadsheets, quick charts
- Columns: post_id, timestamp, type, likes, comments, engagement, caption_length, hashtag_count, is_carousel, url

### 3. detailed/
- posts.csv: all posts with captions
- hashtags.csv: post-hashtag relationships
- comments.csv: exported comments
- Use for: relational analysis, pivot tables

### 4. data.parquet
- Columnar file with typed columns, snappy compressed
- Includes derived fields: engagement, caption_length, hashtag_count, is_carousel, language, day_of_week, hour
- Use for: pandas, polars, DuckDB, Spark

### 5. data.db
- SQLite database with indexed tables
- Tables: posts, hashtags, comments
- Views: post_performance, hashtag_performance

## Quick Start Queries

```sql
-- Top hashtags
SELECT * FROM hashtag_performance LIMIT 10;

-- Best posting times
SELECT strftime('%H', timestamp) AS hour,
       AVG(engagement) AS avg_eng
FROM posts
GROUP BY hour
ORDER BY avg_eng DESC;
```
"#
        ))
    }
}

#[async_trait]
impl<C: Clock> Exporter for AnalysisPackage<C> {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let account = posts
            .first()
            .and_then(|p| p.owner_username.as_deref())
            .unwrap_or("unknown");
        tracing::info!(dir = %self.dir.display(), account, "Creating analysis package");

        tokio::fs::write(self.dir.join("raw_data.json"), self.raw_data(posts)?).await?;

        let exporters: Vec<Box<dyn Exporter>> = vec![
            Box::new(CsvExporter::new(self.dir.join("metrics.csv"))),
            Box::new(DetailedCsvExporter::new(self.dir.join("detailed"))),
            Box::new(ParquetExporter::new(self.dir.join("data.parquet"))),
            Box::new(SqliteExporter::new(self.dir.join("data.db"))),
        ];
        for exporter in &exporters {
            exporter.export(posts).await?;
        }

        tokio::fs::write(self.dir.join("README.md"), self.readme(account, posts.len())?).await?;

        Ok(ExportSummary {
            path: self.dir.clone(),
            rows: posts.len(),
        })
    }

    fn format(&self) -> &'static str {
        "all"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, sample_posts};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_package_contains_every_artifact() {
        let dir = TempDir::new().unwrap();
        let package_dir = dir.path().join("babyshop_uz_analysis_package");

        let summary = AnalysisPackage::new(&package_dir, FixedClock)
            .export(&sample_posts())
            .await
            .unwrap();

        assert_eq!(summary.rows, 2);
        for name in [
            "raw_data.json",
            "metrics.csv",
            "detailed/posts.csv",
            "detailed/hashtags.csv",
            "detailed/comments.csv",
            "data.parquet",
            "data.db",
            "README.md",
        ] {
            assert!(package_dir.join(name).exists(), "missing {}", name);
        }

        let readme = tokio::fs::read_to_string(package_dir.join("README.md"))
            .await
            .unwrap();
        assert!(readme.starts_with("# Instagram Analysis Package: @babyshop_uz\n"));
        assert!(readme.contains("Generated: 2024-06-01 12:00"));
        assert!(readme.contains("### 4. data.parquet"));
    }

    #[tokio::test]
    async fn test_raw_records_are_written_untouched() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            serde_json::json!({"id": "1", "likesCount": -1, "displayUrl": "https://cdn/1.jpg"}),
            serde_json::json!({"id": "2", "videoViewCount": 1200}),
        ];

        AnalysisPackage::new(dir.path(), FixedClock)
            .with_raw_records(records.clone())
            .export(&sample_posts())
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(dir.path().join("raw_data.json"))
            .await
            .unwrap();
        let written: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(written, records);
        assert_eq!(written[0]["likesCount"], -1);
        assert_eq!(written[0]["displayUrl"], "https://cdn/1.jpg");
        assert_eq!(written[1]["videoViewCount"], 1200);
    }

    #[tokio::test]
    async fn test_raw_data_reloads() {
        let dir = TempDir::new().unwrap();

        AnalysisPackage::new(dir.path(), FixedClock)
            .export(&sample_posts())
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(dir.path().join("raw_data.json"))
            .await
            .unwrap();
        let posts: Vec<Post> = serde_json::from_str(&raw).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].latest_comments[0].text, "Narxi, qancha?");
    }
}
