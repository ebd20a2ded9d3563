//! CSV exporters: flat metrics, relational detail tables, analysis summary

use async_trait::async_trait;
use post_insights_domain::{DerivedPost, ExportError, ExportSummary, Exporter, Post};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Rows are buffered in memory and written with a single async write
struct CsvTable {
    writer: csv::Writer<Vec<u8>>,
    rows: usize,
}

impl CsvTable {
    fn new(headers: &[&str]) -> Result<Self, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(headers).map_err(csv_error)?;
        Ok(Self { writer, rows: 0 })
    }

    fn row<I, S>(&mut self, record: I) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.writer.write_record(record).map_err(csv_error)?;
        self.rows += 1;
        Ok(())
    }

    async fn save(self, path: &Path) -> Result<usize, ExportError> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.to_string()))?;
        ensure_parent(path).await?;
        tokio::fs::write(path, bytes).await?;
        tracing::debug!(path = %path.display(), rows = self.rows, "CSV written");
        Ok(self.rows)
    }
}

fn csv_error(e: csv::Error) -> ExportError {
    ExportError::Csv(e.to_string())
}

pub(crate) async fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

pub(crate) fn rfc3339(ts: OffsetDateTime) -> Result<String, ExportError> {
    ts.format(&Rfc3339)
        .map_err(|e| ExportError::Serialization(e.to_string()))
}

/// One row per post with the derived metrics
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Exporter for CsvExporter {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError> {
        let mut table = CsvTable::new(&[
            "post_id",
            "timestamp",
            "type",
            "likes",
            "comments",
            "engagement",
            "caption_length",
            "hashtag_count",
            "is_carousel",
            "url",
        ])?;

        for derived in DerivedPost::derive_all(posts) {
            let post = derived.post;
            table.row([
                post.id.clone(),
                rfc3339(post.timestamp)?,
                post.post_type.clone(),
                post.likes_count.to_string(),
                post.comments_count.to_string(),
                derived.engagement.to_string(),
                derived.caption_length.to_string(),
                derived.hashtags.len().to_string(),
                derived.is_carousel.to_string(),
                post.url.clone(),
            ])?;
        }

        let rows = table.save(&self.path).await?;
        tracing::info!(path = %self.path.display(), rows, "Exported metrics CSV");

        Ok(ExportSummary {
            path: self.path.clone(),
            rows,
        })
    }

    fn format(&self) -> &'static str {
        "csv"
    }
}

/// Relational tables in a directory: `posts.csv`, `hashtags.csv`, `comments.csv`
#[derive(Debug, Clone)]
pub struct DetailedCsvExporter {
    dir: PathBuf,
}

impl DetailedCsvExporter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Exporter for DetailedCsvExporter {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError> {
        let mut post_rows = CsvTable::new(&[
            "post_id",
            "shortcode",
            "timestamp",
            "type",
            "caption",
            "likes",
            "comments",
            "url",
            "is_sponsored",
            "comments_disabled",
        ])?;
        let mut hashtag_rows = CsvTable::new(&["post_id", "hashtag"])?;
        let mut comment_rows = CsvTable::new(&[
            "post_id",
            "comment_id",
            "username",
            "text",
            "timestamp",
            "likes",
        ])?;

        for post in posts {
            post_rows.row([
                post.id.clone(),
                post.short_code.clone(),
                rfc3339(post.timestamp)?,
                post.post_type.clone(),
                post.caption.clone(),
                post.likes_count.to_string(),
                post.comments_count.to_string(),
                post.url.clone(),
                post.is_sponsored.to_string(),
                post.is_comments_disabled.to_string(),
            ])?;

            for tag in post.unique_hashtags() {
                hashtag_rows.row([post.id.as_str(), tag])?;
            }

            for comment in &post.latest_comments {
                let timestamp = match comment.timestamp {
                    Some(ts) => rfc3339(ts)?,
                    None => String::new(),
                };
                comment_rows.row([
                    post.id.clone(),
                    comment.id.clone(),
                    comment.owner_username.clone(),
                    comment.text.clone(),
                    timestamp,
                    comment.likes_count.to_string(),
                ])?;
            }
        }

        let rows = post_rows.save(&self.dir.join("posts.csv")).await?;
        let hashtags = hashtag_rows.save(&self.dir.join("hashtags.csv")).await?;
        let comments = comment_rows.save(&self.dir.join("comments.csv")).await?;

        tracing::info!(
            dir = %self.dir.display(),
            posts = rows,
            hashtags,
            comments,
            "Exported detailed CSVs"
        );

        Ok(ExportSummary {
            path: self.dir.clone(),
            rows,
        })
    }

    fn format(&self) -> &'static str {
        "detailed"
    }
}

/// Per-post summary written next to an analysis report
#[derive(Debug, Clone)]
pub struct SummaryCsvExporter {
    path: PathBuf,
}

impl SummaryCsvExporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Exporter for SummaryCsvExporter {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError> {
        let mut table = CsvTable::new(&[
            "timestamp",
            "type",
            "likesCount",
            "commentsCount",
            "engagement",
            "caption_length",
            "language",
            "day_of_week",
            "hour",
        ])?;

        for derived in DerivedPost::derive_all(posts) {
            let post = derived.post;
            table.row([
                rfc3339(post.timestamp)?,
                post.post_type.clone(),
                post.likes_count.to_string(),
                post.comments_count.to_string(),
                derived.engagement.to_string(),
                derived.caption_length.to_string(),
                derived.script.to_string(),
                derived.weekday.to_string(),
                derived.hour.to_string(),
            ])?;
        }

        let rows = table.save(&self.path).await?;
        tracing::info!(path = %self.path.display(), rows, "Exported analysis summary CSV");

        Ok(ExportSummary {
            path: self.path.clone(),
            rows,
        })
    }

    fn format(&self) -> &'static str {
        "summary-csv"
    }
}
