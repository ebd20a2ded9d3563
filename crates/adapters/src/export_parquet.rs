//! Parquet export: one row per post with the derived metrics as typed columns

use arrow_array::{
    ArrayRef, BooleanArray, RecordBatch, StringArray, TimestampMillisecondArray, UInt8Array,
    UInt64Array,
};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use async_trait::async_trait;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use post_insights_domain::{DerivedPost, ExportError, ExportSummary, Exporter, Post};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::export_csv::ensure_parent;

const TIMEZONE: &str = "UTC";

fn schema() -> Schema {
    Schema::new(vec![
        Field::new("post_id", DataType::Utf8, false),
        Field::new("shortcode", DataType::Utf8, false),
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Millisecond, Some(TIMEZONE.into())),
            false,
        ),
        Field::new("type", DataType::Utf8, false),
        Field::new("caption", DataType::Utf8, false),
        Field::new("likes", DataType::UInt64, false),
        Field::new("comments", DataType::UInt64, false),
        Field::new("engagement", DataType::UInt64, false),
        Field::new("caption_length", DataType::UInt64, false),
        Field::new("hashtag_count", DataType::UInt64, false),
        Field::new("is_carousel", DataType::Boolean, false),
        Field::new("url", DataType::Utf8, false),
        Field::new("owner_username", DataType::Utf8, true),
        Field::new("language", DataType::Utf8, false),
        Field::new("day_of_week", DataType::Utf8, false),
        Field::new("hour", DataType::UInt8, false),
    ])
}

fn parquet_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Parquet(e.to_string())
}

fn strings<'a>(derived: &[DerivedPost<'a>], f: impl Fn(&DerivedPost<'a>) -> String) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(derived.iter().map(f)))
}

fn counts<'a>(derived: &[DerivedPost<'a>], f: impl Fn(&DerivedPost<'a>) -> u64) -> ArrayRef {
    Arc::new(UInt64Array::from_iter_values(derived.iter().map(f)))
}

/// Build the record batch for `posts`, in input order
fn record_batch(posts: &[Post]) -> Result<RecordBatch, ExportError> {
    let derived = DerivedPost::derive_all(posts);

    let millis: Vec<i64> = derived
        .iter()
        .map(|d| (d.post.timestamp.unix_timestamp_nanos() / 1_000_000) as i64)
        .collect();
    let carousel: Vec<bool> = derived.iter().map(|d| d.is_carousel).collect();
    let owners: Vec<Option<&str>> = derived
        .iter()
        .map(|d| d.post.owner_username.as_deref())
        .collect();

    let columns: Vec<ArrayRef> = vec![
        strings(&derived, |d| d.post.id.clone()),
        strings(&derived, |d| d.post.short_code.clone()),
        Arc::new(TimestampMillisecondArray::from(millis).with_timezone(TIMEZONE)),
        strings(&derived, |d| d.post.post_type.clone()),
        strings(&derived, |d| d.post.caption.clone()),
        counts(&derived, |d| d.post.likes_count),
        counts(&derived, |d| d.post.comments_count),
        counts(&derived, |d| d.engagement),
        counts(&derived, |d| d.caption_length as u64),
        counts(&derived, |d| d.hashtags.len() as u64),
        Arc::new(BooleanArray::from(carousel)),
        strings(&derived, |d| d.post.url.clone()),
        Arc::new(StringArray::from(owners)),
        strings(&derived, |d| d.script.to_string()),
        strings(&derived, |d| d.weekday.to_string()),
        Arc::new(UInt8Array::from_iter_values(derived.iter().map(|d| d.hour))),
    ];

    RecordBatch::try_new(Arc::new(schema()), columns).map_err(parquet_error)
}

/// Snappy-compressed Parquet file with one row per post
#[derive(Debug, Clone)]
pub struct ParquetExporter {
    path: PathBuf,
}

impl ParquetExporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Exporter for ParquetExporter {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError> {
        let batch = record_batch(posts)?;
        let rows = batch.num_rows();

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut buffer = Vec::new();
        let mut writer =
            ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props)).map_err(parquet_error)?;
        writer.write(&batch).map_err(parquet_error)?;
        writer.close().map_err(parquet_error)?;

        ensure_parent(&self.path).await?;
        tokio::fs::write(&self.path, buffer).await?;
        tracing::info!(path = %self.path.display(), rows, "Exported Parquet file");

        Ok(ExportSummary {
            path: self.path.clone(),
            rows,
        })
    }

    fn format(&self) -> &'static str {
        "parquet"
    }
}
