//! SQLite export of posts, hashtags and comments

use async_trait::async_trait;
use post_insights_domain::{DerivedPost, ExportError, ExportSummary, Exporter, Post};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::export_csv::rfc3339;

/// SQLite database holding the relational post tables
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file and ensure the schema exists
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| ExportError::Database(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub async fn in_memory() -> Result<Self, ExportError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| ExportError::Database(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), ExportError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                post_id TEXT PRIMARY KEY,
                shortcode TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                type TEXT NOT NULL,
                caption TEXT NOT NULL,
                likes INTEGER NOT NULL,
                comments INTEGER NOT NULL,
                engagement INTEGER NOT NULL,
                url TEXT NOT NULL,
                is_sponsored INTEGER NOT NULL,
                comments_disabled INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS hashtags (
                post_id TEXT NOT NULL,
                hashtag TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                post_id TEXT NOT NULL,
                comment_id TEXT NOT NULL,
                username TEXT NOT NULL,
                text TEXT NOT NULL,
                timestamp TEXT,
                likes INTEGER NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_posts_timestamp ON posts(timestamp)",
            "CREATE INDEX IF NOT EXISTS idx_posts_engagement ON posts(engagement)",
            "CREATE INDEX IF NOT EXISTS idx_hashtags_tag ON hashtags(hashtag)",
            r#"
            CREATE VIEW IF NOT EXISTS post_performance AS
            SELECT
                DATE(timestamp) AS date,
                COUNT(*) AS posts,
                AVG(likes) AS avg_likes,
                AVG(comments) AS avg_comments,
                AVG(engagement) AS avg_engagement
            FROM posts
            GROUP BY DATE(timestamp)
            "#,
            r#"
            CREATE VIEW IF NOT EXISTS hashtag_performance AS
            SELECT
                h.hashtag,
                COUNT(DISTINCT h.post_id) AS usage_count,
                AVG(p.engagement) AS avg_engagement
            FROM hashtags h
            JOIN posts p ON h.post_id = p.post_id
            GROUP BY h.hashtag
            ORDER BY avg_engagement DESC
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| ExportError::Database(e.to_string()))?;
        }

        Ok(())
    }

    /// Replace the table contents with `posts` in one transaction
    ///
    /// A post whose ID was already written is skipped, so the first occurrence
    /// wins. Returns the number of post rows stored.
    pub async fn write_posts(&self, posts: &[Post]) -> Result<usize, ExportError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ExportError::Database(e.to_string()))?;

        for table in ["comments", "hashtags", "posts"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await
                .map_err(|e| ExportError::Database(e.to_string()))?;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for derived in DerivedPost::derive_all(posts) {
            let post = derived.post;
            if !seen.insert(post.id.as_str()) {
                tracing::warn!(post_id = %post.id, "Skipping duplicate post ID");
                continue;
            }

            sqlx::query(
                r#"
                INSERT INTO posts
                (post_id, shortcode, timestamp, type, caption, likes, comments, engagement,
                 url, is_sponsored, comments_disabled)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&post.id)
            .bind(&post.short_code)
            .bind(rfc3339(post.timestamp)?)
            .bind(&post.post_type)
            .bind(&post.caption)
            .bind(as_i64(post.likes_count))
            .bind(as_i64(post.comments_count))
            .bind(as_i64(derived.engagement))
            .bind(&post.url)
            .bind(post.is_sponsored)
            .bind(post.is_comments_disabled)
            .execute(&mut *tx)
            .await
            .map_err(|e| ExportError::Database(e.to_string()))?;

            for tag in &derived.hashtags {
                sqlx::query("INSERT INTO hashtags (post_id, hashtag) VALUES (?, ?)")
                    .bind(&post.id)
                    .bind(*tag)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| ExportError::Database(e.to_string()))?;
            }

            for comment in &post.latest_comments {
                let timestamp = comment.timestamp.map(rfc3339).transpose()?;
                sqlx::query(
                    r#"
                    INSERT INTO comments (post_id, comment_id, username, text, timestamp, likes)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&post.id)
                .bind(&comment.id)
                .bind(&comment.owner_username)
                .bind(&comment.text)
                .bind(timestamp)
                .bind(as_i64(comment.likes_count))
                .execute(&mut *tx)
                .await
                .map_err(|e| ExportError::Database(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| ExportError::Database(e.to_string()))?;

        Ok(seen.len())
    }

    pub async fn count(&self, table: &str) -> Result<i64, ExportError> {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExportError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Rows of the `hashtag_performance` view, best first
    pub async fn hashtag_performance(&self) -> Result<Vec<(String, i64, f64)>, ExportError> {
        sqlx::query_as("SELECT hashtag, usage_count, avg_engagement FROM hashtag_performance")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExportError::Database(e.to_string()))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn as_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Exports posts to a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteExporter {
    path: PathBuf,
}

impl SqliteExporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Exporter for SqliteExporter {
    async fn export(&self, posts: &[Post]) -> Result<ExportSummary, ExportError> {
        let db = SqliteDatabase::open(&self.path).await?;
        let rows = db.write_posts(posts).await?;
        db.close().await;

        tracing::info!(path = %self.path.display(), rows, "Exported SQLite database");

        Ok(ExportSummary {
            path: self.path.clone(),
            rows,
        })
    }

    fn format(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_posts;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_posts_fills_tables() {
        let db = SqliteDatabase::in_memory().await.unwrap();

        let rows = db.write_posts(&sample_posts()).await.unwrap();

        assert_eq!(rows, 2);
        assert_eq!(db.count("posts").await.unwrap(), 2);
        assert_eq!(db.count("hashtags").await.unwrap(), 1);
        assert_eq!(db.count("comments").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_hashtag_performance_view() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.write_posts(&sample_posts()).await.unwrap();

        let rows = db.hashtag_performance().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "baby");
        assert_eq!(rows[0].1, 1);
        assert!((rows[0].2 - 22.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_stored_once() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let mut posts = sample_posts();
        let mut again = posts[0].clone();
        again.likes_count = 999;
        posts.push(again);

        let rows = db.write_posts(&posts).await.unwrap();

        assert_eq!(rows, 2);
        assert_eq!(db.count("posts").await.unwrap(), 2);
        assert_eq!(db.count("hashtags").await.unwrap(), 1);
        let likes: (i64,) = sqlx::query_as("SELECT likes FROM posts WHERE post_id = '1'")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(likes.0, 20);
    }

    #[tokio::test]
    async fn test_rewrite_replaces_contents() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.write_posts(&sample_posts()).await.unwrap();

        db.write_posts(&sample_posts()[..1]).await.unwrap();

        assert_eq!(db.count("posts").await.unwrap(), 1);
        assert_eq!(db.count("comments").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exporter_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.db");

        let summary = SqliteExporter::new(&path)
            .export(&sample_posts())
            .await
            .unwrap();

        assert_eq!(summary.rows, 2);
        assert!(path.exists());
    }
}
