//! JSON file sources for scraped posts and search results

use async_trait::async_trait;
use post_insights_domain::{Post, PostSource, PostSourceError, SearchResult, SearchResultSource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Decode a JSON array, reporting the index of the first bad record
pub fn decode_records<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, PostSourceError> {
    decode_with_raw(text).map(|(records, _)| records)
}

/// Like [`decode_records`], also returning each record untouched
pub fn decode_with_raw<T: DeserializeOwned>(
    text: &str,
) -> Result<(Vec<T>, Vec<Value>), PostSourceError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PostSourceError::Decode(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(PostSourceError::NotAnArray);
    };

    let records = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).map_err(|e| PostSourceError::Malformed {
                index,
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<T>, _>>()?;

    Ok((records, items))
}

async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PostSourceError> {
    let text = tokio::fs::read_to_string(path).await?;
    decode_records(&text)
}

/// Posts exported by the Instagram scraper as one JSON array
#[derive(Debug, Clone)]
pub struct JsonPostSource {
    path: PathBuf,
}

impl JsonPostSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load posts together with the records exactly as they appear in the file
    pub async fn load_with_raw(&self) -> Result<(Vec<Post>, Vec<Value>), PostSourceError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let (posts, raw) = decode_with_raw::<Post>(&text)?;
        tracing::info!(path = %self.path.display(), posts = posts.len(), "Loaded posts");
        Ok((posts, raw))
    }
}

#[async_trait]
impl PostSource for JsonPostSource {
    async fn load_posts(&self) -> Result<Vec<Post>, PostSourceError> {
        let posts: Vec<Post> = read_records(&self.path).await?;
        tracing::info!(path = %self.path.display(), posts = posts.len(), "Loaded posts");
        Ok(posts)
    }
}

/// Web search results (`[{"url": ..., "text": ...}]`)
#[derive(Debug, Clone)]
pub struct JsonSearchResultSource {
    path: PathBuf,
}

impl JsonSearchResultSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SearchResultSource for JsonSearchResultSource {
    async fn load_results(&self) -> Result<Vec<SearchResult>, PostSourceError> {
        let results: Vec<SearchResult> = read_records(&self.path).await?;
        tracing::info!(path = %self.path.display(), results = results.len(), "Loaded search results");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POSTS: &str = r#"[
        {
            "id": "1", "type": "Image", "caption": "Hello #baby",
            "hashtags": ["baby"], "likesCount": 20, "commentsCount": 2,
            "timestamp": "2024-03-04T10:00:00.000Z",
            "url": "https://www.instagram.com/p/A1/", "shortCode": "A1",
            "ownerUsername": "babyshop_uz"
        },
        {
            "id": "2", "type": "Sidecar", "caption": "",
            "likesCount": -1, "commentsCount": 0,
            "timestamp": "2024-03-05T18:30:00+05:00",
            "url": "https://www.instagram.com/p/B2/", "shortCode": "B2",
            "childPosts": [{}, {}]
        }
    ]"#;

    #[tokio::test]
    async fn test_load_posts_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        tokio::fs::write(&path, POSTS).await.unwrap();

        let posts = JsonPostSource::new(&path).load_posts().await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].hashtags, vec!["baby"]);
        assert_eq!(posts[1].likes_count, 0);
        assert_eq!(posts[1].child_posts.len(), 2);
    }

    #[test]
    fn test_malformed_record_reports_index() {
        let text = r#"[
            {"id": "1", "type": "Image", "caption": "", "likesCount": 1, "commentsCount": 0,
             "timestamp": "2024-03-04T10:00:00Z", "url": "u", "shortCode": "s"},
            {"id": "2", "type": "Image", "caption": ""}
        ]"#;

        let err = decode_records::<Post>(text).unwrap_err();

        assert!(matches!(err, PostSourceError::Malformed { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_load_with_raw_keeps_records_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.json");
        tokio::fs::write(&path, POSTS).await.unwrap();

        let (posts, raw) = JsonPostSource::new(&path).load_with_raw().await.unwrap();

        assert_eq!(posts.len(), raw.len());
        assert_eq!(posts[1].likes_count, 0);
        assert_eq!(raw[1]["likesCount"], -1);
        assert_eq!(raw[0]["ownerUsername"], "babyshop_uz");
    }

    #[test]
    fn test_top_level_must_be_array() {
        assert!(matches!(
            decode_records::<Post>(r#"{"id": "1"}"#),
            Err(PostSourceError::NotAnArray)
        ));
        assert!(matches!(
            decode_records::<Post>("not json"),
            Err(PostSourceError::Decode(_))
        ));
    }

    #[test]
    fn test_empty_array_is_ok() {
        let posts = decode_records::<Post>("[]").unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonPostSource::new(dir.path().join("missing.json"));

        assert!(matches!(
            source.load_posts().await,
            Err(PostSourceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_load_search_results_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        tokio::fs::write(&path, r#"[{"url": "https://a.uz", "text": "45K подписчиков"}, {"url": "b"}]"#)
            .await
            .unwrap();

        let results = JsonSearchResultSource::new(&path)
            .load_results()
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "45K подписчиков");
        assert_eq!(results[1].text, "");
    }
}
