//! Domain models and value objects

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use time::{Month, OffsetDateTime, Weekday};

/// A scraped post as produced by the platform export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Platform-specific post ID
    pub id: String,
    /// When the post was published, in the offset it was exported with
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Media type as reported by the platform (Image, Video, Sidecar, ...)
    #[serde(rename = "type")]
    pub post_type: String,
    /// Caption text, possibly empty
    pub caption: String,
    #[serde(deserialize_with = "clamped_count")]
    pub likes_count: u64,
    #[serde(deserialize_with = "clamped_count")]
    pub comments_count: u64,
    /// Hashtags as listed by the export; may contain duplicates
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Child media of a carousel post
    #[serde(default)]
    pub child_posts: Vec<serde_json::Value>,
    /// The most recent comments included in the export
    #[serde(default)]
    pub latest_comments: Vec<Comment>,
    #[serde(default)]
    pub is_sponsored: bool,
    #[serde(default)]
    pub is_comments_disabled: bool,
    /// Permalink to the post
    pub url: String,
    pub short_code: String,
    #[serde(default)]
    pub owner_username: Option<String>,
    #[serde(default)]
    pub owner_full_name: Option<String>,
}

impl Post {
    /// Hashtags with per-post duplicates removed, in listed order
    pub fn unique_hashtags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.hashtags
            .iter()
            .map(String::as_str)
            .filter(|tag| seen.insert(*tag))
            .collect()
    }
}

/// A comment nested in a post export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub owner_username: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "clamped_count")]
    pub likes_count: u64,
}

/// Hidden metrics are exported as negative numbers; treat them as zero.
fn clamped_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value.max(0) as u64)
}

/// Dominant script of a caption, by Cyrillic vs Latin letter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptLabel {
    CyrillicDominant,
    LatinDominant,
    Mixed,
    Unknown,
}

impl ScriptLabel {
    /// Classify a caption by counting letter codepoints.
    ///
    /// This is a coarse heuristic, not language identification: short or
    /// emoji-only captions are easily misclassified.
    pub fn classify(text: &str) -> Self {
        if text.is_empty() {
            return ScriptLabel::Unknown;
        }

        let mut cyrillic = 0usize;
        let mut latin = 0usize;
        for c in text.chars() {
            if is_cyrillic_letter(c) {
                cyrillic += 1;
            } else if is_latin_letter(c) {
                latin += 1;
            }
        }

        match cyrillic.cmp(&latin) {
            std::cmp::Ordering::Greater => ScriptLabel::CyrillicDominant,
            std::cmp::Ordering::Less => ScriptLabel::LatinDominant,
            std::cmp::Ordering::Equal if cyrillic > 0 => ScriptLabel::Mixed,
            std::cmp::Ordering::Equal => ScriptLabel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptLabel::CyrillicDominant => "cyrillic-dominant",
            ScriptLabel::LatinDominant => "latin-dominant",
            ScriptLabel::Mixed => "mixed",
            ScriptLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScriptLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{052F}') && c.is_alphabetic()
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (matches!(c, '\u{00C0}'..='\u{024F}') && c.is_alphabetic())
}

/// Caption length category, half-open on the upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBucket {
    /// 0..500 characters
    Short,
    /// 500..1000 characters
    Medium,
    /// 1000..2000 characters
    Long,
    /// 2000..5000 characters
    VeryLong,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 4] = [
        LengthBucket::Short,
        LengthBucket::Medium,
        LengthBucket::Long,
        LengthBucket::VeryLong,
    ];

    /// Bucket for a caption length; captions of 5000+ characters fall outside every bucket
    pub fn for_length(length: usize) -> Option<Self> {
        match length {
            0..500 => Some(LengthBucket::Short),
            500..1000 => Some(LengthBucket::Medium),
            1000..2000 => Some(LengthBucket::Long),
            2000..5000 => Some(LengthBucket::VeryLong),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LengthBucket::Short => "Short",
            LengthBucket::Medium => "Medium",
            LengthBucket::Long => "Long",
            LengthBucket::VeryLong => "Very Long",
        }
    }
}

impl fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-post fields computed once from an immutable [`Post`]
#[derive(Debug, Clone)]
pub struct DerivedPost<'a> {
    pub post: &'a Post,
    /// Likes plus comments
    pub engagement: u64,
    /// Caption length in Unicode scalar values
    pub caption_length: usize,
    /// Hashtags after per-post deduplication
    pub hashtags: Vec<&'a str>,
    pub is_carousel: bool,
    pub script: ScriptLabel,
    pub hour: u8,
    pub weekday: Weekday,
    pub month: Month,
}

impl<'a> DerivedPost<'a> {
    pub fn derive(post: &'a Post) -> Self {
        Self {
            post,
            engagement: post.likes_count.saturating_add(post.comments_count),
            caption_length: post.caption.chars().count(),
            hashtags: post.unique_hashtags(),
            is_carousel: !post.child_posts.is_empty(),
            script: ScriptLabel::classify(&post.caption),
            hour: post.timestamp.hour(),
            weekday: post.timestamp.weekday(),
            month: post.timestamp.month(),
        }
    }

    pub fn derive_all(posts: &'a [Post]) -> Vec<Self> {
        posts.iter().map(DerivedPost::derive).collect()
    }
}

/// Sum of counts, pinned at `u64::MAX` instead of overflowing
pub(crate) fn saturating_total(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

/// A scraped web search result used for competitor research
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use time::macros::datetime;

    /// A post with sensible defaults; tests override the fields they care about
    pub fn post(id: &str, likes: u64, comments: u64) -> Post {
        Post {
            id: id.to_string(),
            timestamp: datetime!(2024-03-04 10:00 +5),
            post_type: "Image".to_string(),
            caption: String::new(),
            likes_count: likes,
            comments_count: comments,
            hashtags: vec![],
            child_posts: vec![],
            latest_comments: vec![],
            is_sponsored: false,
            is_comments_disabled: false,
            url: format!("https://www.instagram.com/p/{}/", id),
            short_code: id.to_string(),
            owner_username: Some("babyshop_uz".to_string()),
            owner_full_name: Some("Baby Shop".to_string()),
        }
    }

    pub fn comment(text: &str) -> Comment {
        Comment {
            id: format!("c-{}", text.len()),
            owner_username: "follower".to_string(),
            text: text.to_string(),
            timestamp: None,
            likes_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::post;
    use super::*;

    #[test]
    fn test_deserialize_post_with_defaults() {
        let json = r#"{
            "id": "3301",
            "timestamp": "2024-05-01T18:30:00.000Z",
            "type": "Sidecar",
            "caption": "Hello",
            "likesCount": 42,
            "commentsCount": 3,
            "url": "https://www.instagram.com/p/abc/",
            "shortCode": "abc",
            "ownerUsername": "babyshop_uz"
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.post_type, "Sidecar");
        assert_eq!(post.likes_count, 42);
        assert!(post.hashtags.is_empty());
        assert!(post.latest_comments.is_empty());
        assert!(!post.is_sponsored);
        assert_eq!(post.owner_username.as_deref(), Some("babyshop_uz"));
        assert_eq!(post.timestamp.hour(), 18);
    }

    #[test]
    fn test_engagement_saturates() {
        let post = post("1", u64::MAX, 3);
        assert_eq!(DerivedPost::derive(&post).engagement, u64::MAX);
        assert_eq!(saturating_total([u64::MAX, 1, 2]), u64::MAX);
    }

    #[test]
    fn test_hidden_likes_are_clamped() {
        let json = r#"{
            "id": "1", "timestamp": "2024-05-01T18:30:00Z", "type": "Image",
            "caption": "", "likesCount": -1, "commentsCount": 2,
            "url": "u", "shortCode": "s"
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.likes_count, 0);
        assert_eq!(DerivedPost::derive(&post).engagement, 2);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let json = r#"{"id": "1", "type": "Image", "caption": ""}"#;
        assert!(serde_json::from_str::<Post>(json).is_err());
    }

    #[test]
    fn test_timestamp_keeps_own_offset() {
        let json = r#"{
            "id": "1", "timestamp": "2024-05-01T23:30:00+05:00", "type": "Image",
            "caption": "", "likesCount": 1, "commentsCount": 0,
            "url": "u", "shortCode": "s"
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();
        let derived = DerivedPost::derive(&post);
        assert_eq!(derived.hour, 23);
        assert_eq!(derived.weekday, Weekday::Wednesday);
    }

    #[test]
    fn test_script_classification() {
        assert_eq!(ScriptLabel::classify(""), ScriptLabel::Unknown);
        assert_eq!(ScriptLabel::classify("Привет мир"), ScriptLabel::CyrillicDominant);
        assert_eq!(ScriptLabel::classify("Salom dunyo"), ScriptLabel::LatinDominant);
        assert_eq!(ScriptLabel::classify("ab да"), ScriptLabel::Mixed);
        assert_eq!(ScriptLabel::classify("🎉🎉 123"), ScriptLabel::Unknown);
        // Uzbek Cyrillic letters outside the Russian alphabet
        assert_eq!(ScriptLabel::classify("ўқғҳ"), ScriptLabel::CyrillicDominant);
    }

    #[test]
    fn test_script_classification_is_idempotent() {
        let caption = "Yangi kolleksiya! Новая коллекция для малышей 👶";
        assert_eq!(ScriptLabel::classify(caption), ScriptLabel::classify(caption));
    }

    #[test]
    fn test_length_buckets_are_half_open() {
        assert_eq!(LengthBucket::for_length(0), Some(LengthBucket::Short));
        assert_eq!(LengthBucket::for_length(499), Some(LengthBucket::Short));
        assert_eq!(LengthBucket::for_length(500), Some(LengthBucket::Medium));
        assert_eq!(LengthBucket::for_length(1999), Some(LengthBucket::Long));
        assert_eq!(LengthBucket::for_length(2000), Some(LengthBucket::VeryLong));
        assert_eq!(LengthBucket::for_length(5000), None);
    }

    #[test]
    fn test_derived_fields() {
        let mut p = post("1", 10, 4);
        p.caption = "Ёлка".to_string();
        p.hashtags = vec!["baby".into(), "kids".into(), "baby".into()];
        p.child_posts = vec![serde_json::json!({"id": "child"})];

        let derived = DerivedPost::derive(&p);
        assert_eq!(derived.engagement, 14);
        assert_eq!(derived.caption_length, 4);
        assert_eq!(derived.hashtags, vec!["baby", "kids"]);
        assert!(derived.is_carousel);
        assert_eq!(derived.script, ScriptLabel::CyrillicDominant);
        assert_eq!(derived.hour, 10);
        assert_eq!(derived.month, Month::March);
    }

    #[test]
    fn test_empty_caption_scenario() {
        let p = post("1", 0, 0);
        let derived = DerivedPost::derive(&p);
        assert_eq!(derived.script, ScriptLabel::Unknown);
        assert_eq!(derived.caption_length, 0);
    }
}
