//! Aggregate structures produced by the analyzers
//!
//! Every value keeps full precision; rounding happens only when a report is
//! rendered.

use serde::Serialize;
use time::OffsetDateTime;

use crate::model::{DerivedPost, LengthBucket, ScriptLabel};

/// Structured result of a full analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub account: AccountInfo,
    pub engagement: EngagementStats,
    pub content: ContentTypeStats,
    pub captions: CaptionStats,
    pub hashtags: HashtagStats,
    pub patterns: PostingPatterns,
    pub comments: CommentStats,
}

/// Owner of the analysed posts
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub username: String,
    pub full_name: String,
}

/// Snapshot of a single post used in top/bottom rankings
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub short_code: String,
    pub url: String,
    pub caption: String,
    pub likes: u64,
    pub comments: u64,
    pub engagement: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<&DerivedPost<'_>> for PostSummary {
    fn from(derived: &DerivedPost<'_>) -> Self {
        let post = derived.post;
        Self {
            id: post.id.clone(),
            short_code: post.short_code.clone(),
            url: post.url.clone(),
            caption: post.caption.clone(),
            likes: post.likes_count,
            comments: post.comments_count,
            engagement: derived.engagement,
            timestamp: post.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementStats {
    pub total_posts: usize,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_likes: f64,
    pub avg_comments: f64,
    pub avg_engagement: f64,
    /// Highest engagement first, ties in input order
    pub top_posts: Vec<PostSummary>,
    /// Lowest engagement first, ties in input order
    pub bottom_posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    pub post_type: String,
    pub posts: usize,
    /// Share of all posts, 0-100
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentTypeStats {
    pub types: Vec<TypeCount>,
    pub carousel_count: usize,
    /// Zero when there are no carousel posts
    pub carousel_avg_engagement: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageCount {
    pub label: ScriptLabel,
    pub posts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketEngagement {
    pub bucket: LengthBucket,
    pub posts: usize,
    /// `None` when no caption falls in the bucket
    pub avg_engagement: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptionStats {
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub languages: Vec<LanguageCount>,
    pub length_engagement: Vec<BucketEngagement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HashtagUsage {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HashtagPerformance {
    pub tag: String,
    /// Mean engagement over every post using the tag, unweighted
    pub avg_engagement: f64,
    pub uses: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HashtagStats {
    pub total_unique: usize,
    pub top_used: Vec<HashtagUsage>,
    pub top_performing: Vec<HashtagPerformance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourEngagement {
    pub hour: u8,
    pub avg_engagement: f64,
    pub posts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayEngagement {
    pub day: String,
    pub avg_engagement: f64,
    pub posts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub posts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostingPatterns {
    /// Whole days between the earliest and latest post
    pub date_range_days: i64,
    /// Zero when the range is shorter than one whole day
    pub posts_per_week: f64,
    pub best_hours: Vec<HourEngagement>,
    pub best_days: Vec<DayEngagement>,
    pub posts_by_month: Vec<MonthCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentStats {
    /// Sum of the reported comment counts
    pub total_comments: u64,
    /// Comments actually present in the export
    pub fetched_comments: usize,
    pub posts_with_comments: usize,
    /// Percentage of posts with at least one comment, 0-100
    pub comment_rate: f64,
    pub total_questions: usize,
    pub sample_questions: Vec<String>,
}
