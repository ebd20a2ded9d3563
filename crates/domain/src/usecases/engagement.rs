//! Engagement aggregation

use crate::model::{DerivedPost, saturating_total};
use crate::report::{EngagementStats, PostSummary};
use crate::usecases::analyze::{AnalysisError, AnalysisStage};

/// Totals, means, and the top/bottom `limit` posts by engagement
pub fn analyze_engagement(
    posts: &[DerivedPost<'_>],
    limit: usize,
) -> Result<EngagementStats, AnalysisError> {
    if posts.is_empty() {
        return Err(AnalysisError::EmptyInput {
            stage: AnalysisStage::Engagement,
        });
    }

    let total_posts = posts.len();
    let total_likes = saturating_total(posts.iter().map(|p| p.post.likes_count));
    let total_comments = saturating_total(posts.iter().map(|p| p.post.comments_count));
    let total_engagement = saturating_total(posts.iter().map(|p| p.engagement));
    let n = total_posts as f64;

    // `sort_by` is stable, so equal engagement keeps input order
    let mut top: Vec<&DerivedPost<'_>> = posts.iter().collect();
    top.sort_by(|a, b| b.engagement.cmp(&a.engagement));

    let mut bottom: Vec<&DerivedPost<'_>> = posts.iter().collect();
    bottom.sort_by(|a, b| a.engagement.cmp(&b.engagement));

    tracing::debug!(total_posts, total_likes, total_comments, "Engagement aggregated");

    Ok(EngagementStats {
        total_posts,
        total_likes,
        total_comments,
        avg_likes: total_likes as f64 / n,
        avg_comments: total_comments as f64 / n,
        avg_engagement: total_engagement as f64 / n,
        top_posts: top.into_iter().take(limit).map(PostSummary::from).collect(),
        bottom_posts: bottom.into_iter().take(limit).map(PostSummary::from).collect(),
    })
}
