//! Comment flattening and audience-question extraction

use crate::model::{Comment, DerivedPost, saturating_total};
use crate::report::CommentStats;
use crate::usecases::analyze::{AnalysisError, AnalysisStage};

/// Any comment containing a question mark counts as an audience question
pub fn is_question(comment: &Comment) -> bool {
    comment.text.contains('?')
}

pub fn analyze_comments(
    posts: &[DerivedPost<'_>],
    sample_size: usize,
) -> Result<CommentStats, AnalysisError> {
    if posts.is_empty() {
        return Err(AnalysisError::EmptyInput {
            stage: AnalysisStage::Comments,
        });
    }

    let total_comments = saturating_total(posts.iter().map(|p| p.post.comments_count));
    let posts_with_comments = posts.iter().filter(|p| p.post.comments_count > 0).count();

    // Post order, then comment order within each post
    let comments: Vec<&Comment> = posts
        .iter()
        .flat_map(|p| p.post.latest_comments.iter())
        .collect();

    let questions: Vec<&Comment> = comments.iter().copied().filter(|c| is_question(c)).collect();

    tracing::debug!(
        fetched = comments.len(),
        questions = questions.len(),
        "Comments analyzed"
    );

    Ok(CommentStats {
        total_comments,
        fetched_comments: comments.len(),
        posts_with_comments,
        comment_rate: posts_with_comments as f64 / posts.len() as f64 * 100.0,
        total_questions: questions.len(),
        sample_questions: questions
            .iter()
            .take(sample_size)
            .map(|c| c.text.clone())
            .collect(),
    })
}
