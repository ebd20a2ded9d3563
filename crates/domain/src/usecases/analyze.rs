//! Analytics pipeline - the single entry point over a post collection

use std::fmt;
use thiserror::Error;

use crate::model::{DerivedPost, Post};
use crate::report::{AccountInfo, AnalysisReport};
use crate::usecases::captions::analyze_captions;
use crate::usecases::comments::analyze_comments;
use crate::usecases::content::analyze_content_types;
use crate::usecases::engagement::analyze_engagement;
use crate::usecases::hashtags::{HashtagLimits, analyze_hashtags};
use crate::usecases::patterns::{PatternLimits, analyze_patterns};

/// Analyzer stage, used to identify where a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Engagement,
    ContentTypes,
    Captions,
    PostingPatterns,
    Comments,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisStage::Engagement => "engagement",
            AnalysisStage::ContentTypes => "content types",
            AnalysisStage::Captions => "captions",
            AnalysisStage::PostingPatterns => "posting patterns",
            AnalysisStage::Comments => "comments",
        };
        f.write_str(name)
    }
}

/// Errors that abort an analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No posts to analyze (stage: {stage})")]
    EmptyInput { stage: AnalysisStage },
}

/// Ranking sizes used by the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub top_posts: usize,
    pub top_used_hashtags: usize,
    pub top_performing_hashtags: usize,
    pub top_hours: usize,
    pub top_days: usize,
    pub sample_questions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_posts: 5,
            top_used_hashtags: 15,
            top_performing_hashtags: 10,
            top_hours: 5,
            top_days: 5,
            sample_questions: 5,
        }
    }
}

/// Runs every analyzer over one immutable post collection.
///
/// Analyzers are independent one-shot transforms; the pipeline derives the
/// per-post fields once and joins the results into an [`AnalysisReport`].
pub struct AnalyticsPipeline {
    config: PipelineConfig,
}

impl AnalyticsPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, posts: &[Post]) -> Result<AnalysisReport, AnalysisError> {
        tracing::info!(posts = posts.len(), "Running analytics pipeline");

        let derived = DerivedPost::derive_all(posts);

        let engagement = analyze_engagement(&derived, self.config.top_posts)?;
        let content = analyze_content_types(&derived)?;
        let captions = analyze_captions(&derived)?;
        let hashtags = analyze_hashtags(
            &derived,
            HashtagLimits {
                top_used: self.config.top_used_hashtags,
                top_performing: self.config.top_performing_hashtags,
            },
        );
        let patterns = analyze_patterns(
            &derived,
            PatternLimits {
                top_hours: self.config.top_hours,
                top_days: self.config.top_days,
            },
        )?;
        let comments = analyze_comments(&derived, self.config.sample_questions)?;

        let account = account_info(posts);

        tracing::info!(
            account = %account.username,
            avg_engagement = engagement.avg_engagement,
            unique_hashtags = hashtags.total_unique,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            account,
            engagement,
            content,
            captions,
            hashtags,
            patterns,
            comments,
        })
    }
}

impl Default for AnalyticsPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Owner of the first post, or "Unknown"
fn account_info(posts: &[Post]) -> AccountInfo {
    let first = posts.first();
    AccountInfo {
        username: first
            .and_then(|p| p.owner_username.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        full_name: first
            .and_then(|p| p.owner_full_name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}
