//! Rendering use case - assembles an analysis report into a document

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::document::{Block, Document, Formatter, MarkdownFormatter, Section};
use crate::ports::Clock;
use crate::report::{AnalysisReport, PostSummary};

/// Configuration for the report renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Characters of caption shown for top posts
    pub caption_preview_chars: usize,
    /// How many of the most-used hashtags to list
    pub used_hashtags_shown: usize,
    /// Follower count used for the engagement-rate estimate (0 disables it)
    pub assumed_followers: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            caption_preview_chars: 100,
            used_hashtags_shown: 10,
            assumed_followers: 10_000,
        }
    }
}

/// Renders an [`AnalysisReport`] in a fixed section order:
/// summary, engagement, content types, captions, hashtags, posting
/// patterns, comments, recommendations.
pub struct ReportRenderer<C> {
    config: RenderConfig,
    clock: C,
}

impl<C: Clock> ReportRenderer<C> {
    pub fn new(config: RenderConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Render the report as markdown
    pub fn render(&self, report: &AnalysisReport) -> String {
        MarkdownFormatter.format(&self.build(report))
    }

    /// Assemble the report document without formatting it
    pub fn build(&self, report: &AnalysisReport) -> Document {
        let account = &report.account;
        let mut doc = Document::new(format!("Instagram Analysis Report: @{}", account.username))
            .note(format!("Generated: {}", format_datetime(self.clock.now())))
            .note(format!(
                "Account: {} (@{})",
                account.full_name, account.username
            ));

        self.summary(&mut doc, report);
        self.engagement(&mut doc, report);
        self.content_types(&mut doc, report);
        self.captions(&mut doc, report);
        self.hashtags(&mut doc, report);
        self.patterns(&mut doc, report);
        self.comments(&mut doc, report);
        self.recommendations(&mut doc, report);

        doc
    }

    fn summary(&self, doc: &mut Document, report: &AnalysisReport) {
        doc.push(Section::new("Executive Summary").fields([
            (
                "Total Posts Analyzed",
                report.engagement.total_posts.to_string(),
            ),
            (
                "Date Range",
                format!("{} days", report.patterns.date_range_days),
            ),
            (
                "Average Engagement",
                format!(
                    "{:.2} interactions per post",
                    report.engagement.avg_engagement
                ),
            ),
            (
                "Posting Frequency",
                format!("{:.2} posts per week", report.patterns.posts_per_week),
            ),
        ]));
    }

    fn engagement(&self, doc: &mut Document, report: &AnalysisReport) {
        let stats = &report.engagement;
        doc.push(Section::new("Engagement Metrics"));

        let mut fields = vec![
            ("Total Likes", group_thousands(stats.total_likes)),
            ("Total Comments", group_thousands(stats.total_comments)),
            ("Average Likes per Post", format!("{:.2}", stats.avg_likes)),
            (
                "Average Comments per Post",
                format!("{:.2}", stats.avg_comments),
            ),
        ];
        if self.config.assumed_followers > 0 {
            let rate = stats.avg_engagement / self.config.assumed_followers as f64 * 100.0;
            fields.push((
                "Engagement Rate",
                format!(
                    "~{:.2}% (assuming ~{} followers)",
                    rate,
                    group_thousands(self.config.assumed_followers)
                ),
            ));
        }
        doc.push(Section::sub("Overall Performance").fields(fields));

        doc.push(
            Section::sub(format!("Top {} Performing Posts", stats.top_posts.len()))
                .numbered(stats.top_posts.iter().map(|p| self.post_entry(p))),
        );
        doc.push(
            Section::sub(format!("Lowest {} Performing Posts", stats.bottom_posts.len()))
                .numbered(stats.bottom_posts.iter().map(|p| self.post_entry(p))),
        );
    }

    fn post_entry(&self, post: &PostSummary) -> String {
        format!(
            "**{} interactions** ({} likes, {} comments)\n   - Caption: {}\n   - Date: {}",
            post.engagement,
            post.likes,
            post.comments,
            preview(&post.caption, self.config.caption_preview_chars),
            format_date(post.timestamp),
        )
    }

    fn content_types(&self, doc: &mut Document, report: &AnalysisReport) {
        let content = &report.content;
        let mut items: Vec<String> = content
            .types
            .iter()
            .map(|t| format!("**{}**: {} posts ({:.1}%)", t.post_type, t.posts, t.share))
            .collect();
        items.push(format!(
            "**Carousel Posts**: {} (avg engagement: {:.2})",
            content.carousel_count, content.carousel_avg_engagement
        ));

        doc.push(Section::new("Content Types").bullets(items));
    }

    fn captions(&self, doc: &mut Document, report: &AnalysisReport) {
        let captions = &report.captions;
        doc.push(
            Section::new("Caption Analysis")
                .fields([
                    (
                        "Average Caption Length",
                        format!("{:.0} characters", captions.avg_length),
                    ),
                    (
                        "Caption Length Range",
                        format!(
                            "{}-{} characters",
                            captions.min_length, captions.max_length
                        ),
                    ),
                ])
                .paragraph("Language distribution:")
                .bullets(
                    captions
                        .languages
                        .iter()
                        .map(|l| format!("{}: {} posts", l.label, l.posts)),
                ),
        );

        doc.push(Section::sub("Caption Length vs Engagement").bullets(
            captions.length_engagement.iter().map(|b| match b.avg_engagement {
                Some(avg) => format!(
                    "**{}**: {:.1} avg engagement ({} posts)",
                    b.bucket, avg, b.posts
                ),
                None => format!("**{}**: n/a (no posts)", b.bucket),
            }),
        ));
    }

    fn hashtags(&self, doc: &mut Document, report: &AnalysisReport) {
        let hashtags = &report.hashtags;
        doc.push(Section::new("Hashtag Analysis").fields([(
            "Total Unique Hashtags",
            hashtags.total_unique.to_string(),
        )]));

        doc.push(
            Section::sub("Most Used Hashtags").numbered(
                hashtags
                    .top_used
                    .iter()
                    .take(self.config.used_hashtags_shown)
                    .map(|h| format!("#{} - used {} times", h.tag, h.count)),
            ),
        );
        doc.push(
            Section::sub("Best Performing Hashtags (by avg engagement)").numbered(
                hashtags.top_performing.iter().map(|h| {
                    format!(
                        "#{} - {:.2} avg engagement ({} posts)",
                        h.tag, h.avg_engagement, h.uses
                    )
                }),
            ),
        );
    }

    fn patterns(&self, doc: &mut Document, report: &AnalysisReport) {
        let patterns = &report.patterns;
        doc.push(Section::new("Posting Patterns").fields([(
            "Posts per Week",
            format!("{:.2}", patterns.posts_per_week),
        )]));

        doc.push(
            Section::sub("Best Posting Times (by engagement)").bullets(
                patterns.best_hours.iter().map(|h| {
                    format!(
                        "**{}:00**: {:.1} avg engagement ({} posts)",
                        h.hour, h.avg_engagement, h.posts
                    )
                }),
            ),
        );
        doc.push(
            Section::sub("Best Days of Week").bullets(
                patterns
                    .best_days
                    .iter()
                    .map(|d| format!("**{}**: {:.1} avg engagement", d.day, d.avg_engagement)),
            ),
        );
        doc.push(
            Section::sub("Posts by Month").bullets(
                patterns
                    .posts_by_month
                    .iter()
                    .map(|m| format!("**{}**: {} posts", m.month, m.posts)),
            ),
        );
    }

    fn comments(&self, doc: &mut Document, report: &AnalysisReport) {
        let comments = &report.comments;
        doc.push(Section::new("Comment Analysis").fields([
            ("Total Comments", group_thousands(comments.total_comments)),
            (
                "Posts with Comments",
                format!(
                    "{} ({:.2}%)",
                    comments.posts_with_comments, comments.comment_rate
                ),
            ),
            (
                "Questions in Comments",
                comments.total_questions.to_string(),
            ),
        ]));

        let questions = Section::sub("Sample Questions from Audience");
        let questions = if comments.sample_questions.is_empty() {
            questions.paragraph("No questions found in the exported comments.")
        } else {
            questions.numbered(
                comments
                    .sample_questions
                    .iter()
                    .map(|q| q.replace('\n', " ")),
            )
        };
        doc.push(questions);
    }

    fn recommendations(&self, doc: &mut Document, report: &AnalysisReport) {
        doc.push(Section::new("Key Insights & Recommendations"));

        doc.push(Section::sub("Strengths").numbered([
            format!(
                "**Consistent Posting Schedule** - {:.1} posts per week shows good consistency",
                report.patterns.posts_per_week
            ),
            format!(
                "**High-Quality Content** - Average engagement of {:.0} indicates resonating content",
                report.engagement.avg_engagement
            ),
            format!(
                "**Strategic Hashtag Use** - {} unique hashtags shows diverse reach strategies",
                report.hashtags.total_unique
            ),
        ]));

        doc.push(Section::sub("Areas for Improvement").numbered([
            format!(
                "**Increase Comment Rate** - Only {:.1}% of posts receive comments",
                report.comments.comment_rate
            ),
            "**Optimize Posting Times** - Focus on peak engagement hours".to_string(),
            "**Content Diversification** - Experiment with different content types".to_string(),
        ]));

        let peak_window = match report.patterns.best_hours.first() {
            Some(best) => format!("{}:00-{}:00", best.hour, (best.hour + 2) % 24),
            None => "N/A".to_string(),
        };

        doc.push(
            Section::sub("Action Items")
                .checklist([
                    "Create more carousel posts (higher engagement)".to_string(),
                    "Respond to all questions in comments to boost engagement".to_string(),
                    format!("Test posting during peak hours: {}", peak_window),
                    "Use top-performing hashtags more consistently".to_string(),
                    "Increase caption length for better storytelling".to_string(),
                ])
                .block(Block::Rule)
                .paragraph(
                    "*Note: This analysis is based on public data. Saves, shares, and reach \
                     require access to Instagram Insights.*",
                ),
        );
    }
}

/// First `max_chars` characters on a single line, with "..." when cut
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

const DATE_TIME: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

fn format_date(ts: OffsetDateTime) -> String {
    ts.date().to_string()
}

pub(crate) fn format_datetime(ts: OffsetDateTime) -> String {
    // Only fails for components an OffsetDateTime always has
    ts.format(DATE_TIME)
        .unwrap_or_else(|_| format_date(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::model::fixtures::{comment, post};
    use crate::usecases::AnalyticsPipeline;
    use time::macros::datetime;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            datetime!(2024-06-01 09:30 UTC)
        }
    }

    fn sample_posts() -> Vec<Post> {
        let mut a = post("a", 1200, 30);
        a.caption = "x".repeat(150);
        a.hashtags = vec!["baby".to_string(), "kids".to_string()];
        a.latest_comments = vec![comment("Qancha turadi?")];
        a.timestamp = datetime!(2024-05-20 18:00 +5);
        let mut b = post("b", 40, 0);
        b.caption = "Новая коллекция".to_string();
        b.hashtags = vec!["baby".to_string()];
        b.timestamp = datetime!(2024-05-27 10:00 +5);
        vec![a, b]
    }

    fn render(posts: &[Post]) -> String {
        let report = AnalyticsPipeline::default().analyze(posts).unwrap();
        ReportRenderer::new(RenderConfig::default(), FixedClock).render(&report)
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let posts = sample_posts();
        let report = AnalyticsPipeline::default().analyze(&posts).unwrap();
        let doc = ReportRenderer::new(RenderConfig::default(), FixedClock).build(&report);

        let top_level: Vec<&str> = doc
            .sections
            .iter()
            .filter(|s| s.level == 2)
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(
            top_level,
            vec![
                "Executive Summary",
                "Engagement Metrics",
                "Content Types",
                "Caption Analysis",
                "Hashtag Analysis",
                "Posting Patterns",
                "Comment Analysis",
                "Key Insights & Recommendations",
            ]
        );
    }

    #[test]
    fn test_render_header_and_numbers() {
        let text = render(&sample_posts());

        assert!(text.starts_with("# Instagram Analysis Report: @babyshop_uz\n"));
        assert!(text.contains("*Generated: 2024-06-01 09:30*"));
        assert!(text.contains("- **Total Likes**: 1,240"));
        assert!(text.contains("- **Average Engagement**: 635.00 interactions per post"));
        assert!(text.contains("- **Engagement Rate**: ~6.35% (assuming ~10,000 followers)"));
        assert!(text.contains("#baby - used 2 times"));
        assert!(text.contains("1. Qancha turadi?"));
        assert!(text.contains("Test posting during peak hours: 18:00-20:00"));
    }

    #[test]
    fn test_caption_preview_is_truncated() {
        let text = render(&sample_posts());

        let expected = format!("   - Caption: {}...\n", "x".repeat(100));
        assert!(text.contains(&expected));
        assert!(text.contains("   - Date: 2024-05-20"));
    }

    #[test]
    fn test_render_without_questions() {
        let posts = vec![post("a", 3, 0)];
        let text = render(&posts);

        assert!(text.contains("No questions found"));
        assert!(text.contains("**Medium**: n/a (no posts)"));
    }

    #[test]
    fn test_datetime_is_zero_padded() {
        assert_eq!(format_datetime(datetime!(2024-01-05 07:05 +5)), "2024-01-05 07:05");
        assert_eq!(format_date(datetime!(2024-01-05 07:05 +5)), "2024-01-05");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_preview_handles_multibyte() {
        assert_eq!(preview("Привет мир", 6), "Привет...");
        assert_eq!(preview("line\nbreak", 20), "line break");
    }
}
