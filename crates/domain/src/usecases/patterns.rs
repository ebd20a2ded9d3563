//! Posting-pattern analysis (frequency, best hours, best days)

use std::collections::BTreeMap;
use time::{Month, Weekday};

use crate::model::DerivedPost;
use crate::report::{DayEngagement, HourEngagement, MonthCount, PostingPatterns};
use crate::usecases::analyze::{AnalysisError, AnalysisStage};

#[derive(Debug, Clone, Copy)]
pub struct PatternLimits {
    pub top_hours: usize,
    pub top_days: usize,
}

impl Default for PatternLimits {
    fn default() -> Self {
        Self {
            top_hours: 5,
            top_days: 5,
        }
    }
}

#[derive(Default)]
struct Group {
    sum: u64,
    posts: usize,
}

impl Group {
    fn add(&mut self, engagement: u64) {
        self.sum = self.sum.saturating_add(engagement);
        self.posts += 1;
    }

    fn mean(&self) -> f64 {
        self.sum as f64 / self.posts as f64
    }
}

/// Timing statistics, using each timestamp's own offset
pub fn analyze_patterns(
    posts: &[DerivedPost<'_>],
    limits: PatternLimits,
) -> Result<PostingPatterns, AnalysisError> {
    let (Some(first), Some(last)) = (
        posts.iter().map(|p| p.post.timestamp).min(),
        posts.iter().map(|p| p.post.timestamp).max(),
    ) else {
        return Err(AnalysisError::EmptyInput {
            stage: AnalysisStage::PostingPatterns,
        });
    };

    let date_range_days = (last - first).whole_days();
    let posts_per_week = if date_range_days > 0 {
        posts.len() as f64 / (date_range_days as f64 / 7.0)
    } else {
        0.0
    };

    let mut hours: BTreeMap<u8, Group> = BTreeMap::new();
    let mut days: BTreeMap<u8, (Weekday, Group)> = BTreeMap::new();
    let mut months: BTreeMap<u8, (Month, usize)> = BTreeMap::new();

    for post in posts {
        hours.entry(post.hour).or_default().add(post.engagement);
        days.entry(post.weekday.number_days_from_monday())
            .or_insert_with(|| (post.weekday, Group::default()))
            .1
            .add(post.engagement);
        months
            .entry(post.month as u8)
            .or_insert((post.month, 0))
            .1 += 1;
    }

    // Groups iterate in calendar order, so stable sorts break ties chronologically
    let mut best_hours: Vec<HourEngagement> = hours
        .into_iter()
        .map(|(hour, group)| HourEngagement {
            hour,
            avg_engagement: group.mean(),
            posts: group.posts,
        })
        .collect();
    best_hours.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));
    best_hours.truncate(limits.top_hours);

    let mut best_days: Vec<DayEngagement> = days
        .into_values()
        .map(|(weekday, group)| DayEngagement {
            day: weekday.to_string(),
            avg_engagement: group.mean(),
            posts: group.posts,
        })
        .collect();
    best_days.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));
    best_days.truncate(limits.top_days);

    let mut posts_by_month: Vec<MonthCount> = months
        .into_values()
        .map(|(month, posts)| MonthCount {
            month: month.to_string(),
            posts,
        })
        .collect();
    posts_by_month.sort_by(|a, b| b.posts.cmp(&a.posts));

    tracing::debug!(date_range_days, posts_per_week, "Posting patterns analyzed");

    Ok(PostingPatterns {
        date_range_days,
        posts_per_week,
        best_hours,
        best_days,
        posts_by_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::model::fixtures::post;
    use time::OffsetDateTime;
    use time::macros::datetime;

    fn at(id: &str, engagement: u64, timestamp: OffsetDateTime) -> Post {
        let mut p = post(id, engagement, 0);
        p.timestamp = timestamp;
        p
    }

    #[test]
    fn test_same_timestamp_yields_zero_rate() {
        let ts = datetime!(2024-06-01 12:00 UTC);
        let posts = vec![at("1", 5, ts), at("2", 10, ts), at("3", 1, ts)];
        let derived = DerivedPost::derive_all(&posts);

        let patterns = analyze_patterns(&derived, PatternLimits::default()).unwrap();

        assert_eq!(patterns.date_range_days, 0);
        assert_eq!(patterns.posts_per_week, 0.0);
    }

    #[test]
    fn test_posts_per_week() {
        let posts = vec![
            at("1", 5, datetime!(2024-06-01 12:00 UTC)),
            at("2", 5, datetime!(2024-06-08 09:00 UTC)),
            at("3", 5, datetime!(2024-06-15 12:00 UTC)),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let patterns = analyze_patterns(&derived, PatternLimits::default()).unwrap();

        assert_eq!(patterns.date_range_days, 14);
        assert!((patterns.posts_per_week - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_partial_day_is_truncated() {
        let posts = vec![
            at("1", 5, datetime!(2024-06-01 00:00 UTC)),
            at("2", 5, datetime!(2024-06-01 23:59 UTC)),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let patterns = analyze_patterns(&derived, PatternLimits::default()).unwrap();

        assert_eq!(patterns.date_range_days, 0);
        assert_eq!(patterns.posts_per_week, 0.0);
    }

    #[test]
    fn test_best_hours_and_days() {
        let posts = vec![
            // Monday 09:00 and 18:00
            at("1", 10, datetime!(2024-06-03 09:00 UTC)),
            at("2", 100, datetime!(2024-06-03 18:00 UTC)),
            // Tuesday 18:00
            at("3", 50, datetime!(2024-06-04 18:30 UTC)),
            // Sunday 09:00
            at("4", 30, datetime!(2024-06-09 09:15 UTC)),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let patterns = analyze_patterns(&derived, PatternLimits::default()).unwrap();

        assert_eq!(patterns.best_hours[0].hour, 18);
        assert!((patterns.best_hours[0].avg_engagement - 75.0).abs() < 1e-9);
        assert_eq!(patterns.best_hours[0].posts, 2);
        assert_eq!(patterns.best_hours[1].hour, 9);
        assert!((patterns.best_hours[1].avg_engagement - 20.0).abs() < 1e-9);

        let days: Vec<&str> = patterns.best_days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Tuesday", "Sunday"]);
    }

    #[test]
    fn test_hours_use_local_offset() {
        let posts = vec![at("1", 5, datetime!(2024-06-03 23:00 +5))];
        let derived = DerivedPost::derive_all(&posts);

        let patterns = analyze_patterns(&derived, PatternLimits::default()).unwrap();

        assert_eq!(patterns.best_hours[0].hour, 23);
        assert_eq!(patterns.best_days[0].day, "Monday");
    }

    #[test]
    fn test_limits_and_months() {
        let posts: Vec<Post> = (0..8u8)
            .map(|h| {
                let ts = datetime!(2024-01-10 00:00 UTC).replace_hour(h).unwrap();
                at(&h.to_string(), h as u64, ts)
            })
            .chain(std::iter::once(at("feb", 1, datetime!(2024-02-01 12:00 UTC))))
            .collect();
        let derived = DerivedPost::derive_all(&posts);

        let patterns = analyze_patterns(&derived, PatternLimits::default()).unwrap();

        assert_eq!(patterns.best_hours.len(), 5);
        assert_eq!(patterns.best_hours[0].hour, 7);
        assert_eq!(patterns.posts_by_month[0].month, "January");
        assert_eq!(patterns.posts_by_month[0].posts, 8);
        assert_eq!(patterns.posts_by_month[1].month, "February");
    }

    #[test]
    fn test_empty_input_fails() {
        let result = analyze_patterns(&[], PatternLimits::default());
        assert!(matches!(
            result,
            Err(AnalysisError::EmptyInput {
                stage: AnalysisStage::PostingPatterns
            })
        ));
    }
}
