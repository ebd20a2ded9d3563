//! Hashtag frequency and performance rankings

use std::collections::HashMap;

use crate::model::{DerivedPost, saturating_total};
use crate::report::{HashtagPerformance, HashtagStats, HashtagUsage};

/// Limits for the hashtag rankings
#[derive(Debug, Clone, Copy)]
pub struct HashtagLimits {
    pub top_used: usize,
    pub top_performing: usize,
}

impl Default for HashtagLimits {
    fn default() -> Self {
        Self {
            top_used: 15,
            top_performing: 10,
        }
    }
}

/// Rank hashtags by usage and by mean engagement.
///
/// Each post contributes one engagement value per hashtag it uses. A hashtag
/// used once reports that single value as its mean; no confidence weighting
/// is applied.
pub fn analyze_hashtags(posts: &[DerivedPost<'_>], limits: HashtagLimits) -> HashtagStats {
    // First-seen order is the tiebreaker for both rankings
    let mut order: Vec<&str> = Vec::new();
    let mut engagements: HashMap<&str, Vec<u64>> = HashMap::new();

    for post in posts {
        for &tag in &post.hashtags {
            engagements
                .entry(tag)
                .or_insert_with(|| {
                    order.push(tag);
                    Vec::new()
                })
                .push(post.engagement);
        }
    }

    let mut usage: Vec<HashtagUsage> = order
        .iter()
        .map(|tag| HashtagUsage {
            tag: tag.to_string(),
            count: engagements[tag].len(),
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count));
    usage.truncate(limits.top_used);

    let mut performance: Vec<HashtagPerformance> = order
        .iter()
        .map(|tag| {
            let values = &engagements[tag];
            let sum = saturating_total(values.iter().copied());
            HashtagPerformance {
                tag: tag.to_string(),
                avg_engagement: sum as f64 / values.len() as f64,
                uses: values.len(),
            }
        })
        .collect();
    performance.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));
    performance.truncate(limits.top_performing);

    tracing::debug!(unique = order.len(), "Hashtags analyzed");

    HashtagStats {
        total_unique: order.len(),
        top_used: usage,
        top_performing: performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use crate::model::fixtures::post;

    fn tagged(id: &str, engagement: u64, tags: &[&str]) -> Post {
        let mut p = post(id, engagement, 0);
        p.hashtags = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    #[test]
    fn test_mean_engagement_per_hashtag() {
        let posts = vec![
            tagged("1", 20, &["baby", "sale"]),
            tagged("2", 40, &["baby"]),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_hashtags(&derived, HashtagLimits::default());

        let baby = stats
            .top_performing
            .iter()
            .find(|h| h.tag == "baby")
            .unwrap();
        assert!((baby.avg_engagement - 30.0).abs() < 1e-9);
        assert_eq!(baby.uses, 2);
        assert_eq!(stats.total_unique, 2);
    }

    #[test]
    fn test_duplicates_within_post_count_once() {
        let posts = vec![tagged("1", 10, &["kids", "kids", "kids"])];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_hashtags(&derived, HashtagLimits::default());

        assert_eq!(stats.top_used[0].count, 1);
    }

    #[test]
    fn test_ties_broken_by_first_seen() {
        let posts = vec![
            tagged("1", 5, &["zebra", "apple"]),
            tagged("2", 5, &["mango", "apple"]),
            tagged("3", 5, &["zebra"]),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_hashtags(&derived, HashtagLimits::default());

        let used: Vec<&str> = stats.top_used.iter().map(|h| h.tag.as_str()).collect();
        assert_eq!(used, vec!["zebra", "apple", "mango"]);

        // All share the same mean, so first-seen order wins
        let performing: Vec<&str> = stats
            .top_performing
            .iter()
            .map(|h| h.tag.as_str())
            .collect();
        assert_eq!(performing, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_rankings_are_bounded_and_from_input() {
        let tags: Vec<String> = (0..30).map(|i| format!("tag{}", i)).collect();
        let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let posts = vec![tagged("1", 3, &tag_refs), tagged("2", 9, &tag_refs[..12])];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_hashtags(&derived, HashtagLimits::default());

        assert_eq!(stats.total_unique, 30);
        assert_eq!(stats.top_used.len(), 15);
        assert_eq!(stats.top_performing.len(), 10);
        assert!(stats.top_used.iter().all(|h| tags.contains(&h.tag)));
        assert!(stats.top_performing.iter().all(|h| tags.contains(&h.tag)));
    }

    #[test]
    fn test_no_hashtags() {
        let posts = vec![post("1", 3, 0)];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_hashtags(&derived, HashtagLimits::default());

        assert_eq!(stats.total_unique, 0);
        assert!(stats.top_used.is_empty());
        assert!(stats.top_performing.is_empty());
    }
}
