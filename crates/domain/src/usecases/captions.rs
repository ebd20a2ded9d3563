//! Caption length and script heuristics

use std::collections::HashMap;

use crate::model::{DerivedPost, LengthBucket};
use crate::report::{BucketEngagement, CaptionStats, LanguageCount};
use crate::usecases::analyze::{AnalysisError, AnalysisStage};

pub fn analyze_captions(posts: &[DerivedPost<'_>]) -> Result<CaptionStats, AnalysisError> {
    if posts.is_empty() {
        return Err(AnalysisError::EmptyInput {
            stage: AnalysisStage::Captions,
        });
    }

    let total_length: usize = posts.iter().map(|p| p.caption_length).sum();
    let min_length = posts.iter().map(|p| p.caption_length).min().unwrap_or(0);
    let max_length = posts.iter().map(|p| p.caption_length).max().unwrap_or(0);

    let mut languages: Vec<LanguageCount> = Vec::new();
    for post in posts {
        match languages.iter_mut().find(|l| l.label == post.script) {
            Some(entry) => entry.posts += 1,
            None => languages.push(LanguageCount {
                label: post.script,
                posts: 1,
            }),
        }
    }
    languages.sort_by(|a, b| b.posts.cmp(&a.posts));

    let mut buckets: HashMap<LengthBucket, (u64, usize)> = HashMap::new();
    for post in posts {
        if let Some(bucket) = LengthBucket::for_length(post.caption_length) {
            let entry = buckets.entry(bucket).or_insert((0, 0));
            entry.0 = entry.0.saturating_add(post.engagement);
            entry.1 += 1;
        }
    }

    let length_engagement = LengthBucket::ALL
        .iter()
        .map(|bucket| {
            let (sum, count) = buckets.get(bucket).copied().unwrap_or((0, 0));
            BucketEngagement {
                bucket: *bucket,
                posts: count,
                avg_engagement: (count > 0).then(|| sum as f64 / count as f64),
            }
        })
        .collect();

    tracing::debug!(languages = languages.len(), "Captions analyzed");

    Ok(CaptionStats {
        avg_length: total_length as f64 / posts.len() as f64,
        min_length,
        max_length,
        languages,
        length_engagement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::post;
    use crate::model::{Post, ScriptLabel};

    fn captioned(id: &str, engagement: u64, caption: &str) -> Post {
        let mut p = post(id, engagement, 0);
        p.caption = caption.to_string();
        p
    }

    #[test]
    fn test_length_buckets() {
        let posts = vec![
            captioned("1", 10, "short"),
            captioned("2", 30, &"a".repeat(499)),
            captioned("3", 100, &"b".repeat(500)),
            captioned("4", 7, &"c".repeat(6000)),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_captions(&derived).unwrap();

        let short = &stats.length_engagement[0];
        assert_eq!(short.bucket, LengthBucket::Short);
        assert_eq!(short.posts, 2);
        assert_eq!(short.avg_engagement, Some(20.0));

        let medium = &stats.length_engagement[1];
        assert_eq!(medium.avg_engagement, Some(100.0));

        // Nothing in Long or Very Long; the 6000-char caption is out of range
        assert_eq!(stats.length_engagement[2].avg_engagement, None);
        assert_eq!(stats.length_engagement[3].posts, 0);

        assert_eq!(stats.min_length, 5);
        assert_eq!(stats.max_length, 6000);
    }

    #[test]
    fn test_language_distribution() {
        let posts = vec![
            captioned("1", 1, "Новинки для малышей"),
            captioned("2", 1, "Yangi mahsulotlar"),
            captioned("3", 1, "Скидки до 50%"),
            captioned("4", 1, ""),
        ];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_captions(&derived).unwrap();

        assert_eq!(stats.languages[0].label, ScriptLabel::CyrillicDominant);
        assert_eq!(stats.languages[0].posts, 2);
        assert_eq!(stats.languages.len(), 3);
    }

    #[test]
    fn test_average_counts_characters_not_bytes() {
        let posts = vec![captioned("1", 1, "Привет"), captioned("2", 1, "hi")];
        let derived = DerivedPost::derive_all(&posts);

        let stats = analyze_captions(&derived).unwrap();

        assert!((stats.avg_length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(
            analyze_captions(&[]),
            Err(AnalysisError::EmptyInput {
                stage: AnalysisStage::Captions
            })
        ));
    }
}
