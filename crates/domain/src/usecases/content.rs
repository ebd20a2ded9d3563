//! Content-type breakdown

use crate::model::{DerivedPost, saturating_total};
use crate::report::{ContentTypeStats, TypeCount};
use crate::usecases::analyze::{AnalysisError, AnalysisStage};

pub fn analyze_content_types(
    posts: &[DerivedPost<'_>],
) -> Result<ContentTypeStats, AnalysisError> {
    if posts.is_empty() {
        return Err(AnalysisError::EmptyInput {
            stage: AnalysisStage::ContentTypes,
        });
    }

    let mut types: Vec<TypeCount> = Vec::new();
    for post in posts {
        match types.iter_mut().find(|t| t.post_type == post.post.post_type) {
            Some(entry) => entry.posts += 1,
            None => types.push(TypeCount {
                post_type: post.post.post_type.clone(),
                posts: 1,
                share: 0.0,
            }),
        }
    }

    let total = posts.len() as f64;
    for entry in &mut types {
        entry.share = entry.posts as f64 / total * 100.0;
    }
    types.sort_by(|a, b| b.posts.cmp(&a.posts));

    let carousels: Vec<u64> = posts
        .iter()
        .filter(|p| p.is_carousel)
        .map(|p| p.engagement)
        .collect();
    let carousel_avg_engagement = if carousels.is_empty() {
        0.0
    } else {
        saturating_total(carousels.iter().copied()) as f64 / carousels.len() as f64
    };

    Ok(ContentTypeStats {
        types,
        carousel_count: carousels.len(),
        carousel_avg_engagement,
    })
}
