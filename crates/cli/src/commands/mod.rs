//! CLI subcommands

pub mod analyze;
pub mod competitors;
pub mod config;
pub mod convert;

use post_insights_domain::Post;

/// Account name of the first post, used to derive default output names
pub(crate) fn account_name(posts: &[Post]) -> &str {
    posts
        .first()
        .and_then(|p| p.owner_username.as_deref())
        .unwrap_or("unknown")
}

/// Lowercase a free-form name into something safe for a file name
pub(crate) fn file_slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}
