//! Pluggable text extraction rules
//!
//! A rule pulls zero or more strings out of free text. [`CaptureRule`]
//! returns regex captures, [`KeywordRule`] returns a fixed label when its
//! pattern is present. Rules are held by name in a [`RuleSet`] so callers
//! can swap or extend them without touching the analyzers.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid pattern for rule '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// A named extractor over free text
pub trait ExtractionRule: Send + Sync {
    fn name(&self) -> &str;

    /// Every value found in `text`, in match order
    fn extract(&self, text: &str) -> Vec<String>;
}

fn compile(name: &str, pattern: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RuleError::InvalidPattern {
            name: name.to_string(),
            source,
        })
}

/// Returns the first non-empty capture group of each match, trimmed
#[derive(Debug, Clone)]
pub struct CaptureRule {
    name: String,
    regex: Regex,
}

impl CaptureRule {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, RuleError> {
        let name = name.into();
        let regex = compile(&name, pattern)?;
        Ok(Self { name, regex })
    }
}

impl ExtractionRule for CaptureRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                caps.iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().trim())
                    .find(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }
}

/// Yields `label` once when the pattern occurs anywhere in the text
#[derive(Debug, Clone)]
pub struct KeywordRule {
    name: String,
    label: String,
    regex: Regex,
}

impl KeywordRule {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        label: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        let regex = compile(&name, pattern)?;
        Ok(Self {
            name,
            label: label.into(),
            regex,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl ExtractionRule for KeywordRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str) -> Vec<String> {
        if self.matches(text) {
            vec![self.label.clone()]
        } else {
            Vec::new()
        }
    }
}

/// Named collection of extraction rules
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any existing rule with the same name
    pub fn with(mut self, rule: impl ExtractionRule + 'static) -> Self {
        self.rules.retain(|r| r.name() != rule.name());
        self.rules.push(Box::new(rule));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn ExtractionRule> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// All values from the named rule; empty when the rule is absent
    pub fn extract(&self, name: &str, text: &str) -> Vec<String> {
        self.get(name).map(|r| r.extract(text)).unwrap_or_default()
    }

    /// First value from the named rule
    pub fn first(&self, name: &str, text: &str) -> Option<String> {
        self.extract(name, text).into_iter().next()
    }

    /// Values from several rules, in rule order
    pub fn labels(&self, names: &[&str], text: &str) -> Vec<String> {
        names
            .iter()
            .flat_map(|name| self.extract(name, text))
            .collect()
    }

    /// Rules used for competitor research over English, Russian and Uzbek text
    pub fn competitor_defaults() -> Result<Self, RuleError> {
        Ok(Self::new()
            .with(CaptureRule::new(
                rules::INSTAGRAM_HANDLE,
                r"@([A-Za-z0-9_.]+)|instagram\.com/([A-Za-z0-9_.]+)",
            )?)
            .with(CaptureRule::new(
                rules::TELEGRAM_HANDLE,
                r"t\.me/([A-Za-z0-9_]+)|@([A-Za-z0-9_]+)",
            )?)
            .with(CaptureRule::new(
                rules::FOLLOWERS,
                r"(\d+(?:\.\d+)?[KMМ]?)\s*(?:подписчик|follower|subscriber)",
            )?)
            .with(CaptureRule::new(
                rules::INFLUENCERS,
                r"(?:блогер|blogger|influencer|амбассадор)\s+([А-Яа-яЁё\s]+)",
            )?)
            .with(KeywordRule::new(
                rules::VIDEO_CONTENT,
                r"видео|video|reel|сторис|stories",
                "Video content",
            )?)
            .with(KeywordRule::new(
                rules::PHOTO_CONTENT,
                r"карусель|carousel|фото|photo",
                "Photo content",
            )?)
            .with(KeywordRule::new(
                rules::INFOGRAPHICS,
                r"инфографик|infographic",
                "Infographics",
            )?)
            .with(KeywordRule::new(
                rules::RECIPES,
                r"рецепт|recipe|готов|cook",
                "Recipes",
            )?)
            .with(KeywordRule::new(
                rules::CARE_TIPS,
                r"совет|advice|tip|рекоменд",
                "Care tips",
            )?)
            .with(KeywordRule::new(
                rules::CHILD_DEVELOPMENT,
                r"развитие|development|рост|growth",
                "Child development",
            )?)
            .with(KeywordRule::new(
                rules::UGC,
                r"ugc|пользовательский контент|отзыв",
                "User-generated content",
            )?)
            .with(KeywordRule::new(
                rules::CONTESTS,
                r"конкурс|contest|giveaway|розыгрыш",
                "Contests and giveaways",
            )?)
            .with(KeywordRule::new(
                rules::DISCOUNTS,
                r"скидк|discount|промо|promo",
                "Discounts and promos",
            )?))
    }
}

/// Names of the default competitor rules
pub mod rules {
    pub const INSTAGRAM_HANDLE: &str = "instagram_handle";
    pub const TELEGRAM_HANDLE: &str = "telegram_handle";
    pub const FOLLOWERS: &str = "followers";
    pub const INFLUENCERS: &str = "influencers";
    pub const VIDEO_CONTENT: &str = "video_content";
    pub const PHOTO_CONTENT: &str = "photo_content";
    pub const INFOGRAPHICS: &str = "infographics";
    pub const RECIPES: &str = "recipes";
    pub const CARE_TIPS: &str = "care_tips";
    pub const CHILD_DEVELOPMENT: &str = "child_development";
    pub const UGC: &str = "ugc";
    pub const CONTESTS: &str = "contests";
    pub const DISCOUNTS: &str = "discounts";

    pub const CONTENT_TYPES: &[&str] = &[VIDEO_CONTENT, PHOTO_CONTENT, INFOGRAPHICS];
    pub const THEMES: &[&str] = &[RECIPES, CARE_TIPS, CHILD_DEVELOPMENT];
    pub const PROMO_MECHANICS: &[&str] = &[CONTESTS, DISCOUNTS];
}

/// Parse a follower count such as `45K`, `1.2M` or `3М` (Cyrillic)
pub fn parse_follower_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let last = raw.chars().last()?;
    let (number, multiplier) = match last {
        'K' | 'k' => (&raw[..raw.len() - last.len_utf8()], 1_000.0),
        'M' | 'm' | 'М' | 'м' => (&raw[..raw.len() - last.len_utf8()], 1_000_000.0),
        _ => (raw, 1.0),
    };

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier) as u64)
}
