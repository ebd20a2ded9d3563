//! Competitor research use case - extracts social handles, reach and
//! content strategy from web search results about a brand

use serde::Serialize;
use time::OffsetDateTime;

use crate::document::{Document, Section};
use crate::extract::{RuleError, RuleSet, parse_follower_count, rules};
use crate::model::SearchResult;
use crate::ports::Clock;
use crate::usecases::render::{format_datetime, group_thousands, preview};

/// Characters of source text kept as its summary
const SUMMARY_CHARS: usize = 300;

/// What one search result says about the brand
#[derive(Debug, Clone, Serialize)]
pub struct SourceInsights {
    /// 1-based position in the input
    pub index: usize,
    pub url: String,
    pub summary: String,
    pub instagram: Option<String>,
    pub telegram: Option<String>,
    pub followers: u64,
    pub influencers: Vec<String>,
    pub content_types: Vec<String>,
    pub themes: Vec<String>,
    pub ugc: bool,
    pub promo_mechanics: Vec<String>,
}

/// Aggregate over every source for one brand
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorReport {
    pub brand: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub sources: Vec<SourceInsights>,
    pub instagram_handles: Vec<String>,
    pub telegram_handles: Vec<String>,
    pub content_types: Vec<String>,
    pub themes: Vec<String>,
    pub promo_mechanics: Vec<String>,
    /// Number of sources mentioning user-generated content
    pub ugc_sources: usize,
}

pub struct CompetitorAnalyzer<C> {
    rules: RuleSet,
    clock: C,
}

impl<C: Clock> CompetitorAnalyzer<C> {
    /// Analyzer with the default rule set
    pub fn new(clock: C) -> Result<Self, RuleError> {
        Ok(Self::with_rules(RuleSet::competitor_defaults()?, clock))
    }

    pub fn with_rules(rules: RuleSet, clock: C) -> Self {
        Self { rules, clock }
    }

    pub fn analyze(&self, brand: &str, results: &[SearchResult]) -> CompetitorReport {
        tracing::info!(brand, sources = results.len(), "Analyzing competitor sources");

        let sources: Vec<SourceInsights> = results
            .iter()
            .enumerate()
            .map(|(i, result)| self.inspect(i + 1, result))
            .collect();

        let report = CompetitorReport {
            brand: brand.to_string(),
            generated_at: self.clock.now(),
            instagram_handles: unique(sources.iter().filter_map(|s| s.instagram.clone())),
            telegram_handles: unique(sources.iter().filter_map(|s| s.telegram.clone())),
            content_types: unique(sources.iter().flat_map(|s| s.content_types.clone())),
            themes: unique(sources.iter().flat_map(|s| s.themes.clone())),
            promo_mechanics: unique(sources.iter().flat_map(|s| s.promo_mechanics.clone())),
            ugc_sources: sources.iter().filter(|s| s.ugc).count(),
            sources,
        };

        tracing::debug!(
            instagram = report.instagram_handles.len(),
            telegram = report.telegram_handles.len(),
            ugc_sources = report.ugc_sources,
            "Competitor analysis complete"
        );

        report
    }

    fn inspect(&self, index: usize, result: &SearchResult) -> SourceInsights {
        let text = result.text.as_str();

        let followers = self
            .rules
            .first(rules::FOLLOWERS, text)
            .and_then(|raw| parse_follower_count(&raw))
            .unwrap_or(0);

        SourceInsights {
            index,
            url: result.url.clone(),
            summary: preview(text, SUMMARY_CHARS),
            instagram: self
                .rules
                .first(rules::INSTAGRAM_HANDLE, text)
                .map(|h| h.trim_end_matches('.').to_string()),
            telegram: self.rules.first(rules::TELEGRAM_HANDLE, text),
            followers,
            influencers: unique(self.rules.extract(rules::INFLUENCERS, text)),
            content_types: self.rules.labels(rules::CONTENT_TYPES, text),
            themes: self.rules.labels(rules::THEMES, text),
            ugc: !self.rules.extract(rules::UGC, text).is_empty(),
            promo_mechanics: self.rules.labels(rules::PROMO_MECHANICS, text),
        }
    }
}

/// Deduplicate, keeping first-seen order
fn unique<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl CompetitorReport {
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new(format!("Competitor Analysis: {}", self.brand))
            .note(format!("Analyzed: {}", format_datetime(self.generated_at)));

        doc.push(Section::new("Sources"));
        for source in &self.sources {
            let mut section = Section::sub(format!("Source {}: {}", source.index, source.url))
                .fields([("Summary", source.summary.clone())]);

            let mut social = Vec::new();
            if let Some(handle) = &source.instagram {
                social.push(format!("Instagram: @{}", handle));
            }
            if let Some(handle) = &source.telegram {
                social.push(format!("Telegram: @{}", handle));
            }
            if !social.is_empty() {
                section = section.paragraph("**Social networks:**").bullets(social);
            }

            if source.followers > 0 {
                let mut metrics = vec![format!("Followers: {}", group_thousands(source.followers))];
                if !source.influencers.is_empty() {
                    metrics.push(format!(
                        "Mentioned influencers: {}",
                        source.influencers.join(", ")
                    ));
                }
                section = section.paragraph("**Metrics:**").bullets(metrics);
            }

            doc.push(section);
        }

        let mut findings = Section::new("Key Findings");
        let mut handles = Vec::new();
        if !self.instagram_handles.is_empty() {
            handles.push(("Instagram accounts", at_list(&self.instagram_handles)));
        }
        if !self.telegram_handles.is_empty() {
            handles.push(("Telegram channels", at_list(&self.telegram_handles)));
        }
        if !handles.is_empty() {
            findings = findings.fields(handles);
        }
        findings = labelled_list(findings, "Content types used", &self.content_types);
        findings = labelled_list(findings, "Key themes", &self.themes);
        if !self.promo_mechanics.is_empty() {
            findings = findings
                .paragraph("**Promo mechanics:**")
                .bullets(self.promo_mechanics.clone());
        }
        if self.ugc_sources > 0 {
            findings = findings.paragraph(format!(
                "**UGC content:** Used (found in {} sources)",
                self.ugc_sources
            ));
        }
        doc.push(findings);

        doc
    }
}

fn labelled_list(section: Section, label: &str, items: &[String]) -> Section {
    let section = section.paragraph(format!("**{}:**", label));
    if items.is_empty() {
        section.paragraph("None found")
    } else {
        section.bullets(items.to_vec())
    }
}

fn at_list(handles: &[String]) -> String {
    handles
        .iter()
        .map(|h| format!("@{}", h))
        .collect::<Vec<_>>()
        .join(", ")
}
