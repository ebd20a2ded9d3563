//! Competitors command - research report from web search results

use anyhow::{Context, Result};
use post_insights_adapters::report_fs::ReportWriter;
use post_insights_adapters::source::JsonSearchResultSource;
use post_insights_domain::usecases::CompetitorAnalyzer;
use post_insights_domain::{Formatter, MarkdownFormatter, SearchResultSource, SystemClock};
use std::path::PathBuf;

use super::file_slug;
use crate::args::CompetitorsArgs;
use crate::config::AppConfig;

pub async fn execute(args: CompetitorsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let results = JsonSearchResultSource::new(&args.results)
        .load_results()
        .await
        .with_context(|| {
            format!(
                "Failed to load search results from {}",
                args.results.display()
            )
        })?;

    if results.is_empty() {
        tracing::warn!(brand = %args.brand, "No search results to analyze");
    }

    let analyzer =
        CompetitorAnalyzer::new(SystemClock).context("Failed to build extraction rules")?;
    let report = analyzer.analyze(&args.brand, &results);
    let markdown = MarkdownFormatter.format(&report.to_document());

    let output = args.output.unwrap_or_else(|| {
        config
            .general
            .output_dir
            .join(format!("competitor_analysis_{}.md", file_slug(&args.brand)))
    });

    let writer = ReportWriter::new();
    writer
        .write(&output, &markdown)
        .await
        .context("Failed to write competitor report")?;

    println!(
        "Competitor analysis of {} ({} sources)",
        report.brand,
        report.sources.len()
    );
    println!("Report written: {}", output.display());

    let chunk_size = args.chunk_size.unwrap_or(config.export.chunk_size);
    if chunk_size > 0 && markdown.chars().count() > chunk_size {
        let parts = writer
            .write_chunked(&output, &markdown, chunk_size)
            .await
            .context("Failed to write report parts")?;
        for part in parts {
            println!("  part: {}", part.display());
        }
    }

    Ok(())
}
