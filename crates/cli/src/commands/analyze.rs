//! Analyze command - engagement report for one account export

use anyhow::{Context, Result};
use post_insights_adapters::export::SummaryCsvExporter;
use post_insights_adapters::report_fs::ReportWriter;
use post_insights_adapters::source::JsonPostSource;
use post_insights_domain::usecases::{AnalyticsPipeline, ReportRenderer};
use post_insights_domain::{Exporter, PostSource, SystemClock};
use std::path::{Path, PathBuf};

use super::file_slug;
use crate::args::AnalyzeArgs;
use crate::config::AppConfig;

pub async fn execute(args: AnalyzeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let posts = JsonPostSource::new(&args.input)
        .load_posts()
        .await
        .with_context(|| format!("Failed to load posts from {}", args.input.display()))?;

    let pipeline = AnalyticsPipeline::new(config.report.pipeline());
    let report = pipeline.analyze(&posts).context("Analysis failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| {
        config
            .general
            .output_dir
            .join(format!("{}_analysis.md", file_slug(&report.account.username)))
    });

    let renderer = ReportRenderer::new(config.report.render(), SystemClock);
    let markdown = renderer.render(&report);

    ReportWriter::new()
        .write(&output, &markdown)
        .await
        .context("Failed to write report")?;

    println!("Analysis of @{}", report.account.username);
    println!("  Posts analyzed:     {}", report.engagement.total_posts);
    println!(
        "  Average engagement: {:.2}",
        report.engagement.avg_engagement
    );
    println!("  Unique hashtags:    {}", report.hashtags.total_unique);
    println!();
    println!("Report written: {}", output.display());

    if config.export.summary_csv && !args.no_summary_csv {
        let csv_path = summary_csv_path(&output);
        SummaryCsvExporter::new(&csv_path)
            .export(&posts)
            .await
            .context("Failed to write summary CSV")?;
        println!("Summary CSV:    {}", csv_path.display());
    }

    Ok(())
}

/// `out/acme_analysis.md` -> `out/acme_analysis_summary.csv`
fn summary_csv_path(report: &Path) -> PathBuf {
    let stem = report
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analysis".to_string());
    report.with_file_name(format!("{}_summary.csv", stem))
}
