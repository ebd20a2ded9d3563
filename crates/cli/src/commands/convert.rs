//! Convert command - export posts to other formats

use anyhow::{Context, Result};
use post_insights_adapters::export::{
    AnalysisPackage, CsvExporter, DetailedCsvExporter, ParquetExporter, SqliteExporter,
};
use post_insights_adapters::source::JsonPostSource;
use post_insights_domain::{Exporter, SystemClock};
use std::path::PathBuf;

use super::{account_name, file_slug};
use crate::args::{ConvertArgs, ConvertFormat};
use crate::config::AppConfig;

pub async fn execute(args: ConvertArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let (posts, raw_records) = JsonPostSource::new(&args.input)
        .load_with_raw()
        .await
        .with_context(|| format!("Failed to load posts from {}", args.input.display()))?;

    let account = file_slug(account_name(&posts));
    let output = |default_name: String| {
        args.output
            .clone()
            .unwrap_or_else(|| config.general.output_dir.join(default_name))
    };

    let exporter: Box<dyn Exporter> = match args.format {
        ConvertFormat::Csv => Box::new(CsvExporter::new(output(format!("{}_metrics.csv", account)))),
        ConvertFormat::Detailed => Box::new(DetailedCsvExporter::new(output(format!(
            "{}_detailed",
            account
        )))),
        ConvertFormat::Parquet => Box::new(ParquetExporter::new(output(format!(
            "{}_data.parquet",
            account
        )))),
        ConvertFormat::Sqlite => {
            Box::new(SqliteExporter::new(output(format!("{}_data.db", account))))
        }
        ConvertFormat::All => Box::new(
            AnalysisPackage::new(
                output(format!("{}_analysis_package", account)),
                SystemClock,
            )
            .with_raw_records(raw_records),
        ),
    };

    tracing::info!(
        format = exporter.format(),
        posts = posts.len(),
        account = %account,
        "Converting posts"
    );

    let summary = exporter
        .export(&posts)
        .await
        .with_context(|| format!("Failed to export {}", exporter.format()))?;

    println!(
        "Exported {} posts ({}) to {}",
        summary.rows,
        exporter.format(),
        summary.path.display()
    );

    Ok(())
}
