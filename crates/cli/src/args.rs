//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// post-insights: engagement analytics over scraped Instagram posts
#[derive(Parser, Debug)]
#[command(name = "post-insights")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a post export and write a markdown report
    Analyze(AnalyzeArgs),

    /// Convert a post export to CSV, SQLite or a full analysis package
    Convert(ConvertArgs),

    /// Extract competitor insights from web search results
    Competitors(CompetitorsArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON file with an array of scraped posts
    pub input: PathBuf,

    /// Report path (default: <output_dir>/<account>_analysis.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the aggregates as JSON instead of writing a report
    #[arg(long)]
    pub json: bool,

    /// Skip the per-post summary CSV next to the report
    #[arg(long)]
    pub no_summary_csv: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConvertFormat {
    /// Flat metrics CSV
    Csv,
    /// posts.csv, hashtags.csv and comments.csv
    Detailed,
    /// Snappy-compressed Parquet file with derived columns
    Parquet,
    /// SQLite database with views
    Sqlite,
    /// Analysis package with every format plus a README
    All,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// JSON file with an array of scraped posts
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ConvertFormat::All)]
    pub format: ConvertFormat,

    /// Output file or directory (default derived from the account name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CompetitorsArgs {
    /// JSON file with an array of {"url", "text"} search results
    pub results: PathBuf,

    /// Brand the results are about
    #[arg(long)]
    pub brand: String,

    /// Report path (default: <output_dir>/competitor_analysis_<brand>.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also split the report into parts of this many characters
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Show,
}
