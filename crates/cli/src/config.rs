//! Configuration loading and management

use anyhow::{Context, Result};
use post_insights_domain::usecases::{PipelineConfig, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./post-insights.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for generated files when no explicit output is given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_posts")]
    pub top_posts: usize,

    #[serde(default = "default_top_used_hashtags")]
    pub top_used_hashtags: usize,

    #[serde(default = "default_top_performing_hashtags")]
    pub top_performing_hashtags: usize,

    #[serde(default = "default_top_hours")]
    pub top_hours: usize,

    #[serde(default = "default_top_days")]
    pub top_days: usize,

    #[serde(default = "default_sample_questions")]
    pub sample_questions: usize,

    #[serde(default = "default_rendered_used_hashtags")]
    pub rendered_used_hashtags: usize,

    #[serde(default = "default_caption_preview_chars")]
    pub caption_preview_chars: usize,

    /// Follower count assumed for the engagement-rate estimate; 0 hides it
    #[serde(default = "default_assumed_followers")]
    pub assumed_followers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write `<report>_summary.csv` next to each analysis report
    #[serde(default = "default_true")]
    pub summary_csv: bool,

    /// Characters per part when splitting long reports
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_top_posts() -> usize {
    5
}

fn default_top_used_hashtags() -> usize {
    15
}

fn default_top_performing_hashtags() -> usize {
    10
}

fn default_top_hours() -> usize {
    5
}

fn default_top_days() -> usize {
    5
}

fn default_sample_questions() -> usize {
    5
}

fn default_rendered_used_hashtags() -> usize {
    10
}

fn default_caption_preview_chars() -> usize {
    100
}

fn default_assumed_followers() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    10_000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_posts: default_top_posts(),
            top_used_hashtags: default_top_used_hashtags(),
            top_performing_hashtags: default_top_performing_hashtags(),
            top_hours: default_top_hours(),
            top_days: default_top_days(),
            sample_questions: default_sample_questions(),
            rendered_used_hashtags: default_rendered_used_hashtags(),
            caption_preview_chars: default_caption_preview_chars(),
            assumed_followers: default_assumed_followers(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            summary_csv: default_true(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl ReportConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            top_posts: self.top_posts,
            top_used_hashtags: self.top_used_hashtags,
            top_performing_hashtags: self.top_performing_hashtags,
            top_hours: self.top_hours,
            top_days: self.top_days,
            sample_questions: self.sample_questions,
        }
    }

    pub fn render(&self) -> RenderConfig {
        RenderConfig {
            caption_preview_chars: self.caption_preview_chars,
            used_hashtags_shown: self.rendered_used_hashtags,
            assumed_followers: self.assumed_followers,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("POST_INSIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# post-insights configuration

[general]
log_level = "info"
# Where reports and exports go when no --output is given
output_dir = "."

[report]
top_posts = 5
top_used_hashtags = 15
top_performing_hashtags = 10
top_hours = 5
top_days = 5
sample_questions = 5
# How many of the most-used hashtags the markdown report lists
rendered_used_hashtags = 10
caption_preview_chars = 100
# Used for the engagement-rate estimate; 0 hides it
assumed_followers = 10000

[export]
summary_csv = true
# Characters per part for chunked competitor reports
chunk_size = 10000
"#
        .to_string()
    }
}
