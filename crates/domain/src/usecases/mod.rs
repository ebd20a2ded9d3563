//! Application use cases / business logic

pub mod analyze;
pub mod captions;
pub mod comments;
pub mod competitors;
pub mod content;
pub mod engagement;
pub mod hashtags;
pub mod patterns;
pub mod render;

pub use analyze::{AnalysisError, AnalysisStage, AnalyticsPipeline, PipelineConfig};
pub use competitors::{CompetitorAnalyzer, CompetitorReport, SourceInsights};
pub use render::{RenderConfig, ReportRenderer};
