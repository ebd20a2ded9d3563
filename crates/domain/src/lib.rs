//! post-insights domain crate
//!
//! Core analytics over scraped Instagram posts, free of I/O:
//! - `model`: posts, comments and per-post derived fields
//! - `report`: aggregate results produced by the analyzers
//! - `ports`: trait definitions for external dependencies (adapters)
//! - `usecases`: analyzers, the analytics pipeline, report rendering and
//!   competitor research
//! - `document`: report document model and markdown formatter
//! - `extract`: pluggable text extraction rules

pub mod document;
pub mod extract;
pub mod model;
pub mod ports;
pub mod report;
pub mod usecases;

pub use document::{Document, Formatter, MarkdownFormatter, split_chunks};
pub use model::*;
pub use ports::*;
pub use report::*;
