//! Crypto research report workflow
//!
//! This crate assembles a weekly crypto market report through a small team
//! of agents that share one [`ReportState`](flow_core::ReportState):
//!
//! - `reviewer`: assigns the task, grades the draft, approves or rejects it
//! - `data_collector`: fetches the configured data modules
//! - `chart_renderer`: turns module data into chart descriptors
//! - `narrative_drafter`: writes the report sections (LLM or placeholder)
//! - `debate`: settles outstanding issues and bounds the revision loop
//!
//! Market data comes from Yahoo Finance, Glassnode and Coinglass behind a
//! timed cache and a retry policy. Every collaborator sits behind a trait in
//! [`services`] so runs can be driven entirely in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use flow_report::{ReportConfig, ReportOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReportConfig::default().with_env();
//!     let orchestrator = ReportOrchestrator::from_config(config)?;
//!
//!     let report = orchestrator.run("2024-12-09 ~ 2024-12-15").await?;
//!     println!("{}: {:.1} ({})", report.task_id, report.quality_score, report.approval_status);
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod archive;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod router;
pub mod series;
pub mod services;

pub use archive::{load_report, save_report};
pub use cache::{CacheKey, SeriesCache};
pub use catalog::{DataModule, Section, required_sections};
pub use config::{ReportConfig, ReportConfigBuilder, RevisionMode};
pub use error::{ReportError, Result};
pub use orchestrator::ReportOrchestrator;
pub use retry::RetryPolicy;
pub use router::{Route, route_after_debate, route_after_review};
pub use services::{
    ChartRenderer, DataSource, FetchRequest, JsonChartRenderer, LlmNarrativeWriter,
    MarketDataSource, NarrativeConfig, NarrativeWriter,
};
