//! Collaborators used by the agent steps
//!
//! Each concern sits behind a trait ([`DataSource`], [`ChartRenderer`],
//! [`NarrativeWriter`]) so tests can substitute in-memory fakes.

pub mod charts;
pub mod context;
pub mod data;
pub mod narrative;
pub mod prompts;

pub use charts::{ChartKind, ChartLine, ChartRenderer, ChartSpec, JsonChartRenderer, module_charts};
pub use context::prepare_context;
pub use data::{DataSource, FetchRequest, MarketDataSource};
pub use narrative::{
    LlmNarrativeWriter, NarrativeBackend, NarrativeConfig, NarrativeWriter, placeholder_text,
};
pub use prompts::{PromptLibrary, SYSTEM_PROMPT};
