//! Workflow steps, one per agent role

pub mod chart_renderer;
pub mod data_collector;
pub mod debate;
pub mod narrative_drafter;
pub mod reviewer;

pub use chart_renderer::ChartRendererNode;
pub use data_collector::DataCollectorNode;
pub use debate::DebateNode;
pub use narrative_drafter::NarrativeDrafterNode;
pub use reviewer::ReviewerNode;
