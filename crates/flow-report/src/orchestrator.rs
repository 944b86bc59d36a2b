//! Report orchestrator: wires the agent steps into the workflow graph
//!
//! ```text
//! START -> reviewer
//! reviewer          -> data_collector | debate | END
//! data_collector    -> chart_renderer
//! chart_renderer    -> narrative_drafter
//! narrative_drafter -> reviewer
//! debate            -> narrative_drafter | reviewer
//! ```

use flow_core::{AgentRole, Error, ReportState, Result};
use flow_graph::{CompiledGraph, StateGraph, StepObserver, Topology};
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

use crate::agents::{
    ChartRendererNode, DataCollectorNode, DebateNode, NarrativeDrafterNode, ReviewerNode,
};
use crate::config::ReportConfig;
use crate::router::{Route, route_after_debate, route_after_review};
use crate::services::{
    ChartRenderer, DataSource, JsonChartRenderer, MarketDataSource, NarrativeConfig,
    NarrativeWriter,
};

/// Runs report workflows against a fixed set of collaborators
///
/// The orchestrator holds only read-only configuration and collaborators, so
/// one instance can serve several concurrent runs.
pub struct ReportOrchestrator {
    config: Arc<ReportConfig>,
    graph: CompiledGraph<ReportState>,
    narrative_enabled: bool,
}

impl ReportOrchestrator {
    /// Build the workflow over the given collaborators
    ///
    /// `narrative` of `None` selects placeholder content.
    pub fn new(
        config: ReportConfig,
        data: Arc<dyn DataSource>,
        charts: Arc<dyn ChartRenderer>,
        narrative: Option<Arc<dyn NarrativeWriter>>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let narrative_enabled = narrative.is_some();
        let graph = build_graph(&config, data, charts, narrative)?;

        Ok(Self {
            config,
            graph,
            narrative_enabled,
        })
    }

    /// Build the workflow over the live market data, JSON charts and the
    /// narrative provider detected in the environment
    pub fn from_config(config: ReportConfig) -> Result<Self> {
        let data: Arc<dyn DataSource> = Arc::new(MarketDataSource::new(&config)?);
        let charts: Arc<dyn ChartRenderer> = Arc::new(JsonChartRenderer::new(config.chart_dir()));
        let narrative = NarrativeConfig::from_env()
            .map(NarrativeConfig::into_writer)
            .transpose()?
            .map(|writer| Arc::new(writer) as Arc<dyn NarrativeWriter>);

        Self::new(config, data, charts, narrative)
    }

    /// Notify `observer` after every step
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver<ReportState>>) -> Self {
        self.graph = self.graph.with_observer(observer);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn narrative_enabled(&self) -> bool {
        self.narrative_enabled
    }

    /// Workflow topology for Mermaid or DOT export
    pub fn topology(&self) -> &Topology {
        self.graph.topology()
    }

    /// Produce a report for `report_period`
    pub async fn run(&self, report_period: impl Into<String>) -> Result<ReportState> {
        self.run_state(ReportState::new(report_period)).await
    }

    /// Drive a prepared initial record to completion
    pub async fn run_state(&self, state: ReportState) -> Result<ReportState> {
        self.run_traced(state).await.map(|(state, _)| state)
    }

    /// Like [`run_state`](Self::run_state), also returning the visited steps
    pub async fn run_traced(&self, state: ReportState) -> Result<(ReportState, Vec<String>)> {
        let span = info_span!("report", task_id = %state.task_id);

        async move {
            info!(period = %state.report_period, modules = ?self.config.modules, "Report run started");
            let (state, visited) = self.graph.invoke_traced(state).await?;
            info!(
                steps = visited.len(),
                score = state.quality_score,
                status = %state.approval_status,
                rounds = state.debate_rounds,
                errors = state.errors().len(),
                "Report run finished"
            );
            Ok((state, visited))
        }
        .instrument(span)
        .await
    }
}

fn build_graph(
    config: &Arc<ReportConfig>,
    data: Arc<dyn DataSource>,
    charts: Arc<dyn ChartRenderer>,
    narrative: Option<Arc<dyn NarrativeWriter>>,
) -> Result<CompiledGraph<ReportState>> {
    let reviewer = AgentRole::Reviewer.as_str();
    let data_collector = AgentRole::DataCollector.as_str();
    let chart_renderer = AgentRole::ChartRenderer.as_str();
    let narrative_drafter = AgentRole::NarrativeDrafter.as_str();
    let debate = AgentRole::Debate.as_str();

    let mut graph = StateGraph::<ReportState>::new();
    graph
        .add_node(reviewer, Arc::new(ReviewerNode::new(config.max_debate_rounds)))
        .add_node(
            data_collector,
            Arc::new(DataCollectorNode::new(data, Arc::clone(config))),
        )
        .add_node(chart_renderer, Arc::new(ChartRendererNode::new(charts)))
        .add_node(
            narrative_drafter,
            Arc::new(NarrativeDrafterNode::new(narrative, &config.modules)),
        )
        .add_node(debate, Arc::new(DebateNode::new(config.max_debate_rounds)))
        .set_entry_point(reviewer)
        .add_edge(data_collector, chart_renderer)
        .add_edge(chart_renderer, narrative_drafter)
        .add_edge(narrative_drafter, reviewer);

    graph.add_conditional_edges(
        reviewer,
        route_after_review,
        [Route::DataCollector, Route::Debate, Route::End]
            .map(|route| (route.as_str(), route.target())),
    );

    let mode = config.revision_mode;
    let debate_routes = [Route::NarrativeDrafter, Route::Reviewer];
    graph.add_conditional_edges(
        debate,
        move |state: &ReportState| route_after_debate(state, mode),
        debate_routes.map(|route| (route.as_str(), route.target())),
    );

    let compiled = graph
        .compile()
        .map_err(|e| Error::InitializationFailed(e.to_string()))?;
    Ok(compiled.with_step_limit(config.effective_step_limit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataModule;
    use crate::error::Result as ReportResult;
    use crate::services::FetchRequest;
    use async_trait::async_trait;
    use flow_core::ModuleData;
    use std::path::PathBuf;

    struct NoData;

    #[async_trait]
    impl DataSource for NoData {
        async fn fetch(&self, module: DataModule, _: &FetchRequest) -> ReportResult<ModuleData> {
            Err(crate::error::ReportError::unavailable(module.as_str(), "offline"))
        }
    }

    struct NoCharts;

    #[async_trait]
    impl ChartRenderer for NoCharts {
        async fn render(
            &self,
            _: &str,
            _: DataModule,
            _: &ModuleData,
        ) -> ReportResult<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    fn orchestrator(config: ReportConfig) -> ReportOrchestrator {
        ReportOrchestrator::new(config, Arc::new(NoData), Arc::new(NoCharts), None).unwrap()
    }

    #[test]
    fn test_topology_lists_every_role() {
        let orchestrator = orchestrator(ReportConfig::default());
        let mermaid = orchestrator.topology().to_mermaid();

        for role in AgentRole::all() {
            assert!(mermaid.contains(role.as_str()), "{role} missing");
        }
        assert!(mermaid.contains("__start__ --> reviewer;"));
        assert!(mermaid.contains("reviewer -.->|end| __end__;"));
        assert!(mermaid.contains("debate -.->|narrative_drafter| narrative_drafter;"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ReportConfig::default();
        config.modules.clear();
        let err = ReportOrchestrator::new(config, Arc::new(NoData), Arc::new(NoCharts), None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InitializationFailed(_)));
    }

    #[tokio::test]
    async fn test_offline_run_terminates_rejected() {
        let orchestrator = orchestrator(ReportConfig::default());
        let (state, visited) = orchestrator
            .run_traced(ReportState::with_task_id("task_offline", "2024-12-09 ~ 2024-12-15"))
            .await
            .unwrap();

        assert!(state.consensus_reached());
        assert_eq!(state.approval_status, flow_core::ApprovalStatus::Rejected);
        assert_eq!(visited.first().map(String::as_str), Some("reviewer"));
        assert_eq!(visited.last().map(String::as_str), Some("reviewer"));
        assert!(!state.errors().is_empty());
    }
}
