//! Chart renderer: turns collected data into chart artifacts

use async_trait::async_trait;
use flow_core::{AgentRole, Message, MessageType, Phase, ReportState, Result};
use flow_graph::Node;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::DataModule;
use crate::services::ChartRenderer;

/// Renders charts for every module in `raw_data`
///
/// Failures mirror the data collector: recorded, never fatal, and the phase
/// stays put.
pub struct ChartRendererNode {
    renderer: Arc<dyn ChartRenderer>,
}

impl ChartRendererNode {
    pub fn new(renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl Node<ReportState> for ChartRendererNode {
    fn id(&self) -> &str {
        AgentRole::ChartRenderer.as_str()
    }

    async fn run(&self, mut state: ReportState) -> Result<ReportState> {
        let mut rendered = Vec::with_capacity(state.raw_data.len());
        for (name, data) in &state.raw_data {
            let outcome = match name.parse::<DataModule>() {
                Ok(module) => self.renderer.render(&state.task_id, module, data).await,
                Err(e) => Err(e),
            };
            rendered.push((name.clone(), outcome));
        }

        let mut failures = 0;
        for (name, outcome) in rendered {
            match outcome {
                Ok(paths) => {
                    info!(module = %name, charts = paths.len(), "Charts ready");
                    state.chart_paths.insert(name, paths);
                }
                Err(e) => {
                    failures += 1;
                    warn!(module = %name, error = %e, "Chart rendering failed");
                    state.record_failure(format!("Chart rendering failed for {name}: {e}"));
                }
            }
        }

        let total = state.chart_count();
        state.push_message(Message::new(
            AgentRole::ChartRenderer,
            AgentRole::Reviewer,
            MessageType::Response,
            format!("Rendered {total} charts"),
        ));

        if failures == 0 {
            state.current_step = Phase::ContentGeneration;
        }
        Ok(state)
    }
}
