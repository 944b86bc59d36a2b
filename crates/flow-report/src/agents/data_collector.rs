//! Data collector: fetches every configured module

use async_trait::async_trait;
use flow_core::{AgentRole, Message, MessageType, Phase, ReportState, Result};
use flow_graph::Node;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::DataModule;
use crate::config::ReportConfig;
use crate::services::{DataSource, FetchRequest};

/// Fills `raw_data` from the data source
///
/// A module that fails is recorded in `errors` and `issues`; the others are
/// kept. The phase only advances when every module arrived.
pub struct DataCollectorNode {
    source: Arc<dyn DataSource>,
    config: Arc<ReportConfig>,
}

impl DataCollectorNode {
    pub fn new(source: Arc<dyn DataSource>, config: Arc<ReportConfig>) -> Self {
        Self { source, config }
    }

    fn modules(&self) -> &[DataModule] {
        &self.config.modules
    }
}

#[async_trait]
impl Node<ReportState> for DataCollectorNode {
    fn id(&self) -> &str {
        AgentRole::DataCollector.as_str()
    }

    async fn run(&self, mut state: ReportState) -> Result<ReportState> {
        let request = FetchRequest::new(state.report_period.clone(), &self.config);
        let mut failures = 0;

        for &module in self.modules() {
            info!(%module, "Collecting module data");
            match self.source.fetch(module, &request).await {
                Ok(data) => {
                    state.raw_data.insert(module.to_string(), data);
                }
                Err(e) => {
                    failures += 1;
                    warn!(%module, error = %e, "Data collection failed");
                    state.record_failure(format!("Data collection failed for {module}: {e}"));
                }
            }
        }

        let collected = self.modules().len() - failures;
        state.push_message(Message::new(
            AgentRole::DataCollector,
            AgentRole::Reviewer,
            MessageType::Response,
            format!("Collected {collected}/{} data modules", self.modules().len()),
        ));

        if failures == 0 {
            state.current_step = Phase::ChartGeneration;
        }
        info!(collected, failures, "Data collection finished");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, Result as ReportResult};
    use flow_core::ModuleData;
    use serde_json::json;

    struct StaticSource;

    #[async_trait]
    impl DataSource for StaticSource {
        async fn fetch(&self, module: DataModule, _: &FetchRequest) -> ReportResult<ModuleData> {
            match module {
                DataModule::Btc => Err(ReportError::unavailable("btc", "GLASSNODE_API_KEY is not set")),
                _ => Ok(ModuleData::from([("series".to_string(), json!([1, 2, 3]))])),
            }
        }
    }

    fn node(modules: Vec<DataModule>) -> DataCollectorNode {
        let config = ReportConfig::builder().modules(modules).build().unwrap();
        DataCollectorNode::new(Arc::new(StaticSource), Arc::new(config))
    }

    fn state() -> ReportState {
        let mut s = ReportState::with_task_id("t", "2024-12-09 ~ 2024-12-15");
        s.current_step = Phase::DataCollection;
        s
    }

    #[tokio::test]
    async fn test_all_modules_collected() {
        let s = node(vec![DataModule::Macro, DataModule::Eth])
            .run(state())
            .await
            .unwrap();

        assert_eq!(s.raw_data.len(), 2);
        assert_eq!(s.current_step, Phase::ChartGeneration);
        assert!(s.errors().is_empty());
        assert_eq!(s.messages()[0].content(), "Collected 2/2 data modules");
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_data_and_phase() {
        let s = node(vec![DataModule::Macro, DataModule::Btc])
            .run(state())
            .await
            .unwrap();

        assert_eq!(s.raw_data.keys().collect::<Vec<_>>(), vec!["macro"]);
        assert_eq!(s.current_step, Phase::DataCollection);
        assert_eq!(s.errors().len(), 1);
        assert!(s.errors()[0].contains("btc"));
        assert_eq!(s.issues, s.errors());
    }
}
