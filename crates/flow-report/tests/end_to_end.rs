//! Full runs without a narrative credential, plus archiving

mod common;

use common::{FakeChartRenderer, FakeDataSource, PERIOD};
use flow_core::{ApprovalStatus, ReportState, quality_score};
use flow_report::catalog::Section;
use flow_report::services::placeholder_text;
use flow_report::{DataModule, ReportConfig, ReportOrchestrator, load_report, save_report};
use std::sync::Arc;

fn orchestrator(modules: Vec<DataModule>, charts_per_module: usize) -> ReportOrchestrator {
    let config = ReportConfig::builder().modules(modules).build().unwrap();
    ReportOrchestrator::new(
        config,
        Arc::new(FakeDataSource::new()),
        Arc::new(FakeChartRenderer::new(charts_per_module)),
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn test_placeholder_run_is_reproducible() {
    let orchestrator = orchestrator(vec![DataModule::Macro], 2);
    assert!(!orchestrator.narrative_enabled());

    let first = orchestrator.run(PERIOD).await.unwrap();
    let second = orchestrator.run(PERIOD).await.unwrap();

    assert_eq!(first.report_period, PERIOD);
    assert!(first.task_id.starts_with("task_"));
    assert_eq!(
        first.reviewed_content["macro_analysis"],
        placeholder_text(Section::MacroAnalysis, PERIOD)
    );
    assert_eq!(first.draft_content, second.draft_content);
    assert_eq!(first.quality_score, second.quality_score);
    assert_eq!(first.approval_status, second.approval_status);
    assert_eq!(first.debate_rounds, second.debate_rounds);
    assert!(first.consensus_reached());
}

#[tokio::test]
async fn test_approved_run_stops_after_first_review() {
    // two modules, two charts, one placeholder section: 100 - 10 for length
    let state = orchestrator(vec![DataModule::Macro, DataModule::Eth], 1)
        .run(PERIOD)
        .await
        .unwrap();

    assert_eq!(state.quality_score, 90.0);
    assert_eq!(state.quality_score, quality_score(&state));
    assert_eq!(state.approval_status, ApprovalStatus::Approved);
    assert_eq!(state.debate_rounds, 0);
    assert_eq!(state.final_content, state.reviewed_content);
    assert_eq!(state.final_content.len(), 1);
}

#[tokio::test]
async fn test_archive_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = orchestrator(vec![DataModule::Macro], 2)
        .run_state(ReportState::with_task_id("task_20241215_090000", PERIOD))
        .await
        .unwrap();

    let path = save_report(&state, dir.path().join("reports")).await.unwrap();
    assert!(path.ends_with("task_20241215_090000.json"));

    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"report_period\": \"2024-12-09 ~ 2024-12-15\""));

    let loaded = load_report(&path).await.unwrap();
    assert_eq!(loaded, state);
}

#[tokio::test]
async fn test_concurrent_runs_share_one_orchestrator() {
    let orchestrator = Arc::new(orchestrator(vec![DataModule::Macro], 2));

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                orchestrator
                    .run_state(ReportState::with_task_id(format!("task_{i}"), PERIOD))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let state = handle.await.unwrap().unwrap();
        assert_eq!(state.task_id, format!("task_{i}"));
        assert!(state.consensus_reached());
    }
}
