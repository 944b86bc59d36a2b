//! Shared state record threaded through the report workflow
//!
//! A single `ReportState` is created per run and passed by value from step to
//! step. The message log and the error list are append-only, and consensus can
//! only move from `false` to `true`; both rules are enforced by keeping those
//! fields private.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::Message;

/// Section name -> series payload for one data module
pub type ModuleData = BTreeMap<String, serde_json::Value>;

/// Section key -> report text
pub type SectionMap = BTreeMap<String, String>;

/// Phase marker driving the routers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Initialization,
    DataCollection,
    ChartGeneration,
    ContentGeneration,
    Review,
    Finalization,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::DataCollection => "data_collection",
            Self::ChartGeneration => "chart_generation",
            Self::ContentGeneration => "content_generation",
            Self::Review => "review",
            Self::Finalization => "finalization",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editorial verdict on the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// The single state document of a report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportState {
    /// Identifier assigned at creation
    pub task_id: String,
    /// Caller supplied period, e.g. "2024-12-09 ~ 2024-12-15"
    pub report_period: String,
    /// Creation time of the record
    pub started_at: DateTime<Utc>,
    /// Current phase
    pub current_step: Phase,

    /// module -> section -> series
    pub raw_data: BTreeMap<String, ModuleData>,
    /// module -> chart artifact paths
    pub chart_paths: BTreeMap<String, Vec<PathBuf>>,

    pub draft_content: SectionMap,
    pub reviewed_content: SectionMap,
    pub final_content: SectionMap,

    messages: Vec<Message>,
    /// Completed debate rounds, bounded by the configured maximum
    pub debate_rounds: u32,
    consensus_reached: bool,

    /// Latest quality score in [0, 100]
    pub quality_score: f64,
    /// Outstanding problems, cleared when a debate round starts
    pub issues: Vec<String>,
    pub approval_status: ApprovalStatus,
    errors: Vec<String>,
}

impl ReportState {
    /// Create the initial record for a report period
    ///
    /// The task id is derived from the creation time
    /// (`task_YYYYMMDD_HHMMSS`).
    pub fn new(report_period: impl Into<String>) -> Self {
        let now = Utc::now();
        let task_id = format!("task_{}", now.format("%Y%m%d_%H%M%S"));
        Self::with_task_id(task_id, report_period)
    }

    /// Create the initial record with an explicit task id
    pub fn with_task_id(task_id: impl Into<String>, report_period: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            report_period: report_period.into(),
            started_at: Utc::now(),
            current_step: Phase::Initialization,
            raw_data: BTreeMap::new(),
            chart_paths: BTreeMap::new(),
            draft_content: SectionMap::new(),
            reviewed_content: SectionMap::new(),
            final_content: SectionMap::new(),
            messages: Vec::new(),
            debate_rounds: 0,
            consensus_reached: false,
            quality_score: 0.0,
            issues: Vec::new(),
            approval_status: ApprovalStatus::Pending,
            errors: Vec::new(),
        }
    }

    // =========== Audit Trail ===========

    /// Append a message to the log
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages in emission order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    // =========== Failures ===========

    /// Record a soft failure in both `errors` and `issues`
    pub fn record_failure(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.errors.push(description.clone());
        self.issues.push(description);
    }

    /// Record a problem that is not an error
    pub fn record_issue(&mut self, description: impl Into<String>) {
        self.issues.push(description.into());
    }

    /// Non-blocking errors in the order they occurred
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    // =========== Consensus ===========

    /// Mark that no further revision cycles are needed
    ///
    /// Idempotent; consensus is never withdrawn.
    pub fn reach_consensus(&mut self) {
        self.consensus_reached = true;
    }

    pub fn consensus_reached(&self) -> bool {
        self.consensus_reached
    }

    /// Increment the debate counter without exceeding `max_rounds`
    ///
    /// Returns `false` when the counter was already at the maximum.
    pub fn advance_debate_round(&mut self, max_rounds: u32) -> bool {
        if self.debate_rounds >= max_rounds {
            return false;
        }
        self.debate_rounds += 1;
        true
    }

    // =========== Derived Views ===========

    /// Total number of chart artifacts across modules
    pub fn chart_count(&self) -> usize {
        self.chart_paths.values().map(Vec::len).sum()
    }

    /// The content the reviewer grades: final content once approved, the
    /// reviewed draft before that
    pub fn graded_content(&self) -> &SectionMap {
        if self.final_content.is_empty() {
            &self.reviewed_content
        } else {
            &self.final_content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentRole, MessageType};

    #[test]
    fn test_initial_state() {
        let state = ReportState::new("2024-12-09 ~ 2024-12-15");
        assert!(state.task_id.starts_with("task_"));
        assert_eq!(state.current_step, Phase::Initialization);
        assert_eq!(state.approval_status, ApprovalStatus::Pending);
        assert_eq!(state.debate_rounds, 0);
        assert!(!state.consensus_reached());
        assert!(state.messages().is_empty());
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_record_failure_goes_to_both_lists() {
        let mut state = ReportState::with_task_id("t", "p");
        state.record_failure("macro fetch failed");
        state.record_issue("content too short");

        assert_eq!(state.errors(), ["macro fetch failed"]);
        assert_eq!(state.issues, vec!["macro fetch failed", "content too short"]);
    }

    #[test]
    fn test_debate_round_saturates() {
        let mut state = ReportState::with_task_id("t", "p");
        assert!(state.advance_debate_round(2));
        assert!(state.advance_debate_round(2));
        assert!(!state.advance_debate_round(2));
        assert_eq!(state.debate_rounds, 2);
    }

    #[test]
    fn test_consensus_is_sticky() {
        let mut state = ReportState::with_task_id("t", "p");
        state.reach_consensus();
        state.reach_consensus();
        assert!(state.consensus_reached());
    }

    #[test]
    fn test_graded_content_prefers_final() {
        let mut state = ReportState::with_task_id("t", "p");
        state
            .reviewed_content
            .insert("macro_analysis".to_string(), "draft".to_string());
        assert_eq!(state.graded_content()["macro_analysis"], "draft");

        state
            .final_content
            .insert("macro_analysis".to_string(), "final".to_string());
        assert_eq!(state.graded_content()["macro_analysis"], "final");
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut state = ReportState::with_task_id("t", "p");
        state.push_message(Message::new(
            AgentRole::Reviewer,
            AgentRole::DataCollector,
            MessageType::Request,
            "go",
        ));
        state.record_failure("oops");

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"current_step\":\"initialization\""));
        assert!(json.contains("\"approval_status\":\"pending\""));

        let back: ReportState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
