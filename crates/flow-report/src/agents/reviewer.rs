//! Quality reviewer: assigns the task and grades the draft

use async_trait::async_trait;
use flow_core::{
    APPROVAL_THRESHOLD, AgentRole, ApprovalStatus, Message, MessageType, Phase, ReportState,
    Result, quality_score,
};
use flow_graph::Node;
use serde_json::json;
use tracing::{debug, info, warn};

/// Entry step of the workflow and the editorial gate
///
/// In `initialization` it hands the task to the data collector; in `review`
/// it scores the draft and approves or rejects it. Any other phase passes
/// through untouched.
pub struct ReviewerNode {
    max_debate_rounds: u32,
}

impl ReviewerNode {
    pub fn new(max_debate_rounds: u32) -> Self {
        Self { max_debate_rounds }
    }

    fn assign(mut state: ReportState) -> ReportState {
        let request = Message::new(
            AgentRole::Reviewer,
            AgentRole::DataCollector,
            MessageType::Request,
            format!("Collect all data for {}", state.report_period),
        );
        state.push_message(request);
        state.current_step = Phase::DataCollection;
        info!("Task assigned to data collector");
        state
    }

    fn review(&self, mut state: ReportState) -> ReportState {
        let score = quality_score(&state);
        state.quality_score = score;

        if score >= APPROVAL_THRESHOLD {
            state.approval_status = ApprovalStatus::Approved;
            state.reach_consensus();
            state.final_content = state.reviewed_content.clone();
            state.push_message(
                Message::new(
                    AgentRole::Reviewer,
                    AgentRole::NarrativeDrafter,
                    MessageType::Response,
                    format!("Report approved with quality score {score:.1}"),
                )
                .with_metadata("quality_score", json!(score)),
            );
            info!(score, "Report approved");
        } else {
            let issue = format!("Quality score below threshold: {score:.1}/100");
            state.approval_status = ApprovalStatus::Rejected;
            state.record_issue(issue.clone());
            state.advance_debate_round(self.max_debate_rounds);
            state.push_message(
                Message::new(
                    AgentRole::Reviewer,
                    AgentRole::NarrativeDrafter,
                    MessageType::Challenge,
                    issue,
                )
                .with_metadata("quality_score", json!(score)),
            );
            warn!(score, rounds = state.debate_rounds, "Report rejected");
        }

        state.current_step = Phase::Finalization;
        state
    }
}

#[async_trait]
impl Node<ReportState> for ReviewerNode {
    fn id(&self) -> &str {
        AgentRole::Reviewer.as_str()
    }

    async fn run(&self, state: ReportState) -> Result<ReportState> {
        match state.current_step {
            Phase::Initialization => Ok(Self::assign(state)),
            Phase::Review => Ok(self.review(state)),
            phase => {
                debug!(%phase, "Reviewer has nothing to do");
                Ok(state)
            }
        }
    }
}
