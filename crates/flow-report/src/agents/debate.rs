//! Debate step: settles outstanding issues between drafter and reviewer

use async_trait::async_trait;
use flow_core::{AgentRole, Message, MessageType, Phase, ReportState, Result};
use flow_graph::Node;
use serde_json::json;
use tracing::{info, warn};

/// Issues quoted in a rebuttal
const MAX_QUOTED_ISSUES: usize = 3;

/// Either declares consensus or runs one more revision round
///
/// Never touches the draft.
pub struct DebateNode {
    max_rounds: u32,
}

impl DebateNode {
    pub fn new(max_rounds: u32) -> Self {
        Self { max_rounds }
    }
}

#[async_trait]
impl Node<ReportState> for DebateNode {
    fn id(&self) -> &str {
        AgentRole::Debate.as_str()
    }

    async fn run(&self, mut state: ReportState) -> Result<ReportState> {
        if state.issues.is_empty() {
            info!("No outstanding issues, consensus reached");
            state.reach_consensus();
            return Ok(state);
        }

        if state.debate_rounds >= self.max_rounds {
            warn!(
                rounds = state.debate_rounds,
                issues = state.issues.len(),
                "Debate round limit reached, forcing consensus"
            );
            state.reach_consensus();
            return Ok(state);
        }

        let round = state.debate_rounds + 1;
        info!(round, "Starting debate round");

        let quoted: Vec<&str> = state
            .issues
            .iter()
            .take(MAX_QUOTED_ISSUES)
            .map(String::as_str)
            .collect();
        let rebuttal = Message::new(
            AgentRole::NarrativeDrafter,
            AgentRole::Reviewer,
            MessageType::Rebuttal,
            format!("Revised the draft to address: {}", quoted.join("; ")),
        )
        .with_metadata("round", json!(round));

        state.push_message(rebuttal);
        state.issues.clear();
        state.advance_debate_round(self.max_rounds);
        state.current_step = Phase::Review;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_issues(issues: &[&str], rounds: u32) -> ReportState {
        let mut s = ReportState::with_task_id("t", "p");
        s.current_step = Phase::Finalization;
        s.issues = issues.iter().map(ToString::to_string).collect();
        s.debate_rounds = rounds;
        s.draft_content
            .insert("macro_analysis".to_string(), "draft".to_string());
        s
    }

    #[tokio::test]
    async fn test_no_issues_fast_path() {
        let s = DebateNode::new(2).run(state_with_issues(&[], 0)).await.unwrap();
        assert!(s.consensus_reached());
        assert_eq!(s.debate_rounds, 0);
        assert!(s.messages().is_empty());
        assert_eq!(s.current_step, Phase::Finalization);
    }

    #[tokio::test]
    async fn test_round_limit_forces_consensus() {
        let s = DebateNode::new(2)
            .run(state_with_issues(&["score too low"], 2))
            .await
            .unwrap();
        assert!(s.consensus_reached());
        assert_eq!(s.debate_rounds, 2);
        assert_eq!(s.issues, vec!["score too low"]);
    }

    #[tokio::test]
    async fn test_round_quotes_first_three_issues() {
        let s = DebateNode::new(2)
            .run(state_with_issues(&["a", "b", "c", "d"], 1))
            .await
            .unwrap();

        assert!(!s.consensus_reached());
        assert!(s.issues.is_empty());
        assert_eq!(s.debate_rounds, 2);
        assert_eq!(s.current_step, Phase::Review);
        assert_eq!(s.draft_content["macro_analysis"], "draft");

        let message = &s.messages()[0];
        assert_eq!(message.message_type(), MessageType::Rebuttal);
        assert_eq!(message.content(), "Revised the draft to address: a; b; c");
    }
}
