//! Routing decisions after the reviewer and debate steps

use flow_core::{AgentRole, Phase, ReportState};
use flow_graph::END;

use crate::config::RevisionMode;

/// Destination tag returned by the routers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    DataCollector,
    NarrativeDrafter,
    Reviewer,
    Debate,
    End,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataCollector => "data_collector",
            Self::NarrativeDrafter => "narrative_drafter",
            Self::Reviewer => "reviewer",
            Self::Debate => "debate",
            Self::End => "end",
        }
    }

    /// Graph node the tag leads to
    pub fn target(&self) -> &'static str {
        match self {
            Self::DataCollector => AgentRole::DataCollector.as_str(),
            Self::NarrativeDrafter => AgentRole::NarrativeDrafter.as_str(),
            Self::Reviewer => AgentRole::Reviewer.as_str(),
            Self::Debate => AgentRole::Debate.as_str(),
            Self::End => END,
        }
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Where to go after the reviewer
///
/// Data collection after the task is assigned; END or debate once the draft
/// was graded; END from any other phase.
pub fn route_after_review(state: &ReportState) -> Route {
    match state.current_step {
        Phase::DataCollection => Route::DataCollector,
        Phase::Finalization if state.consensus_reached() => Route::End,
        Phase::Finalization => Route::Debate,
        _ => Route::End,
    }
}

/// Where to go after a debate step
pub fn route_after_debate(state: &ReportState, mode: RevisionMode) -> Route {
    if state.consensus_reached() {
        return Route::Reviewer;
    }
    match mode {
        RevisionMode::Redraft => Route::NarrativeDrafter,
        RevisionMode::ReviewOnly => Route::Reviewer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phase: Phase) -> ReportState {
        let mut s = ReportState::with_task_id("t", "p");
        s.current_step = phase;
        s
    }

    #[test]
    fn test_route_after_review() {
        assert_eq!(
            route_after_review(&state(Phase::DataCollection)),
            Route::DataCollector
        );
        assert_eq!(route_after_review(&state(Phase::Finalization)), Route::Debate);

        let mut done = state(Phase::Finalization);
        done.reach_consensus();
        assert_eq!(route_after_review(&done), Route::End);

        for phase in [Phase::Initialization, Phase::Review, Phase::ContentGeneration] {
            assert_eq!(route_after_review(&state(phase)), Route::End);
        }
    }

    #[test]
    fn test_route_after_debate() {
        let open = state(Phase::Review);
        assert_eq!(
            route_after_debate(&open, RevisionMode::Redraft),
            Route::NarrativeDrafter
        );
        assert_eq!(
            route_after_debate(&open, RevisionMode::ReviewOnly),
            Route::Reviewer
        );

        let mut settled = state(Phase::Finalization);
        settled.reach_consensus();
        assert_eq!(
            route_after_debate(&settled, RevisionMode::Redraft),
            Route::Reviewer
        );
    }

    #[test]
    fn test_route_targets() {
        assert_eq!(Route::End.target(), "__end__");
        assert_eq!(Route::Debate.target(), "debate");
        assert_eq!(Route::DataCollector.as_ref(), "data_collector");
    }
}
