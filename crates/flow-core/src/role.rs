//! Agent roles taking part in a report run

use serde::{Deserialize, Serialize};
use std::fmt;

/// The agents that exchange messages during a run
///
/// Each role owns exactly one step of the workflow graph; the role name
/// doubles as the node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Editor: assigns the task and grades the draft
    Reviewer,
    /// Fetches market data modules
    DataCollector,
    /// Turns raw data into chart artifacts
    ChartRenderer,
    /// Writes the report sections
    NarrativeDrafter,
    /// Arbitrates outstanding issues between drafter and reviewer
    Debate,
}

impl AgentRole {
    /// Node id used in the workflow graph
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reviewer => "reviewer",
            Self::DataCollector => "data_collector",
            Self::ChartRenderer => "chart_renderer",
            Self::NarrativeDrafter => "narrative_drafter",
            Self::Debate => "debate",
        }
    }

    /// All roles in pipeline order
    pub fn all() -> [AgentRole; 5] {
        [
            Self::Reviewer,
            Self::DataCollector,
            Self::ChartRenderer,
            Self::NarrativeDrafter,
            Self::Debate,
        ]
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for AgentRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_as_node_id() {
        for role in AgentRole::all() {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::json!(role.as_str()));
        }
    }
}
