//! Inter-agent messages recorded in the run's audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::AgentRole;

/// Kind of message exchanged between agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Ask another agent to perform work
    Request,
    /// Answer to a request
    Response,
    /// Dispute a result
    Challenge,
    /// Answer to a challenge
    Rebuttal,
}

/// A single message in the audit trail
///
/// Messages are created by a step, appended to the state, and never mutated
/// afterwards. Fields are read-only outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    from_agent: AgentRole,
    to_agent: AgentRole,
    message_type: MessageType,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(
        from_agent: AgentRole,
        to_agent: AgentRole,
        message_type: MessageType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            from_agent,
            to_agent,
            message_type,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn from_agent(&self) -> AgentRole {
        self.from_agent
    }

    pub fn to_agent(&self) -> AgentRole {
        self.to_agent
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(
            AgentRole::Reviewer,
            AgentRole::DataCollector,
            MessageType::Request,
            "fetch everything",
        )
        .with_metadata("modules", serde_json::json!(["macro"]));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["from_agent"], "reviewer");
        assert_eq!(json["to_agent"], "data_collector");
        assert_eq!(json["message_type"], "request");
        assert_eq!(json["metadata"]["modules"][0], "macro");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let msg = Message::new(
            AgentRole::NarrativeDrafter,
            AgentRole::Reviewer,
            MessageType::Rebuttal,
            "fixed",
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("metadata").is_none());
    }
}
