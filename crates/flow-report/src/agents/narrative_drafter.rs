//! Narrative drafter: writes the report sections

use async_trait::async_trait;
use flow_core::{AgentRole, Message, MessageType, Phase, ReportState, Result, SectionMap};
use flow_graph::Node;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{DataModule, Section, required_sections};
use crate::services::{NarrativeWriter, placeholder_text, prepare_context};

/// Drafts every section the configured modules call for
///
/// Without a writer the sections get deterministic placeholder text. With
/// one, each section is generated from a prepared context; a section that
/// fails is recorded and left out. Either way the draft goes to review.
pub struct NarrativeDrafterNode {
    writer: Option<Arc<dyn NarrativeWriter>>,
    sections: Vec<Section>,
}

impl NarrativeDrafterNode {
    pub fn new(writer: Option<Arc<dyn NarrativeWriter>>, modules: &[DataModule]) -> Self {
        Self {
            writer,
            sections: required_sections(modules),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    fn placeholders(&self, state: &ReportState) -> SectionMap {
        self.sections
            .iter()
            .map(|section| {
                (
                    section.as_str().to_string(),
                    placeholder_text(*section, &state.report_period),
                )
            })
            .collect()
    }

    async fn generate(&self, writer: &dyn NarrativeWriter, state: &mut ReportState) -> SectionMap {
        let mut drafted = SectionMap::new();

        for &section in &self.sections {
            let outcome = match prepare_context(section, &state.raw_data, &drafted) {
                Ok(context) => writer.generate(section, &context).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(text) => {
                    info!(%section, chars = text.chars().count(), "Section drafted");
                    drafted.insert(section.as_str().to_string(), text);
                }
                Err(e) => {
                    warn!(%section, error = %e, "Section generation failed");
                    state.record_failure(format!("Narrative generation failed for {section}: {e}"));
                }
            }
        }

        drafted
    }
}

#[async_trait]
impl Node<ReportState> for NarrativeDrafterNode {
    fn id(&self) -> &str {
        AgentRole::NarrativeDrafter.as_str()
    }

    async fn run(&self, mut state: ReportState) -> Result<ReportState> {
        if state.consensus_reached() {
            debug!("Consensus already reached, keeping the approved draft");
            return Ok(state);
        }

        let drafted = match &self.writer {
            Some(writer) => self.generate(writer.as_ref(), &mut state).await,
            None => {
                warn!("No narrative credential configured, using placeholder content");
                self.placeholders(&state)
            }
        };

        state.push_message(Message::new(
            AgentRole::NarrativeDrafter,
            AgentRole::Reviewer,
            MessageType::Response,
            format!("Drafted {}/{} sections", drafted.len(), self.sections.len()),
        ));

        state.draft_content = drafted.clone();
        state.reviewed_content = drafted;
        state.current_step = Phase::Review;
        Ok(state)
    }
}
