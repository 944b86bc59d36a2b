//! Core types for research-flow
//!
//! This crate defines the shared state record threaded through every step of
//! the report workflow, the inter-agent message log, the deterministic quality
//! score and the error type used for hard failures.

pub mod error;
pub mod message;
pub mod quality;
pub mod role;
pub mod state;

pub use error::{Error, Result};
pub use message::{Message, MessageType};
pub use quality::{APPROVAL_THRESHOLD, ScoreBreakdown, quality_score, score_breakdown};
pub use role::AgentRole;
pub use state::{ApprovalStatus, ModuleData, Phase, ReportState, SectionMap};
