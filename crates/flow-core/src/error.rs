//! Error types for flow-core

use thiserror::Error;

/// Result type alias for flow-core
pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures of a report run
///
/// Soft failures (missing data, chart or narrative errors) never surface as
/// `Error`; they are recorded in the state's `issues` and `errors` lists.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Workflow construction failed
    #[error("Workflow initialization failed: {0}")]
    InitializationFailed(String),

    /// A step returned an error instead of an updated state
    #[error("Step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },

    /// The router selected a node that is not part of the graph
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The run did not reach END within the configured number of steps
    #[error("Step limit of {limit} reached without termination")]
    StepLimitExceeded { limit: usize },

    /// The state record is malformed
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
