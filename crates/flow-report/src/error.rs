//! Error types for report collaborators
//!
//! These errors never abort a run on their own: the agent steps fold them
//! into the state's `issues` and `errors` lists. Only construction errors
//! are converted into [`flow_core::Error`].

use thiserror::Error;

/// Collaborator failures (data, charts, narrative, persistence)
#[derive(Debug, Error)]
pub enum ReportError {
    /// A data module could not be produced
    #[error("Data not available for {module}: {reason}")]
    DataUnavailable { module: String, reason: String },

    /// Rate limit exceeded for an upstream API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream API answered with an error status or an unusable body
    #[error("{provider} API error: {detail}")]
    Upstream { provider: String, detail: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Narrative generation failed for a section
    #[error("Narrative error: {0}")]
    Narrative(String),

    /// Prompt template could not be rendered
    #[error("Prompt template error: {0}")]
    Prompt(#[from] minijinja::Error),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    Chart(String),

    /// Filesystem error while writing artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),
}

impl ReportError {
    pub fn unavailable(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            module: module.into(),
            reason: reason.into(),
        }
    }

    pub fn upstream(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl From<flow_llm::LLMError> for ReportError {
    fn from(err: flow_llm::LLMError) -> Self {
        ReportError::Narrative(err.to_string())
    }
}

/// Configuration problems surface as workflow initialization failures
impl From<ReportError> for flow_core::Error {
    fn from(err: ReportError) -> Self {
        flow_core::Error::InitializationFailed(err.to_string())
    }
}
