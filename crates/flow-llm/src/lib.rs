//! LLM provider abstraction layer for research-flow
//!
//! Provider-agnostic request/response types for text completion and the
//! [`LLMProvider`] trait. Concrete providers live behind the `anthropic` and
//! `openai` feature flags.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(any(feature = "anthropic", feature = "openai"))]
pub mod providers;
