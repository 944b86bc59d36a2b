//! Narrative generation for report sections

use async_trait::async_trait;
use flow_llm::providers::{AnthropicProvider, OpenAIConfig, OpenAIProvider};
use flow_llm::{CompletionRequest, LLMProvider, Message};
use serde_json::Value;
use std::sync::Arc;

use super::prompts::{PromptLibrary, SYSTEM_PROMPT};
use crate::catalog::Section;
use crate::error::{ReportError, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 800;

/// Writes the text of one report section from a prepared context
#[async_trait]
pub trait NarrativeWriter: Send + Sync {
    async fn generate(&self, section: Section, context: &Value) -> Result<String>;
}

/// Deterministic stand-in text used when no narrative credential is configured
pub fn placeholder_text(section: Section, report_period: &str) -> String {
    format!(
        "[placeholder] {section} for {report_period}: narrative generation is disabled. \
         Set OPENAI_API_KEY or ANTHROPIC_API_KEY to generate this section with a language model."
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeBackend {
    OpenAI,
    Anthropic,
}

/// Credentials and sampling settings for the narrative provider
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub backend: NarrativeBackend,
    pub api_key: String,
    /// OpenAI-compatible base URL override
    pub api_base: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl NarrativeConfig {
    /// Detect a narrative credential in the environment
    ///
    /// `OPENAI_API_KEY` wins over `ANTHROPIC_API_KEY`. Returns `None` when
    /// neither is set, which selects placeholder content.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = var("OPENAI_API_KEY") {
            return Some(Self {
                backend: NarrativeBackend::OpenAI,
                api_key,
                api_base: var("OPENAI_API_BASE"),
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
            });
        }

        var("ANTHROPIC_API_KEY").map(|api_key| Self {
            backend: NarrativeBackend::Anthropic,
            api_key,
            api_base: None,
            model: var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Build the provider and wrap it in a writer
    pub fn into_writer(self) -> Result<LlmNarrativeWriter> {
        let provider: Arc<dyn LLMProvider> = match self.backend {
            NarrativeBackend::OpenAI => {
                let mut config = OpenAIConfig::new(self.api_key);
                if let Some(base) = self.api_base {
                    config = config.with_api_base(base);
                }
                Arc::new(OpenAIProvider::with_config(config)?)
            }
            NarrativeBackend::Anthropic => Arc::new(AnthropicProvider::new(self.api_key)?),
        };

        Ok(LlmNarrativeWriter::new(provider, self.model)?
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens))
    }
}

/// Narrative writer backed by an LLM provider, one completion per section
pub struct LlmNarrativeWriter {
    provider: Arc<dyn LLMProvider>,
    prompts: PromptLibrary,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl LlmNarrativeWriter {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            provider,
            prompts: PromptLibrary::new()?,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl NarrativeWriter for LlmNarrativeWriter {
    async fn generate(&self, section: Section, context: &Value) -> Result<String> {
        let prompt = self.prompts.render(section, context)?;

        let request = CompletionRequest::builder(&self.model)
            .system(SYSTEM_PROMPT)
            .add_message(Message::user(prompt))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        tracing::info!(%section, provider = self.provider.name(), model = %self.model, "Generating section");
        let response = self.provider.complete(request).await?;

        let text = response.text().trim();
        if text.is_empty() {
            return Err(ReportError::Narrative(format!(
                "empty completion for {section}"
            )));
        }

        tracing::info!(%section, tokens = response.usage.total(), "Section generated");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingProvider {
        reply: String,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for RecordingProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> flow_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            if self.reply == "fail" {
                return Err(LLMError::RateLimitExceeded("slow down".into()));
            }
            Ok(CompletionResponse {
                message: Message::assistant(self.reply.clone()),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn macro_context() -> Value {
        json!({
            "dxy_current": 106.5, "dxy_change": 0.3,
            "us10y_current": 4.4, "us10y_change": -5.0,
            "sp500_change": 1.0, "nvda_change": 2.0, "coin_change": 3.0,
        })
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let a = placeholder_text(Section::MacroAnalysis, "2024-12-09 ~ 2024-12-15");
        let b = placeholder_text(Section::MacroAnalysis, "2024-12-09 ~ 2024-12-15");
        assert_eq!(a, b);
        assert!(a.starts_with("[placeholder] macro_analysis for 2024-12-09 ~ 2024-12-15"));
    }

    #[test]
    fn test_config_prefers_openai() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:1234/v1"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]
        .into_iter()
        .collect();

        let config =
            NarrativeConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(config.backend, NarrativeBackend::OpenAI);
        assert_eq!(config.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:1234/v1"));
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 800);
    }

    #[test]
    fn test_config_falls_back_to_anthropic() {
        let config = NarrativeConfig::from_lookup(|k| {
            (k == "ANTHROPIC_API_KEY").then(|| "sk-ant".to_string())
        })
        .unwrap();
        assert_eq!(config.backend, NarrativeBackend::Anthropic);
        assert_eq!(config.model, DEFAULT_ANTHROPIC_MODEL);
    }

    #[test]
    fn test_config_absent_without_credentials() {
        assert!(NarrativeConfig::from_lookup(|_| None).is_none());
        assert!(NarrativeConfig::from_lookup(|_| Some("  ".to_string())).is_none());
    }

    #[tokio::test]
    async fn test_writer_sends_one_request_per_section() {
        let provider = Arc::new(RecordingProvider::new("  The dollar firmed.  "));
        let writer = LlmNarrativeWriter::new(provider.clone(), "test-model").unwrap();

        let text = writer
            .generate(Section::MacroAnalysis, &macro_context())
            .await
            .unwrap();
        assert_eq!(text, "The dollar firmed.");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(requests[0].max_tokens, 800);
        assert!(requests[0].messages[0].text().contains("106.50"));
    }

    #[tokio::test]
    async fn test_writer_maps_failures() {
        let writer =
            LlmNarrativeWriter::new(Arc::new(RecordingProvider::new("fail")), "m").unwrap();
        let err = writer
            .generate(Section::MacroAnalysis, &macro_context())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Narrative(_)));

        let writer = LlmNarrativeWriter::new(Arc::new(RecordingProvider::new("   ")), "m").unwrap();
        let err = writer
            .generate(Section::MacroAnalysis, &macro_context())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty completion"));
    }
}
