//! Configuration for report runs

use std::path::PathBuf;
use std::time::Duration;

use flow_graph::DEFAULT_STEP_LIMIT;
use serde::{Deserialize, Serialize};

use crate::catalog::DataModule;
use crate::error::{ReportError, Result};
use crate::retry::RetryPolicy;

/// Where a rejected draft goes after a debate round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionMode {
    /// Debate -> Narrative Drafter -> Reviewer
    #[default]
    Redraft,
    /// Debate -> Reviewer, regrading the existing draft
    ReviewOnly,
}

/// Configuration for report runs
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Data modules to fetch, in order
    pub modules: Vec<DataModule>,

    /// Lookback window for price and on-chain series
    pub history_days: u32,

    /// Lookback window for the whale cohort metric
    pub whale_history_days: u32,

    /// Lookback window for liquidations
    pub liquidation_days: u32,

    /// Upper bound on debate rounds
    pub max_debate_rounds: u32,

    pub revision_mode: RevisionMode,

    /// Root for charts and archived reports
    pub output_dir: PathBuf,

    /// Lifespan of cached series
    pub cache_ttl: Duration,

    /// Retry policy for upstream API calls
    pub retry: RetryPolicy,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Glassnode API key (required for the btc module)
    pub glassnode_api_key: Option<String>,

    /// Coinglass API key (synthetic liquidations without it)
    pub coinglass_api_key: Option<String>,

    /// Explicit cap on graph steps per run; derived from
    /// `max_debate_rounds` when unset
    pub step_limit: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            modules: vec![DataModule::Macro],
            history_days: 30,
            whale_history_days: 90,
            liquidation_days: 7,
            max_debate_rounds: 2,
            revision_mode: RevisionMode::Redraft,
            output_dir: PathBuf::from("output"),
            cache_ttl: Duration::from_secs(12 * 60 * 60),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            glassnode_api_key: None,
            coinglass_api_key: None,
            step_limit: None,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Load API keys from `GLASSNODE_API_KEY` and `COINGLASS_API_KEY`
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("GLASSNODE_API_KEY") {
            self.glassnode_api_key = Some(key);
        }
        if let Some(key) = non_empty("COINGLASS_API_KEY") {
            self.coinglass_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.modules.is_empty() {
            return Err(ReportError::Config(
                "at least one data module is required".to_string(),
            ));
        }

        for (i, module) in self.modules.iter().enumerate() {
            if self.modules[..i].contains(module) {
                return Err(ReportError::Config(format!(
                    "data module '{module}' is listed twice"
                )));
            }
        }

        if self.history_days == 0 || self.whale_history_days == 0 || self.liquidation_days == 0 {
            return Err(ReportError::Config(
                "lookback windows must be at least one day".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ReportError::Config(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.step_limit == Some(0) {
            return Err(ReportError::Config(
                "step_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Step cap handed to the graph driver
    ///
    /// Without an explicit limit this covers the longest legal path: five
    /// steps to the first review, up to three per debate round, and the
    /// final debate and review.
    pub fn effective_step_limit(&self) -> usize {
        self.step_limit.unwrap_or_else(|| {
            let rounds = usize::try_from(self.max_debate_rounds).unwrap_or(usize::MAX);
            rounds
                .saturating_mul(3)
                .saturating_add(7)
                .max(DEFAULT_STEP_LIMIT)
        })
    }

    /// Directory for chart artifacts
    pub fn chart_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    /// Directory for archived reports
    pub fn report_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }
}

/// Builder for ReportConfig
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    modules: Option<Vec<DataModule>>,
    history_days: Option<u32>,
    max_debate_rounds: Option<u32>,
    revision_mode: Option<RevisionMode>,
    output_dir: Option<PathBuf>,
    cache_ttl: Option<Duration>,
    retry: Option<RetryPolicy>,
    request_timeout: Option<Duration>,
    glassnode_api_key: Option<String>,
    coinglass_api_key: Option<String>,
    step_limit: Option<usize>,
}

impl ReportConfigBuilder {
    pub fn modules(mut self, modules: Vec<DataModule>) -> Self {
        self.modules = Some(modules);
        self
    }

    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    pub fn max_debate_rounds(mut self, rounds: u32) -> Self {
        self.max_debate_rounds = Some(rounds);
        self
    }

    pub fn revision_mode(mut self, mode: RevisionMode) -> Self {
        self.revision_mode = Some(mode);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn glassnode_api_key(mut self, key: impl Into<String>) -> Self {
        self.glassnode_api_key = Some(key.into());
        self
    }

    pub fn coinglass_api_key(mut self, key: impl Into<String>) -> Self {
        self.coinglass_api_key = Some(key.into());
        self
    }

    pub fn step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ReportConfig> {
        let defaults = ReportConfig::default();

        let config = ReportConfig {
            modules: self.modules.unwrap_or(defaults.modules),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            max_debate_rounds: self.max_debate_rounds.unwrap_or(defaults.max_debate_rounds),
            revision_mode: self.revision_mode.unwrap_or(defaults.revision_mode),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            retry: self.retry.unwrap_or(defaults.retry),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            glassnode_api_key: self.glassnode_api_key,
            coinglass_api_key: self.coinglass_api_key,
            step_limit: self.step_limit,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
