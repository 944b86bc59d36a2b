//! Configuration management utilities

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogFormat;

/// Errors raised while reading application configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown log format: {0} (expected 'pretty' or 'json')")]
    InvalidLogFormat(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "research-flow".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Defaults overridden by `APP_ENV` and `LOG_FORMAT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(env) = lookup("APP_ENV").filter(|v| !v.is_empty()) {
            config.environment = env;
        }
        if let Some(format) = lookup("LOG_FORMAT").filter(|v| !v.is_empty()) {
            config.log_format = format.parse()?;
        }
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.app_name, "research-flow");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.is_production());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [("APP_ENV", "production"), ("LOG_FORMAT", "json")]
            .into_iter()
            .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        assert!(config.is_production());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_log_format_is_rejected() {
        let err = Config::from_lookup(|k| (k == "LOG_FORMAT").then(|| "yaml".to_string()))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogFormat("yaml".to_string()));
    }

    #[test]
    fn test_log_format_defaults_when_missing_from_json() {
        let config: Config =
            serde_json::from_str(r#"{"app_name":"x","environment":"dev"}"#).unwrap();
        assert_eq!(config.log_format, LogFormat::Pretty);
    }
}
