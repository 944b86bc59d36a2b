//! Shared utilities for research-flow
//!
//! Logging setup and the application-level configuration used by the
//! binaries.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
