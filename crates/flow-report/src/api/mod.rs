//! API clients for market data providers

pub mod coinglass;
pub mod glassnode;
pub mod yahoo;

pub use coinglass::{CoinglassClient, synthetic_liquidations};
pub use glassnode::{GlassnodeClient, metrics as glassnode_metrics};
pub use yahoo::{YahooFinanceClient, tickers};

use chrono::DateTime;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::{ReportError, Result};

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a per-minute rate limiter, falling back to one request per minute on 0
pub(crate) fn rate_limiter(per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Map a non-success status to a typed error
///
/// 429 becomes [`ReportError::RateLimitExceeded`]; anything else becomes an
/// upstream error whose detail starts with `HTTP <code>` so the retry policy
/// can tell server faults from client faults.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 429 {
        return Err(ReportError::RateLimitExceeded {
            provider: provider.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(ReportError::upstream(
        provider,
        format!("HTTP {}: {}", status.as_u16(), body.trim()),
    ))
}

/// Format a unix timestamp (seconds) as `YYYY-MM-DD` in UTC
pub(crate) fn format_day(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_day() {
        // 2024-12-09T00:00:00Z
        assert_eq!(format_day(1_733_702_400).as_deref(), Some("2024-12-09"));
        assert_eq!(format_day(i64::MAX), None);
    }

    #[test]
    fn test_rate_limiter_allows_first_request() {
        let limiter = rate_limiter(0);
        assert!(limiter.check().is_ok());
    }
}
