//! Coinglass liquidation history client
//!
//! [`synthetic_liquidations`] stands in for the live series when no API key
//! is configured.

use chrono::{Days, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use super::{SharedRateLimiter, check_status, format_day, rate_limiter};
use crate::error::{ReportError, Result};
use crate::series::LiquidationSeries;

const COINGLASS_URL: &str = "https://open-api.coinglass.com/public/v2/liquidation_history";
const PROVIDER: &str = "Coinglass";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    /// Milliseconds since epoch
    t: i64,
    #[serde(default)]
    long_vol_usd: f64,
    #[serde(default)]
    short_vol_usd: f64,
}

/// Coinglass API client
pub struct CoinglassClient {
    client: Client,
    api_key: Option<String>,
    url: String,
    rate_limiter: SharedRateLimiter,
}

impl CoinglassClient {
    pub fn new(api_key: Option<String>, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            url: COINGLASS_URL.to_string(),
            rate_limiter: rate_limiter(30),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Daily long and short liquidations for the last `days` days
    pub async fn fetch_liquidations(&self, symbol: &str, days: u32) -> Result<LiquidationSeries> {
        let Some(api_key) = &self.api_key else {
            return Err(ReportError::Config("COINGLASS_API_KEY is not set".to_string()));
        };
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(&self.url)
            .header("coinglassSecret", api_key)
            .query(&[("symbol", symbol), ("interval", "1d")])
            .send()
            .await?;

        let envelope: Envelope = check_status(PROVIDER, response).await?.json().await?;

        // keep the most recent `days` entries, oldest first
        let mut entries = envelope.data;
        entries.sort_by_key(|entry| entry.t);
        let skip = entries.len().saturating_sub(days as usize);

        let mut series = LiquidationSeries::default();
        for entry in entries.into_iter().skip(skip) {
            let Some(date) = format_day(entry.t / 1000) else {
                continue;
            };
            series.dates.push(date);
            series.long_liquidation.push(entry.long_vol_usd);
            series.short_liquidation.push(entry.short_vol_usd);
        }

        tracing::info!(symbol, points = series.dates.len(), "Fetched liquidations");
        Ok(series)
    }
}

/// Development series: day `i` back from `today` carries longs of
/// `1_000_000 * (i + 1)` and shorts of `800_000 * (i + 1)`
pub fn synthetic_liquidations(today: NaiveDate, days: u32) -> LiquidationSeries {
    let mut series = LiquidationSeries::default();
    for i in 0..days {
        let date = today
            .checked_sub_days(Days::new(u64::from(i)))
            .unwrap_or(today);
        let factor = f64::from(i + 1);
        series.dates.push(date.format("%Y-%m-%d").to_string());
        series.long_liquidation.push(1_000_000.0 * factor);
        series.short_liquidation.push(800_000.0 * factor);
    }
    series
}
