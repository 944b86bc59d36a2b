//! Glassnode on-chain metrics client
//!
//! Every metric is requested at daily resolution and returned as
//! `[{"t": <unix seconds>, "v": <value>}]`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;

use super::{SharedRateLimiter, check_status, format_day, rate_limiter};
use crate::error::Result;
use crate::series::MetricSeries;

const GLASSNODE_BASE_URL: &str = "https://api.glassnode.com/v1/metrics";
const PROVIDER: &str = "Glassnode";

/// Metric paths under the Glassnode metrics endpoint
pub mod metrics {
    /// Balance held by the top 1% of addresses (URPD view)
    pub const URPD: &str = "distribution/balance_1pct_holders";
    /// Spent output profit ratio (ETF flow view)
    pub const ETF_FLOW: &str = "indicators/sopr";
    /// Balance of addresses holding 1k to 10k coins
    pub const WHALE_COHORT: &str = "distribution/balance_1k_10k";
}

#[derive(Debug, Deserialize)]
struct Point {
    t: i64,
    #[serde(default)]
    v: Option<f64>,
}

/// Glassnode API client
pub struct GlassnodeClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl GlassnodeClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - Glassnode API key
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            base_url: GLASSNODE_BASE_URL.to_string(),
            rate_limiter: rate_limiter(60),
        })
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Daily values of `metric` for `asset` over the last `days` days
    ///
    /// Points without a numeric value are skipped.
    pub async fn metric(&self, metric: &str, asset: &str, days: u32) -> Result<MetricSeries> {
        self.rate_limiter.until_ready().await;

        let since = (Utc::now() - Duration::days(i64::from(days))).timestamp();
        let url = format!("{}/{}", self.base_url, metric);
        tracing::debug!(%url, asset, since, "Glassnode request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("a", asset.to_string()),
                ("api_key", self.api_key.clone()),
                ("s", since.to_string()),
                ("i", "24h".to_string()),
            ])
            .send()
            .await?;

        let points: Vec<Point> = check_status(PROVIDER, response).await?.json().await?;
        let series = to_series(points);

        tracing::info!(metric, asset, points = series.values.len(), "Fetched Glassnode metric");
        Ok(series)
    }
}

fn to_series(points: Vec<Point>) -> MetricSeries {
    let mut series = MetricSeries::default();
    for point in points {
        let (Some(value), Some(date)) = (point.v, format_day(point.t)) else {
            continue;
        };
        series.dates.push(date);
        series.values.push(value);
    }
    series
}
