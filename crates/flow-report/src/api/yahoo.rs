//! Yahoo Finance client for daily closes

use chrono::{Duration, Utc};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::format_day;
use crate::error::{ReportError, Result};
use crate::series::PriceSeries;

/// Tickers used by the report modules
pub mod tickers {
    /// US Dollar Index
    pub const DXY: &str = "DX-Y.NYB";
    /// 10-Year Treasury yield
    pub const US10Y: &str = "^TNX";
    /// S&P 500 Index
    pub const SP500: &str = "^GSPC";
    pub const NVDA: &str = "NVDA";
    pub const COIN: &str = "COIN";
    /// MicroStrategy
    pub const MSTR: &str = "MSTR";
    pub const BTC_USD: &str = "BTC-USD";
    pub const ETH_USD: &str = "ETH-USD";
}

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API client
#[derive(Debug, Default, Clone)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self {}
    }

    /// Daily closes for the last `days` days, oldest first
    ///
    /// An empty history is not an error; callers get an empty series.
    pub async fn daily_closes(&self, symbol: &str, days: u32) -> Result<PriceSeries> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| ReportError::upstream(PROVIDER, e.to_string()))?;

        let end = Utc::now();
        let start = end - Duration::days(i64::from(days));

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| ReportError::upstream(PROVIDER, format!("invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| ReportError::upstream(PROVIDER, format!("invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| ReportError::upstream(PROVIDER, format!("{symbol}: {e}")))?;

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "No quotes returned");
                return Ok(PriceSeries::default());
            }
        };

        let mut series = PriceSeries::default();
        for quote in quotes {
            let Some(date) = format_day(quote.timestamp as i64) else {
                continue;
            };
            series.dates.push(date);
            series.close.push(quote.close);
            series.volume.push(quote.volume as f64);
        }

        tracing::info!(symbol, points = series.close.len(), "Fetched daily closes");
        Ok(series)
    }
}
