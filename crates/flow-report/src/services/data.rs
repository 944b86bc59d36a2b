//! Data acquisition for report modules

use async_trait::async_trait;
use chrono::Utc;
use flow_core::ModuleData;
use serde::Serialize;
use serde_json::{Value, json};

use crate::api::{
    CoinglassClient, GlassnodeClient, YahooFinanceClient, glassnode_metrics,
    synthetic_liquidations, tickers,
};
use crate::cache::{CacheKey, SeriesCache};
use crate::catalog::DataModule;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::retry::RetryPolicy;
use crate::series::LiquidationSeries;

/// Parameters for one module fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub report_period: String,
    pub history_days: u32,
    pub whale_history_days: u32,
    pub liquidation_days: u32,
}

impl FetchRequest {
    pub fn new(report_period: impl Into<String>, config: &ReportConfig) -> Self {
        Self {
            report_period: report_period.into(),
            history_days: config.history_days,
            whale_history_days: config.whale_history_days,
            liquidation_days: config.liquidation_days,
        }
    }
}

/// Source of module data
///
/// Implementations return section name -> series for a module, or
/// [`ReportError::DataUnavailable`] when the module cannot be produced.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, module: DataModule, request: &FetchRequest) -> Result<ModuleData>;
}

/// Live market data from Yahoo Finance, Glassnode and Coinglass
///
/// Every series goes through the shared [`SeriesCache`] and the retry policy.
pub struct MarketDataSource {
    yahoo: YahooFinanceClient,
    glassnode: Option<GlassnodeClient>,
    coinglass: CoinglassClient,
    cache: SeriesCache,
    retry: RetryPolicy,
}

impl MarketDataSource {
    pub fn new(config: &ReportConfig) -> Result<Self> {
        let glassnode = config
            .glassnode_api_key
            .as_ref()
            .map(|key| GlassnodeClient::new(key.clone(), config.request_timeout))
            .transpose()?;

        Ok(Self {
            yahoo: YahooFinanceClient::new(),
            glassnode,
            coinglass: CoinglassClient::new(
                config.coinglass_api_key.clone(),
                config.request_timeout,
            )?,
            cache: SeriesCache::new(config.cache_ttl),
            retry: config.retry.clone(),
        })
    }

    /// Share an existing cache between sources
    pub fn with_cache(mut self, cache: SeriesCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    async fn price(&self, symbol: &str, days: u32) -> Result<Value> {
        let key = CacheKey::new("yahoo", symbol, days);
        self.cache
            .get_or_fetch(key, || {
                self.retry.execute(symbol, || async move {
                    to_value(&self.yahoo.daily_closes(symbol, days).await?)
                })
            })
            .await
    }

    async fn metric(&self, metric: &str, days: u32) -> Result<Value> {
        let Some(glassnode) = &self.glassnode else {
            return Err(ReportError::unavailable(
                DataModule::Btc.as_str(),
                "GLASSNODE_API_KEY is not set",
            ));
        };

        let key = CacheKey::new("glassnode", metric, days);
        self.cache
            .get_or_fetch(key, || {
                self.retry.execute(metric, || async move {
                    to_value(&glassnode.metric(metric, "BTC", days).await?)
                })
            })
            .await
    }

    /// Liquidations never fail the module: no key serves the synthetic
    /// series and an exhausted retry serves an empty one. Neither is cached.
    async fn liquidations(&self, days: u32) -> Result<Value> {
        if !self.coinglass.has_api_key() {
            tracing::warn!("COINGLASS_API_KEY not set, using synthetic liquidations");
            return to_value(&synthetic_liquidations(Utc::now().date_naive(), days));
        }

        let key = CacheKey::new("coinglass", "BTC", days);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(days, "Liquidations served from cache");
            return Ok(cached);
        }

        let coinglass = &self.coinglass;
        let fetched = self
            .retry
            .execute("coinglass", || async move {
                coinglass.fetch_liquidations("BTC", days).await
            })
            .await;

        match fetched {
            Ok(series) if !series.dates.is_empty() => {
                let value = to_value(&series)?;
                self.cache.insert(key, value.clone()).await;
                Ok(value)
            }
            Ok(series) => to_value(&series),
            Err(e) => {
                tracing::warn!(error = %e, "Coinglass request failed, returning empty liquidations");
                to_value(&LiquidationSeries::default())
            }
        }
    }

    async fn fetch_macro(&self, days: u32) -> Result<ModuleData> {
        let mut data = ModuleData::new();
        for (section, symbol) in [
            ("dxy", tickers::DXY),
            ("us10y", tickers::US10Y),
            ("sp500", tickers::SP500),
            ("nvda", tickers::NVDA),
            ("coin", tickers::COIN),
            ("mstr", tickers::MSTR),
        ] {
            data.insert(section.to_string(), self.price(symbol, days).await?);
        }
        Ok(data)
    }

    async fn fetch_btc(&self, request: &FetchRequest) -> Result<ModuleData> {
        if self.glassnode.is_none() {
            return Err(ReportError::unavailable(
                DataModule::Btc.as_str(),
                "GLASSNODE_API_KEY is not set",
            ));
        }

        let days = request.history_days;
        let mut data = ModuleData::new();
        data.insert("price".into(), self.price(tickers::BTC_USD, days).await?);
        data.insert("urpd".into(), self.metric(glassnode_metrics::URPD, days).await?);
        data.insert(
            "etf_flow".into(),
            self.metric(glassnode_metrics::ETF_FLOW, days).await?,
        );
        data.insert(
            "whale_cohort".into(),
            self.metric(glassnode_metrics::WHALE_COHORT, request.whale_history_days)
                .await?,
        );
        data.insert(
            "liquidation".into(),
            self.liquidations(request.liquidation_days).await?,
        );
        Ok(data)
    }

    async fn fetch_eth(&self, days: u32) -> Result<ModuleData> {
        let eth = self.price(tickers::ETH_USD, days).await?;
        let btc = self.price(tickers::BTC_USD, days).await?;

        let mut data = ModuleData::new();
        data.insert("price".into(), eth.clone());
        data.insert("eth_btc_ratio".into(), json!({ "eth": eth, "btc": btc }));
        Ok(data)
    }
}

#[async_trait]
impl DataSource for MarketDataSource {
    async fn fetch(&self, module: DataModule, request: &FetchRequest) -> Result<ModuleData> {
        tracing::info!(%module, period = %request.report_period, "Fetching module data");

        let data = match module {
            DataModule::Macro => self.fetch_macro(request.history_days).await,
            DataModule::Btc => self.fetch_btc(request).await,
            DataModule::Eth => self.fetch_eth(request.history_days).await,
            DataModule::News => Ok(news_placeholder()),
        }
        .map_err(|e| match e {
            ReportError::DataUnavailable { .. } => e,
            other => ReportError::unavailable(module.as_str(), other.to_string()),
        })?;

        tracing::info!(%module, sections = data.len(), "Module data ready");
        Ok(data)
    }
}

/// The news module carries an empty headline list until a feed is wired in
fn news_placeholder() -> ModuleData {
    let mut data = ModuleData::new();
    data.insert("top_news".to_string(), json!([]));
    data
}

fn to_value<T: Serialize>(series: &T) -> Result<Value> {
    Ok(serde_json::to_value(series)?)
}
