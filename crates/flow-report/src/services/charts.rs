//! Chart descriptors for report modules
//!
//! Charts are written as JSON descriptors (title, axis labels, named series)
//! that a front end or exporter turns into images.

use async_trait::async_trait;
use flow_core::ModuleData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::catalog::DataModule;
use crate::error::{ReportError, Result};
use crate::series::{LiquidationSeries, MetricSeries, PriceSeries, decode, moving_average};

/// Renders the charts for one module of a run
///
/// Returns the artifact paths, possibly none. `task_id` scopes the artifacts
/// so concurrent runs never share a file.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(
        &self,
        task_id: &str,
        module: DataModule,
        data: &ModuleData,
    ) -> Result<Vec<PathBuf>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    /// One small panel per series
    Grid,
}

/// A named series on a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLine {
    pub label: String,
    pub dates: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl ChartLine {
    fn new(label: impl Into<String>, dates: &[String], values: &[f64]) -> Self {
        Self {
            label: label.into(),
            dates: dates.to_vec(),
            values: values.iter().copied().map(Some).collect(),
        }
    }
}

/// A chart descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// File stem, e.g. "btc_price"
    pub name: String,
    pub title: String,
    pub kind: ChartKind,
    pub y_label: String,
    pub series: Vec<ChartLine>,
}

impl ChartSpec {
    fn new(name: &str, title: &str, kind: ChartKind, y_label: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind,
            y_label: y_label.to_string(),
            series: Vec::new(),
        }
    }
}

/// Writes chart descriptors as pretty JSON under `<dir>/<task_id>/`
pub struct JsonChartRenderer {
    dir: PathBuf,
}

impl JsonChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, task_id: &str, spec: &ChartSpec) -> Result<PathBuf> {
        let run_dir = self.dir.join(task_id);
        tokio::fs::create_dir_all(&run_dir).await?;

        let path = run_dir.join(format!("{}.json", spec.name));
        tokio::fs::write(&path, serde_json::to_vec_pretty(spec)?).await?;

        tracing::debug!(path = %path.display(), "Chart written");
        Ok(path)
    }
}

#[async_trait]
impl ChartRenderer for JsonChartRenderer {
    async fn render(
        &self,
        task_id: &str,
        module: DataModule,
        data: &ModuleData,
    ) -> Result<Vec<PathBuf>> {
        let specs = module_charts(module, data)?;

        let mut paths = Vec::with_capacity(specs.len());
        for spec in &specs {
            paths.push(self.write(task_id, spec).await?);
        }

        tracing::info!(%module, charts = paths.len(), "Charts rendered");
        Ok(paths)
    }
}

/// Chart descriptors for a module's data
pub fn module_charts(module: DataModule, data: &ModuleData) -> Result<Vec<ChartSpec>> {
    let mut specs = Vec::new();
    match module {
        DataModule::Macro => {
            specs.push(macro_overview(data)?);
            if data.contains_key("nvda") || data.contains_key("coin") {
                specs.push(crypto_stocks(data)?);
            }
        }
        DataModule::Btc => {
            if let Some(value) = data.get("price") {
                specs.push(btc_price(&decode("btc", "price", value)?)?);
            }
            if let Some(value) = data.get("urpd") {
                specs.push(metric_chart(
                    &decode("btc", "urpd", value)?,
                    "btc_urpd",
                    "Bitcoin URPD - Unrealized Profit/Loss Distribution",
                    ChartKind::Bar,
                    "Supply",
                ));
            }
            if let Some(value) = data.get("etf_flow") {
                specs.push(metric_chart(
                    &decode("btc", "etf_flow", value)?,
                    "btc_etf_flow",
                    "Bitcoin ETF Daily Net Flow",
                    ChartKind::Bar,
                    "Net Flow",
                ));
            }
            if let Some(value) = data.get("whale_cohort") {
                specs.push(metric_chart(
                    &decode("btc", "whale_cohort", value)?,
                    "btc_whale_cohort",
                    "Bitcoin Whale Cohort Analysis (1,000 - 10,000 BTC)",
                    ChartKind::Line,
                    "Balance (BTC)",
                ));
            }
            if let Some(value) = data.get("liquidation") {
                specs.push(liquidation(&decode("btc", "liquidation", value)?));
            }
        }
        DataModule::Eth => {
            if let Some(value) = data.get("eth_btc_ratio") {
                specs.push(eth_btc_ratio(value)?);
            }
        }
        DataModule::News => {}
    }
    Ok(specs)
}

fn price_section(data: &ModuleData, module: &str, section: &str) -> Result<Option<PriceSeries>> {
    data.get(section)
        .map(|value| decode::<PriceSeries>(module, section, value))
        .transpose()
        .map(|series| series.filter(|s| !s.is_empty()))
}

fn macro_overview(data: &ModuleData) -> Result<ChartSpec> {
    let mut spec = ChartSpec::new(
        "macro_overview",
        "Macro Overview: Key Indicators",
        ChartKind::Grid,
        "Value",
    );
    for (key, label) in [
        ("dxy", "US Dollar Index (DXY)"),
        ("us10y", "10-Year Treasury Yield"),
        ("sp500", "S&P 500 Index"),
        ("nvda", "NVIDIA Stock Price"),
    ] {
        if let Some(series) = price_section(data, "macro", key)? {
            spec.series.push(ChartLine::new(label, &series.dates, &series.close));
        }
    }
    Ok(spec)
}

/// Equity closes rebased so the first day is 100
fn crypto_stocks(data: &ModuleData) -> Result<ChartSpec> {
    let mut spec = ChartSpec::new(
        "crypto_stocks",
        "Crypto-Related Stocks Performance Comparison",
        ChartKind::Line,
        "Normalized Price (First Day = 100)",
    );
    for (key, label) in [
        ("nvda", "NVIDIA (NVDA)"),
        ("coin", "Coinbase (COIN)"),
        ("mstr", "MicroStrategy (MSTR)"),
    ] {
        let Some(series) = price_section(data, "macro", key)? else {
            continue;
        };
        let base = series.close[0];
        if base == 0.0 {
            continue;
        }
        let rebased: Vec<f64> = series.close.iter().map(|p| p / base * 100.0).collect();
        spec.series.push(ChartLine::new(label, &series.dates, &rebased));
    }
    Ok(spec)
}

fn btc_price(price: &PriceSeries) -> Result<ChartSpec> {
    let mut spec = ChartSpec::new(
        "btc_price",
        "Bitcoin Price Chart with Moving Averages",
        ChartKind::Line,
        "Price (USD)",
    );
    spec.series
        .push(ChartLine::new("BTC Price", &price.dates, &price.close));
    for period in [50, 200] {
        spec.series.push(ChartLine {
            label: format!("MA{period}"),
            dates: price.dates.clone(),
            values: moving_average(&price.close, period)?,
        });
    }
    Ok(spec)
}

fn metric_chart(
    metric: &MetricSeries,
    name: &str,
    title: &str,
    kind: ChartKind,
    y_label: &str,
) -> ChartSpec {
    let mut spec = ChartSpec::new(name, title, kind, y_label);
    spec.series
        .push(ChartLine::new(y_label, &metric.dates, &metric.values));
    spec
}

fn liquidation(series: &LiquidationSeries) -> ChartSpec {
    let mut spec = ChartSpec::new(
        "btc_liquidation",
        "Bitcoin Liquidation Heatmap (Long vs Short)",
        ChartKind::Bar,
        "Liquidations (USD)",
    );
    spec.series.push(ChartLine::new(
        "Long Liquidations",
        &series.dates,
        &series.long_liquidation,
    ));
    spec.series.push(ChartLine::new(
        "Short Liquidations",
        &series.dates,
        &series.short_liquidation,
    ));
    spec
}

/// ETH close divided by BTC close, day by day
fn eth_btc_ratio(value: &Value) -> Result<ChartSpec> {
    let pair = |side: &str| -> Result<PriceSeries> {
        let section = value.get(side).ok_or_else(|| {
            ReportError::unavailable("eth", format!("eth_btc_ratio is missing '{side}'"))
        })?;
        decode("eth", "eth_btc_ratio", section)
    };
    let eth = pair("eth")?;
    let btc = pair("btc")?;

    let ratio = eth
        .close
        .iter()
        .zip(&btc.close)
        .map(|(e, b)| (*b != 0.0).then(|| e / b))
        .collect::<Vec<_>>();

    let mut spec = ChartSpec::new(
        "eth_btc_ratio",
        "Ethereum vs Bitcoin Price Ratio",
        ChartKind::Line,
        "ETH/BTC Ratio",
    );
    spec.series.push(ChartLine {
        label: "ETH/BTC".to_string(),
        dates: eth.dates.iter().take(ratio.len()).cloned().collect(),
        values: ratio,
    });
    Ok(spec)
}
