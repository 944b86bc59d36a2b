//! Prompt context preparation
//!
//! Turns collected series into the figures each section prompt quotes:
//! current values, weekly percentage changes, ranges and moving averages.

use flow_core::{ModuleData, SectionMap};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::catalog::{DataModule, Section};
use crate::error::{ReportError, Result};
use crate::series::{MetricSeries, PriceSeries, decode, moving_average};

/// Characters of each drafted section quoted in the summary prompt
const EXCERPT_CHARS: usize = 200;

/// Build the template context for `section`
///
/// `drafted` holds sections already written in this pass; the summary quotes
/// them. Fails with [`ReportError::DataUnavailable`] when the module the
/// section depends on was not collected.
pub fn prepare_context(
    section: Section,
    raw_data: &BTreeMap<String, ModuleData>,
    drafted: &SectionMap,
) -> Result<Value> {
    match section {
        Section::MacroAnalysis => macro_context(module(raw_data, DataModule::Macro)?),
        Section::BtcAnalysis => btc_context(
            module(raw_data, DataModule::Btc)?,
            raw_data.get(DataModule::Macro.as_str()),
        ),
        Section::OnchainAnalysis => onchain_context(module(raw_data, DataModule::Btc)?),
        Section::Summary => summary_context(raw_data, drafted),
    }
}

fn module(raw_data: &BTreeMap<String, ModuleData>, module: DataModule) -> Result<&ModuleData> {
    raw_data
        .get(module.as_str())
        .ok_or_else(|| ReportError::unavailable(module.as_str(), "no data collected"))
}

fn price(data: &ModuleData, module: &str, section: &str) -> Result<PriceSeries> {
    data.get(section)
        .map(|value| decode(module, section, value))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn macro_context(data: &ModuleData) -> Result<Value> {
    let dxy = price(data, "macro", "dxy")?;
    let us10y = price(data, "macro", "us10y")?;
    let change = |key: &str| -> Result<f64> { Ok(price(data, "macro", key)?.weekly_change()) };

    Ok(json!({
        "dxy_current": round2(dxy.latest().unwrap_or_default()),
        "dxy_change": round2(dxy.weekly_change()),
        "us10y_current": round2(us10y.latest().unwrap_or_default()),
        // percent change expressed in basis points
        "us10y_change": round2(us10y.weekly_change() * 100.0),
        "sp500_change": round2(change("sp500")?),
        "nvda_change": round2(change("nvda")?),
        "coin_change": round2(change("coin")?),
    }))
}

fn btc_context(data: &ModuleData, macro_data: Option<&ModuleData>) -> Result<Value> {
    let btc = price(data, "btc", "price")?;
    if btc.is_empty() {
        return Err(ReportError::unavailable("btc", "no BTC price history"));
    }

    let mut indicators = Vec::new();
    for period in [7, 30] {
        let latest = moving_average(&btc.close, period)?
            .last()
            .copied()
            .flatten();
        indicators.push(json!({
            "name": format!("MA{period}"),
            "value": latest.map(round2),
        }));
    }

    let macro_context = match macro_data {
        Some(m) => {
            let dxy = price(m, "macro", "dxy")?.latest();
            let us10y = price(m, "macro", "us10y")?.latest();
            json!({ "dxy": dxy.map(round2), "us10y": us10y.map(round2) })
        }
        None => Value::Null,
    };

    Ok(json!({
        "current_price": round2(btc.latest().unwrap_or_default()),
        "weekly_change": round2(btc.weekly_change()),
        "high_30d": round2(btc.high().unwrap_or_default()),
        "low_30d": round2(btc.low().unwrap_or_default()),
        "technical_indicators": indicators,
        "macro_context": macro_context,
    }))
}

fn metric_summary(data: &ModuleData, section: &str, label: &str) -> Result<String> {
    let Some(value) = data.get(section) else {
        return Ok(format!("{label}: no data"));
    };
    let metric: MetricSeries = decode("btc", section, value)?;
    Ok(match metric.latest() {
        Some(latest) => format!(
            "{label}: latest {:.2}, {:+.2}% over {} days",
            latest,
            metric.window_change(),
            metric.values.len()
        ),
        None => format!("{label}: no data"),
    })
}

fn onchain_context(data: &ModuleData) -> Result<Value> {
    Ok(json!({
        "urpd_summary": metric_summary(data, "urpd", "Top 1% holder balance")?,
        "etf_summary": metric_summary(data, "etf_flow", "SOPR")?,
        "whale_summary": metric_summary(data, "whale_cohort", "1k-10k BTC cohort balance")?,
    }))
}

fn summary_context(raw_data: &BTreeMap<String, ModuleData>, drafted: &SectionMap) -> Result<Value> {
    let mut key_metrics = Vec::new();

    if let Some(data) = raw_data.get(DataModule::Macro.as_str()) {
        let dxy = price(data, "macro", "dxy")?;
        if let Some(latest) = dxy.latest() {
            key_metrics.push(format!(
                "DXY {latest:.2} ({:+.2}% w/w)",
                dxy.weekly_change()
            ));
        }
        let us10y = price(data, "macro", "us10y")?;
        if let Some(latest) = us10y.latest() {
            key_metrics.push(format!(
                "US10Y {latest:.2}% ({:+.2} bps w/w)",
                us10y.weekly_change() * 100.0
            ));
        }
    }

    for (module, section, label) in [(DataModule::Btc, "price", "BTC"), (DataModule::Eth, "price", "ETH")] {
        if let Some(data) = raw_data.get(module.as_str()) {
            let series = price(data, module.as_str(), section)?;
            if let Some(latest) = series.latest() {
                key_metrics.push(format!(
                    "{label} ${latest:.2} ({:+.2}% w/w)",
                    series.weekly_change()
                ));
            }
        }
    }

    let main_observations: Vec<String> = drafted
        .iter()
        .filter(|(key, _)| key.as_str() != Section::Summary.as_str())
        .map(|(key, text)| {
            let excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
            format!("{key}: {excerpt}")
        })
        .collect();

    Ok(json!({
        "key_metrics": key_metrics,
        "main_observations": main_observations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: &[f64]) -> Value {
        let dates: Vec<String> = (0..values.len())
            .map(|i| format!("2024-12-{:02}", i + 1))
            .collect();
        json!({ "dates": dates, "close": values })
    }

    fn raw(module: &str, sections: &[(&str, Value)]) -> BTreeMap<String, ModuleData> {
        let data = sections
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        BTreeMap::from([(module.to_string(), data)])
    }

    #[test]
    fn test_macro_context_changes() {
        let week = [100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 101.0];
        let raw = raw(
            "macro",
            &[
                ("dxy", closes(&week)),
                ("us10y", closes(&[4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.2])),
                ("sp500", closes(&[1.0, 2.0])),
            ],
        );

        let ctx = prepare_context(Section::MacroAnalysis, &raw, &SectionMap::new()).unwrap();
        assert_eq!(ctx["dxy_current"], 101.0);
        assert_eq!(ctx["dxy_change"], 1.0);
        assert_eq!(ctx["us10y_current"], 4.2);
        // 5% expressed in bps
        assert_eq!(ctx["us10y_change"], 500.0);
        // fewer than seven closes
        assert_eq!(ctx["sp500_change"], 0.0);
        assert_eq!(ctx["nvda_change"], 0.0);
    }

    #[test]
    fn test_missing_module_is_unavailable() {
        let err = prepare_context(Section::BtcAnalysis, &BTreeMap::new(), &SectionMap::new())
            .unwrap_err();
        assert!(matches!(err, ReportError::DataUnavailable { ref module, .. } if module == "btc"));
    }

    #[test]
    fn test_btc_context_moving_averages() {
        let raw = raw("btc", &[("price", closes(&[10.0; 10]))]);
        let ctx = prepare_context(Section::BtcAnalysis, &raw, &SectionMap::new()).unwrap();

        assert_eq!(ctx["current_price"], 10.0);
        assert_eq!(ctx["technical_indicators"][0]["name"], "MA7");
        assert_eq!(ctx["technical_indicators"][0]["value"], 10.0);
        assert!(ctx["technical_indicators"][1]["value"].is_null());
        assert!(ctx["macro_context"].is_null());
    }

    #[test]
    fn test_onchain_context_without_metrics() {
        let raw = raw("btc", &[("price", closes(&[1.0]))]);
        let ctx = prepare_context(Section::OnchainAnalysis, &raw, &SectionMap::new()).unwrap();
        assert_eq!(ctx["urpd_summary"], "Top 1% holder balance: no data");
    }

    #[test]
    fn test_summary_quotes_drafted_sections() {
        let raw = raw("macro", &[("dxy", closes(&[106.0]))]);
        let drafted = SectionMap::from([(
            "macro_analysis".to_string(),
            "a".repeat(500),
        )]);

        let ctx = prepare_context(Section::Summary, &raw, &drafted).unwrap();
        assert_eq!(ctx["key_metrics"][0], "DXY 106.00 (+0.00% w/w)");
        let observation = ctx["main_observations"][0].as_str().unwrap();
        assert_eq!(observation.len(), "macro_analysis: ".len() + EXCERPT_CHARS);
    }
}
