//! Typed views over the JSON series stored in `raw_data`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

use crate::error::{ReportError, Result};

/// Daily closes for one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// `YYYY-MM-DD`, oldest first
    pub dates: Vec<String>,
    pub close: Vec<f64>,
    #[serde(default)]
    pub volume: Vec<f64>,
}

impl PriceSeries {
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.close.last().copied()
    }

    /// Percent change from the seventh-latest close to the latest
    ///
    /// Zero when fewer than seven closes exist.
    pub fn weekly_change(&self) -> f64 {
        percent_change_over(&self.close, 7)
    }

    pub fn high(&self) -> Option<f64> {
        self.close.iter().copied().reduce(f64::max)
    }

    pub fn low(&self) -> Option<f64> {
        self.close.iter().copied().reduce(f64::min)
    }
}

/// A single on-chain metric sampled daily
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

impl MetricSeries {
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Percent change across the whole window
    pub fn window_change(&self) -> f64 {
        percent_change_over(&self.values, self.values.len())
    }
}

/// Long and short liquidations per day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidationSeries {
    pub dates: Vec<String>,
    pub long_liquidation: Vec<f64>,
    pub short_liquidation: Vec<f64>,
}

/// Percent change between the value `lookback` places from the end and the
/// last value
pub fn percent_change_over(values: &[f64], lookback: usize) -> f64 {
    if lookback < 2 || values.len() < lookback {
        return 0.0;
    }
    let base = values[values.len() - lookback];
    let last = values[values.len() - 1];
    if base == 0.0 {
        return 0.0;
    }
    (last - base) / base * 100.0
}

/// Simple moving average aligned with `values`
///
/// Positions before the window fills are `None`.
pub fn moving_average(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)
        .map_err(|e| ReportError::Chart(format!("invalid SMA period {period}: {e}")))?;

    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let average = sma.next(value);
            (i + 1 >= period).then_some(average)
        })
        .collect())
}

/// Decode a stored series, naming the module and section on failure
pub fn decode<T>(module: &str, section: &str, value: &Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(value).map_err(|e| {
        ReportError::unavailable(module, format!("section '{section}' is malformed: {e}"))
    })
}
