//! In-memory collaborators for driving the orchestrator without network access

#![allow(dead_code)]

use async_trait::async_trait;
use flow_core::ModuleData;
use flow_report::catalog::Section;
use flow_report::services::{ChartRenderer, DataSource, FetchRequest, NarrativeWriter};
use flow_report::{DataModule, ReportError, Result};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Mutex;

pub const PERIOD: &str = "2024-12-09 ~ 2024-12-15";

/// Daily closes with a 1% rise per day
pub fn rising_closes(days: usize, start: f64) -> Value {
    let dates: Vec<String> = (0..days).map(|i| format!("2024-11-{:02}", i + 1)).collect();
    let close: Vec<f64> = (0..days).map(|i| start * 1.01_f64.powi(i as i32)).collect();
    json!({ "dates": dates, "close": close })
}

/// Serves canned module data; modules listed in `failing` are unavailable
pub struct FakeDataSource {
    failing: BTreeSet<DataModule>,
    calls: Mutex<Vec<DataModule>>,
}

impl FakeDataSource {
    pub fn new() -> Self {
        Self {
            failing: BTreeSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(modules: &[DataModule]) -> Self {
        Self {
            failing: modules.iter().copied().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<DataModule> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for FakeDataSource {
    async fn fetch(&self, module: DataModule, request: &FetchRequest) -> Result<ModuleData> {
        assert_eq!(request.report_period, PERIOD);
        self.calls.lock().unwrap().push(module);

        if self.failing.contains(&module) {
            return Err(ReportError::unavailable(module.as_str(), "upstream offline"));
        }

        let sections: Vec<(&str, Value)> = match module {
            DataModule::Macro => vec![
                ("dxy", rising_closes(30, 105.0)),
                ("us10y", rising_closes(30, 4.2)),
                ("sp500", rising_closes(30, 6000.0)),
                ("nvda", rising_closes(30, 140.0)),
                ("coin", rising_closes(30, 300.0)),
                ("mstr", rising_closes(30, 400.0)),
            ],
            DataModule::Btc => vec![("price", rising_closes(30, 95_000.0))],
            DataModule::Eth => vec![("price", rising_closes(30, 3_800.0))],
            DataModule::News => vec![("top_news", json!([]))],
        };

        Ok(sections
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect())
    }
}

/// Returns `per_module` fake artifact paths for every module
pub struct FakeChartRenderer {
    per_module: usize,
}

impl FakeChartRenderer {
    pub fn new(per_module: usize) -> Self {
        Self { per_module }
    }
}

#[async_trait]
impl ChartRenderer for FakeChartRenderer {
    async fn render(
        &self,
        _: &str,
        module: DataModule,
        _: &ModuleData,
    ) -> Result<Vec<PathBuf>> {
        Ok((0..self.per_module)
            .map(|i| PathBuf::from(format!("charts/{module}_{i}.json")))
            .collect())
    }
}

/// Writes a fixed-length paragraph per section
pub struct FakeWriter {
    chars: usize,
    calls: Mutex<Vec<Section>>,
}

impl FakeWriter {
    pub fn new(chars: usize) -> Self {
        Self {
            chars,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Section> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeWriter for FakeWriter {
    async fn generate(&self, section: Section, context: &Value) -> Result<String> {
        assert!(context.is_object());
        self.calls.lock().unwrap().push(section);
        Ok("w".repeat(self.chars))
    }
}
