//! Data modules and report sections

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// A group of related market series fetched together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataModule {
    /// Dollar index, treasury yield, equities
    Macro,
    /// BTC price, on-chain metrics, liquidations
    Btc,
    /// ETH price and the ETH/BTC pair
    Eth,
    /// Headlines (no source wired yet)
    News,
}

impl DataModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Macro => "macro",
            Self::Btc => "btc",
            Self::Eth => "eth",
            Self::News => "news",
        }
    }

    pub fn all() -> [DataModule; 4] {
        [Self::Macro, Self::Btc, Self::Eth, Self::News]
    }

    /// Report sections written from this module's data
    pub fn sections(&self) -> &'static [Section] {
        match self {
            Self::Macro => &[Section::MacroAnalysis],
            Self::Btc => &[Section::BtcAnalysis, Section::OnchainAnalysis],
            Self::Eth | Self::News => &[],
        }
    }
}

impl fmt::Display for DataModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataModule {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macro" => Ok(Self::Macro),
            "btc" => Ok(Self::Btc),
            "eth" => Ok(Self::Eth),
            "news" => Ok(Self::News),
            other => Err(ReportError::unavailable(other, "unknown data module")),
        }
    }
}

/// A named block of report prose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    MacroAnalysis,
    BtcAnalysis,
    OnchainAnalysis,
    Summary,
}

impl Section {
    /// Key used in the state's content maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacroAnalysis => "macro_analysis",
            Self::BtcAnalysis => "btc_analysis",
            Self::OnchainAnalysis => "onchain_analysis",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sections to draft for a set of modules, in writing order
///
/// A summary closes the report once it has more than one body section.
pub fn required_sections(modules: &[DataModule]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for module in modules {
        for section in module.sections() {
            if !sections.contains(section) {
                sections.push(*section);
            }
        }
    }
    if sections.len() > 1 {
        sections.push(Section::Summary);
    }
    sections
}
